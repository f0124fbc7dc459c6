use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by model construction, persistence and sampling.
///
/// Tokenization, building and merging are infallible on valid text; all
/// fallibility sits at the persistence boundary and in the empty-model guard
/// of the walker.
#[derive(Error, Debug)]
pub enum ModelError {
	/// Raw input could not be turned into text (ex. invalid UTF-8)
	#[error("Tokenization error: {0}")]
	Tokenization(String),

	/// Persisted model is structurally invalid
	#[error("Model format error: {0}")]
	ModelFormat(String),

	/// Walk or start weights requested on a model without any key
	#[error("Model is empty, nothing to walk")]
	EmptyModel,

	/// I/O failure with file context
	#[error("I/O error while trying to {operation} {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		operation: &'static str,
		#[source]
		source: std::io::Error,
	},
}

impl ModelError {
	/// Builds an `Io` error carrying the path and the attempted operation.
	pub(crate) fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), operation, source }
	}
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
