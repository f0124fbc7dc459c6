use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::model::markov_model::MarkovModel;
use crate::model::transitions::TransitionTable;

/// On-disk representation of a model.
///
/// # Variants
/// - `Json`: a single JSON object `{ "word": { "next": count } }`, readable
///   without any outside context.
/// - `Binary`: compact `postcard` encoding of the same mapping, meant as a
///   cache for large models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFormat {
	#[default]
	Json,
	Binary,
}

impl ModelFormat {
	/// Picks the format from a file extension: `.bin` is binary, anything
	/// else is JSON.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension() {
			Some(ext) if ext.eq_ignore_ascii_case("bin") => Self::Binary,
			_ => Self::Json,
		}
	}
}

/// Serializes a model as a JSON document.
pub fn export_model(model: &MarkovModel) -> Result<String> {
	serde_json::to_string(model).map_err(|e| ModelError::ModelFormat(format!("Failed to serialize model: {e}")))
}

/// Parses a JSON document back into a model.
///
/// The document crosses a trust boundary, so its structure is checked
/// explicitly:
/// - the top-level value must be an object
/// - every value therein must be an object
/// - every leaf must be a non-negative integer; integral JSON numbers,
///   non-negative floats (truncated) and decimal strings are accepted
///
/// Zero counts carry no observation and are dropped, as are source words
/// left without any successor. The counts of a source word must sum to at
/// most `u64::MAX`, the sampler draws within that total.
///
/// # Errors
/// Returns `ModelError::ModelFormat` on any violation.
pub fn import_model(text: &str) -> Result<MarkovModel> {
	let value: Value = serde_json::from_str(text)
		.map_err(|e| ModelError::ModelFormat(format!("Invalid JSON document: {e}")))?;

	let states = match value {
		Value::Object(states) => states,
		other => {
			return Err(ModelError::ModelFormat(format!("Expected an object at top level, got {}", kind(&other))));
		}
	};

	let mut model = MarkovModel::new();
	for (word, transitions) in &states {
		let Value::Object(transitions) = transitions else {
			return Err(ModelError::ModelFormat(format!(
				"Expected an object for '{word}', got {}",
				kind(transitions)
			)));
		};

		let counts = transitions
			.iter()
			.map(|(next_word, count)| parse_count(word, next_word, count).map(|count| (next_word.as_str(), count)))
			.collect::<Result<Vec<_>>>()?;
		model.add_table(word, checked_table(word, counts)?);
	}

	debug!("imported model with {} source words", model.len());
	Ok(model)
}

/// Serializes a model with `postcard`.
pub fn export_binary(model: &MarkovModel) -> Result<Vec<u8>> {
	postcard::to_stdvec(model).map_err(|e| ModelError::ModelFormat(format!("Failed to encode model: {e}")))
}

/// Decodes a `postcard` encoded model.
///
/// Counts go through the same checks as [`import_model`].
///
/// # Errors
/// Returns `ModelError::ModelFormat` if the bytes do not decode or the
/// counts of a source word do not fit in a 64-bit total.
pub fn import_binary(bytes: &[u8]) -> Result<MarkovModel> {
	let states: BTreeMap<String, BTreeMap<String, u64>> = postcard::from_bytes(bytes)
		.map_err(|e| ModelError::ModelFormat(format!("Invalid binary model: {e}")))?;

	let mut model = MarkovModel::new();
	for (word, transitions) in states {
		let counts = transitions.iter().map(|(next_word, count)| (next_word.as_str(), *count));
		model.add_table(&word, checked_table(&word, counts)?);
	}
	Ok(model)
}

/// Writes `model` to `path`, in the format given by its extension.
pub fn save_model<P: AsRef<Path>>(path: P, model: &MarkovModel) -> Result<()> {
	let path = path.as_ref();
	let bytes = match ModelFormat::from_path(path) {
		ModelFormat::Json => export_model(model)?.into_bytes(),
		ModelFormat::Binary => export_binary(model)?,
	};

	let file = File::create(path).map_err(|e| ModelError::io(path, "create", e))?;
	let mut writer = BufWriter::new(file);
	writer.write_all(&bytes).map_err(|e| ModelError::io(path, "write", e))?;
	writer.flush().map_err(|e| ModelError::io(path, "write", e))?;

	debug!("saved {} source words to {}", model.len(), path.display());
	Ok(())
}

/// Reads a model from `path`, in the format given by its extension.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<MarkovModel> {
	let path = path.as_ref();
	let mut bytes = Vec::new();
	File::open(path)
		.map_err(|e| ModelError::io(path, "open", e))?
		.read_to_end(&mut bytes)
		.map_err(|e| ModelError::io(path, "read", e))?;

	match ModelFormat::from_path(path) {
		ModelFormat::Json => {
			let text = std::str::from_utf8(&bytes)
				.map_err(|e| ModelError::ModelFormat(format!("{} is not UTF-8: {e}", path.display())))?;
			import_model(text)
		}
		ModelFormat::Binary => import_binary(&bytes),
	}
}

/// Builds the table of `word`, dropping zero counts and rejecting totals
/// that overflow a `u64`.
fn checked_table<'a, I>(word: &str, counts: I) -> Result<TransitionTable>
where
	I: IntoIterator<Item = (&'a str, u64)>,
{
	let mut table = TransitionTable::new();
	let mut total: u64 = 0;
	for (next_word, count) in counts {
		if count == 0 {
			warn!("dropping zero count for '{word}' -> '{next_word}'");
			continue;
		}
		total = total.checked_add(count).ok_or_else(|| {
			ModelError::ModelFormat(format!("Counts of '{word}' overflow a 64-bit total"))
		})?;
		table.add_occurrences(next_word, count);
	}
	Ok(table)
}

fn parse_count(word: &str, next_word: &str, value: &Value) -> Result<u64> {
	let invalid = || ModelError::ModelFormat(format!("Invalid count for '{word}' -> '{next_word}': {value}"));
	match value {
		Value::Number(n) => match n.as_u64() {
			Some(count) => Ok(count),
			None => match n.as_f64() {
				Some(f) if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 => Ok(f.trunc() as u64),
				_ => Err(invalid()),
			},
		},
		Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid()),
		_ => Err(invalid()),
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
