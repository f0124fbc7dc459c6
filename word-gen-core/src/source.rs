use std::fs;
use std::path::{Path, PathBuf};
use std::{env, io};

use log::info;

use crate::error::{ModelError, Result};
use crate::model::markov_model::MarkovModel;
use crate::text::tokenizer::decode;

/// Anything able to hand out the raw chapter texts of a document.
///
/// The model builder does not care where texts come from; it only needs
/// them in reading order.
pub trait ChapterSource {
	/// Returns every chapter of `document_id`, in reading order.
	fn fetch_chapter_texts(&self, document_id: &str) -> Result<Vec<String>>;
}

/// Chapters to keep out of a document.
///
/// Chapter numbers are 1-based. `All` keeps every chapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChapterSelection {
	#[default]
	All,
	Only(Vec<usize>),
}

impl ChapterSelection {
	/// Applies the selection to the chapters of a document.
	///
	/// Numbers outside `1..=chapters.len()` are ignored; requested chapters
	/// are returned in the requested order.
	pub fn apply(&self, chapters: Vec<String>) -> Vec<String> {
		match self {
			Self::All => chapters,
			Self::Only(numbers) => numbers
				.iter()
				.filter_map(|n| n.checked_sub(1).and_then(|i| chapters.get(i)).cloned())
				.collect(),
		}
	}
}

/// Reads chapters from the local filesystem.
///
/// The document id is a path:
/// - a file is a single chapter
/// - a directory yields each `.txt` file it directly contains, sorted by name
///   (subdirectories are ignored)
#[derive(Debug, Clone, Default)]
pub struct FileChapters;

impl ChapterSource for FileChapters {
	fn fetch_chapter_texts(&self, document_id: &str) -> Result<Vec<String>> {
		let path = normalize_folder(document_id);
		if path.is_dir() {
			let files = list_files(&path, "txt").map_err(|e| ModelError::io(&path, "list", e))?;
			info!("{} chapters found in {}", files.len(), path.display());
			files.iter().map(|file| read_chapter(file)).collect()
		} else {
			Ok(vec![read_chapter(&path)?])
		}
	}
}

/// Fetches the selected chapters of `document_id` and builds a merged model,
/// one chapter at a time.
pub fn build_from_source<S: ChapterSource + ?Sized>(
	source: &S,
	document_id: &str,
	selection: &ChapterSelection,
) -> Result<MarkovModel> {
	let chapters = selection.apply(source.fetch_chapter_texts(document_id)?);
	info!("building model from {} chapters of {document_id}", chapters.len());
	Ok(MarkovModel::from_chapters(chapters))
}

fn read_chapter(path: &Path) -> Result<String> {
	let bytes = fs::read(path).map_err(|e| ModelError::io(path, "read", e))?;
	Ok(decode(&bytes)
		.map_err(|e| ModelError::Tokenization(format!("{}: {e}", path.display())))?
		.to_owned())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}
