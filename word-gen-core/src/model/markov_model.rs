use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use rand::prelude::IteratorRandom;
use serde::Serialize;

use super::transitions::TransitionTable;
use super::walker::{StartWeights, Walker};
use crate::error::{ModelError, Result};
use crate::text::tokenizer::{Punctuation, tokenize};

/// First-order Markov model over words.
///
/// The `MarkovModel` maps each source word to the table of words observed
/// immediately after it, and allows weighted random walks over those
/// successions.
///
/// # Responsibilities
/// - Build the model from token sequences or raw texts
/// - Accumulate transition counts for each source word
/// - Merge with another model, summing shared counts
/// - Provide start weights and random keys for the walker
///
/// # Invariants
/// - Each key maps to a non-empty transition table
/// - All counts are >= 1
/// - Keys are kept sorted so iteration order is stable across processes
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct MarkovModel {
	/// Mapping from a source word to its outgoing transitions
	states: BTreeMap<String, TransitionTable>,
}

impl MarkovModel {
	/// Creates a new empty model.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a model from one raw text (a chapter, a document).
	///
	/// The text is tokenized with punctuation included, so punctuation marks
	/// take part in the chain and can be regenerated.
	pub fn from_text(raw_text: &str) -> Self {
		let mut model = Self::new();
		model.add_tokens(&tokenize(raw_text, Punctuation::Include));
		model
	}

	/// Builds one model per chapter and merges them.
	///
	/// Texts are never concatenated: the last word of a chapter is not
	/// linked to the first word of the next one.
	pub fn from_chapters<I, S>(chapters: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut model = Self::new();
		for (index, chapter) in chapters.into_iter().enumerate() {
			let partial_model = Self::from_text(chapter.as_ref());
			debug!("chapter {}: {} source words", index + 1, partial_model.len());
			model.absorb(&partial_model);
		}
		model
	}

	/// Number of source words.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Returns true if `word` has at least one recorded successor.
	pub fn contains(&self, word: &str) -> bool {
		self.states.contains_key(word)
	}

	/// Returns the transition table of `word`, if any.
	pub fn get(&self, word: &str) -> Option<&TransitionTable> {
		self.states.get(word)
	}

	/// Iterates over source words in sorted order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.states.keys().map(String::as_str)
	}

	/// Iterates over `(source, table)` pairs in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &TransitionTable)> {
		self.states.iter().map(|(word, table)| (word.as_str(), table))
	}

	/// Returns a source word chosen uniformly at random.
	///
	/// Returns `None` if the model has no states.
	pub fn random_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.states.keys().choose(rng).map(String::as_str)
	}

	/// Records that `next_word` followed `word` once.
	///
	/// Creates the source entry and/or the successor entry when missing.
	/// Returns the model so calls can be chained.
	pub fn add_pair(&mut self, word: &str, next_word: &str) -> &mut Self {
		match self.states.get_mut(word) {
			Some(table) => table.add_transition(next_word),
			None => {
				let mut table = TransitionTable::new();
				table.add_transition(next_word);
				self.states.insert(word.to_owned(), table);
			}
		}
		self
	}

	/// Adds every consecutive pair of `tokens`, left to right.
	///
	/// A sequence of length `n` yields `n - 1` increments; sequences shorter
	/// than 2 leave the model untouched.
	pub fn add_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) -> &mut Self {
		for pair in tokens.windows(2) {
			self.add_pair(pair[0].as_ref(), pair[1].as_ref());
		}
		self
	}

	/// Inserts a whole transition table under `word`, summing with any
	/// existing entry. Empty tables are skipped.
	pub(crate) fn add_table(&mut self, word: &str, table: TransitionTable) {
		if table.is_empty() {
			return;
		}
		match self.states.get_mut(word) {
			Some(existing) => existing.absorb(&table),
			None => {
				self.states.insert(word.to_owned(), table);
			}
		}
	}

	/// Merges another model into this one.
	///
	/// Occurrence counts for matching words and transitions are summed,
	/// missing tables are cloned.
	pub fn absorb(&mut self, other: &Self) {
		for (word, table) in &other.states {
			if let Some(existing) = self.states.get_mut(word) {
				existing.absorb(table);
			} else {
				self.states.insert(word.clone(), table.clone());
			}
		}
	}

	/// Returns a new model holding the merged counts of both models.
	///
	/// Neither input is modified. The operation is commutative and
	/// associative.
	pub fn merged(&self, other: &Self) -> Self {
		let mut out = self.clone();
		out.absorb(other);
		debug!("merged models: {} + {} -> {} source words", self.len(), other.len(), out.len());
		out
	}

	/// Sums the outgoing counts of every source word.
	///
	/// # Errors
	/// Returns `ModelError::EmptyModel` if the model has no keys.
	pub fn start_weights(&self) -> Result<StartWeights> {
		if self.is_empty() {
			return Err(ModelError::EmptyModel);
		}
		Ok(self.states.iter().map(|(word, table)| (word.clone(), table.total())).collect())
	}

	/// Generates `length` words using the thread-local random generator.
	///
	/// Use a `Walker` directly for a seeded, reproducible walk.
	pub fn walk(&self, length: usize) -> Result<Vec<String>> {
		Walker::new(self, rand::rng())?.walk(length)
	}

	/// Same as [`MarkovModel::walk`], words joined by single spaces.
	pub fn walk_text(&self, length: usize) -> Result<String> {
		Ok(self.walk(length)?.join(" "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(entries: &[(&str, u64)]) -> TransitionTable {
		entries.iter().map(|(w, c)| (*w, *c)).collect()
	}

	#[test]
	fn test_add_pair_creates_and_increments() {
		let mut model = MarkovModel::new();
		model.add_pair("a", "b").add_pair("a", "b").add_pair("a", "c");
		assert_eq!(model.len(), 1);
		assert_eq!(model.get("a"), Some(&table(&[("b", 2), ("c", 1)])));
		assert!(!model.contains("b"));
	}

	#[test]
	fn test_add_tokens_counts_consecutive_pairs() {
		let tokens = ["the", "cat", "sat", "the", "cat", "ran"];
		let mut model = MarkovModel::new();
		model.add_tokens(&tokens);

		assert_eq!(model.len(), 3);
		assert_eq!(model.get("the"), Some(&table(&[("cat", 2)])));
		assert_eq!(model.get("cat"), Some(&table(&[("sat", 1), ("ran", 1)])));
		assert_eq!(model.get("sat"), Some(&table(&[("the", 1)])));
		assert!(!model.contains("ran"));
	}

	#[test]
	fn test_add_tokens_matches_repeated_add_pair() {
		let tokens: Vec<String> = "a b a c b a a".split(' ').map(str::to_owned).collect();
		let mut folded = MarkovModel::new();
		folded.add_tokens(&tokens);

		let mut paired = MarkovModel::new();
		for i in 0..tokens.len() - 1 {
			paired.add_pair(&tokens[i], &tokens[i + 1]);
		}
		assert_eq!(folded, paired);
	}

	#[test]
	fn test_short_sequences_leave_model_unchanged() {
		let mut model = MarkovModel::new();
		model.add_tokens::<&str>(&[]);
		model.add_tokens(&["alone"]);
		assert!(model.is_empty());
	}

	#[test]
	fn test_from_text_includes_punctuation() {
		let model = MarkovModel::from_text("Hi, you. Hi!");
		assert_eq!(model.get("hi"), Some(&table(&[(",", 1), ("!", 1)])));
		assert_eq!(model.get("you"), Some(&table(&[(".", 1)])));
		assert_eq!(model.get("."), Some(&table(&[("hi", 1)])));
	}

	#[test]
	fn test_from_chapters_does_not_link_chapters() {
		let model = MarkovModel::from_chapters(["one two", "three four"]);
		assert!(!model.contains("two"));
		assert_eq!(model.len(), 2);
	}

	#[test]
	fn test_merged_does_not_mutate() {
		let mut a = MarkovModel::new();
		a.add_tokens(&["x", "y", "z"]);
		let mut b = MarkovModel::new();
		b.add_tokens(&["x", "y", "x", "w"]);
		let (sa, sb) = (a.clone(), b.clone());

		let m = a.merged(&b);
		assert_eq!(a, sa);
		assert_eq!(b, sb);
		assert_eq!(m.get("x"), Some(&table(&[("y", 2), ("w", 1)])));
		assert_eq!(m.get("y"), Some(&table(&[("z", 1), ("x", 1)])));
	}

	#[test]
	fn test_start_weights() {
		let mut model = MarkovModel::new();
		model.add_tokens(&["the", "cat", "sat", "the", "cat", "ran"]);
		let weights = model.start_weights().unwrap();
		assert_eq!(weights.get("the"), Some(2));
		assert_eq!(weights.get("cat"), Some(2));
		assert_eq!(weights.get("sat"), Some(1));
		assert_eq!(weights.get("ran"), None);
	}

	#[test]
	fn test_merging_huge_models_does_not_overflow() {
		let mut model = MarkovModel::new();
		model.add_table("a", table(&[("b", u64::MAX)]));
		let doubled = model.merged(&model);
		assert_eq!(doubled.get("a").unwrap().get("b"), Some(u64::MAX));
		assert_eq!(doubled.start_weights().unwrap().get("a"), Some(u64::MAX));
		assert_eq!(doubled.walk(3).unwrap(), vec!["a", "b", "a"]);
	}

	#[test]
	fn test_start_weights_empty_model() {
		assert!(matches!(MarkovModel::new().start_weights(), Err(ModelError::EmptyModel)));
	}

	#[test]
	fn test_walk_text_word_count() {
		let model = MarkovModel::from_text("a b c a b d");
		let text = model.walk_text(12).unwrap();
		assert_eq!(text.split(' ').count(), 12);
	}
}
