use std::collections::BTreeMap;

use rand::Rng;

use super::markov_model::MarkovModel;
use crate::error::{ModelError, Result};

/// Range used for the weighted draw of a step.
///
/// # Variants
/// - `Unbiased`: draw in `[0, total - 1]`, every successor is chosen exactly
///   in proportion to its count.
/// - `Legacy`: draw in `[0, total]` and land once the running value drops
///   below 1. The first successor gets one extra slot; kept for output parity
///   with models tuned against the historical generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawRange {
	#[default]
	Unbiased,
	Legacy,
}

/// Total outgoing count of every source word of a model.
///
/// Derived from a `MarkovModel` once per walk so steps do not resum the
/// transition tables. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartWeights {
	weights: BTreeMap<String, u64>,
}

impl StartWeights {
	/// Returns the total weight of `word`, if it is a source word.
	pub fn get(&self, word: &str) -> Option<u64> {
		self.weights.get(word).copied()
	}

	pub fn len(&self) -> usize {
		self.weights.len()
	}

	pub fn is_empty(&self) -> bool {
		self.weights.is_empty()
	}
}

impl FromIterator<(String, u64)> for StartWeights {
	fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
		Self { weights: iter.into_iter().collect() }
	}
}

/// Performs a single step of the walk.
///
/// - If `current` has recorded successors, one of them is drawn with a
///   probability proportional to its count.
/// - Otherwise (dead end or unknown word) the walk restarts on a source word
///   chosen uniformly at random. The walk therefore never halts early.
///
/// # Errors
/// Returns `ModelError::EmptyModel` if a restart is needed on an empty model.
pub fn step<'a, R: Rng + ?Sized>(
	model: &'a MarkovModel,
	weights: &StartWeights,
	current: &str,
	draw_range: DrawRange,
	rng: &mut R,
) -> Result<&'a str> {
	if let Some(table) = model.get(current) {
		let total = weights.get(current).unwrap_or_else(|| table.total());
		if let Some(next_word) = table.choose(total, draw_range, rng) {
			return Ok(next_word);
		}
	}
	model.random_key(rng).ok_or(ModelError::EmptyModel)
}

/// Weighted random walker over a `MarkovModel`.
///
/// # Responsibilities
/// - Cache the start weights of the model for the duration of the walk
/// - Own the random source, so a seeded generator gives a reproducible walk
/// - Produce exactly the requested number of words
///
/// The model is only read, never modified.
pub struct Walker<'a, R: Rng> {
	model: &'a MarkovModel,
	weights: StartWeights,
	draw_range: DrawRange,
	rng: R,
}

impl<'a, R: Rng> Walker<'a, R> {
	/// Creates a walker over `model` drawing from `rng`.
	///
	/// # Errors
	/// Returns `ModelError::EmptyModel` if the model has no keys.
	pub fn new(model: &'a MarkovModel, rng: R) -> Result<Self> {
		let weights = model.start_weights()?;
		Ok(Self { model, weights, draw_range: DrawRange::default(), rng })
	}

	/// Sets the draw range used by `step`.
	pub fn with_draw_range(mut self, draw_range: DrawRange) -> Self {
		self.draw_range = draw_range;
		self
	}

	/// Returns the cached start weights.
	pub fn start_weights(&self) -> &StartWeights {
		&self.weights
	}

	/// Returns the word following `current`, see [`step`].
	pub fn step(&mut self, current: &str) -> Result<&'a str> {
		step(self.model, &self.weights, current, self.draw_range, &mut self.rng)
	}

	/// Generates `length` words, starting from a uniformly random source word.
	pub fn walk(&mut self, length: usize) -> Result<Vec<String>> {
		let start = self.model.random_key(&mut self.rng).ok_or(ModelError::EmptyModel)?;
		self.walk_from(start, length)
	}

	/// Generates `length` words, the first one being `start`.
	///
	/// `start` does not need to be a source word: an unknown start restarts
	/// the walk on the next step.
	pub fn walk_from(&mut self, start: &str, length: usize) -> Result<Vec<String>> {
		let mut words = Vec::with_capacity(length);
		if length == 0 {
			return Ok(words);
		}

		words.push(start.to_owned());
		let mut current = self.step(start)?;
		while words.len() < length {
			words.push(current.to_owned());
			if words.len() < length {
				current = self.step(current)?;
			}
		}
		Ok(words)
	}
}
