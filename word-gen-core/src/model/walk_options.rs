use rand::SeedableRng;
use rand::rngs::StdRng;

use super::markov_model::MarkovModel;
use super::walker::{DrawRange, Walker};
use crate::error::Result;

/// Number of words generated when nothing else is requested.
pub const DEFAULT_LENGTH: usize = 100;

/// Generation parameters for a walk.
///
/// # Responsibilities
/// - Track the requested walk length and draw range
/// - Build the random source: seeded (reproducible) or from OS entropy
pub struct WalkOptions {
	/// Number of words to generate.
	pub length: usize,

	/// Range of the weighted draw, see `DrawRange`.
	pub draw_range: DrawRange,

	/// Optional seed for a reproducible walk.
	seed: Option<u64>,
}

impl Default for WalkOptions {
	fn default() -> Self {
		Self { length: DEFAULT_LENGTH, draw_range: DrawRange::default(), seed: None }
	}
}

impl WalkOptions {
	/// Returns the configured seed, if any.
	pub fn seed(&self) -> Option<u64> {
		self.seed
	}

	/// Sets (or clears) the seed used by [`WalkOptions::rng`].
	pub fn set_seed(&mut self, seed: Option<u64>) {
		self.seed = seed;
	}

	/// Builds the random source for a walk.
	///
	/// With a seed, two calls return generators producing the same stream.
	pub fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}

	/// Walks `model` using these options.
	pub fn walk(&self, model: &MarkovModel) -> Result<Vec<String>> {
		Walker::new(model, self.rng())?.with_draw_range(self.draw_range).walk(self.length)
	}
}
