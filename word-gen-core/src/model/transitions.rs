use std::collections::BTreeMap;

use rand::Rng;

use serde::Serialize;

use super::walker::DrawRange;

/// Outgoing transitions of a single source word.
///
/// A `TransitionTable` maps every word observed right after the source word
/// to the number of times that succession was seen.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - Each occurrence count is strictly positive
/// - Entries are only ever created with a count of 1 or incremented
/// - Counts saturate at `u64::MAX` instead of wrapping
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TransitionTable {
	/// Example: { "cat" => 2, "dog" => 1 }
	transitions: BTreeMap<String, u64>,
}

impl TransitionTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records an occurrence of a transition toward `next_word`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next_word: &str) {
		if let Some(occurrence) = self.transitions.get_mut(next_word) {
			*occurrence = occurrence.saturating_add(1);
		} else {
			self.transitions.insert(next_word.to_owned(), 1);
		}
	}

	/// Adds `occurrence` observations of `next_word` at once.
	///
	/// A zero occurrence is ignored so the positive count invariant holds.
	/// A sum that does not fit in a `u64` is clamped to `u64::MAX`.
	pub(crate) fn add_occurrences(&mut self, next_word: &str, occurrence: u64) {
		if occurrence == 0 {
			return;
		}
		let count = self.transitions.entry(next_word.to_owned()).or_insert(0);
		*count = count.checked_add(occurrence).unwrap_or(u64::MAX);
	}

	/// Returns how many times `next_word` was observed, if ever.
	pub fn get(&self, next_word: &str) -> Option<u64> {
		self.transitions.get(next_word).copied()
	}

	/// Number of distinct successors.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Iterates over `(successor, count)` pairs in a fixed (sorted) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(word, occurrence)| (word.as_str(), *occurrence))
	}

	/// Sum of all occurrence counts, clamped to `u64::MAX`.
	pub fn total(&self) -> u64 {
		self.checked_total().unwrap_or(u64::MAX)
	}

	/// Sum of all occurrence counts, `None` if it does not fit in a `u64`.
	pub fn checked_total(&self) -> Option<u64> {
		self.transitions.values().try_fold(0u64, |sum, occurrence| sum.checked_add(*occurrence))
	}

	/// Picks a successor using weighted random sampling ("dartboard").
	///
	/// `total` must be the sum of the counts (see `StartWeights`), it is
	/// passed in so callers do not resum the table on every step.
	/// Each successor owns a contiguous slice of the draw range proportional
	/// to its count; the slice hit by the draw wins.
	///
	/// Returns `None` if the table is empty or `total` is zero.
	pub fn choose<R: Rng + ?Sized>(&self, total: u64, draw_range: DrawRange, rng: &mut R) -> Option<&str> {
		if self.transitions.is_empty() || total == 0 {
			return None;
		}

		let mut fallback: Option<&str> = None;
		match draw_range {
			DrawRange::Unbiased => {
				let mut r = rng.random_range(0..total);
				for (next_word, occurrence) in &self.transitions {
					if r < *occurrence {
						return Some(next_word.as_str());
					}
					r -= occurrence;
					fallback = Some(next_word.as_str());
				}
			}
			DrawRange::Legacy => {
				// Inclusive draw: both 0 and `total` are possible, the running
				// value "lands" once it would drop below 1.
				let mut r = rng.random_range(0..=total);
				for (next_word, occurrence) in &self.transitions {
					if r <= *occurrence {
						return Some(next_word.as_str());
					}
					r -= occurrence;
					fallback = Some(next_word.as_str());
				}
			}
		}

		// Only reachable when `total` exceeds the real sum
		fallback
	}

	/// Adds every count of `other` into this table.
	pub fn absorb(&mut self, other: &Self) {
		for (next_word, occurrence) in &other.transitions {
			self.add_occurrences(next_word, *occurrence);
		}
	}

	/// Returns a new table holding the summed counts of both tables.
	///
	/// Keys present in only one input are copied unchanged. Neither input
	/// is modified.
	pub fn merged(&self, other: &Self) -> Self {
		let mut out = self.clone();
		out.absorb(other);
		out
	}
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for TransitionTable {
	fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
		let mut table = Self::new();
		for (next_word, occurrence) in iter {
			table.add_occurrences(next_word.as_ref(), occurrence);
		}
		table
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn test_add_transition_counts() {
		let mut table = TransitionTable::new();
		table.add_transition("a");
		table.add_transition("b");
		table.add_transition("a");
		assert_eq!(table.get("a"), Some(2));
		assert_eq!(table.get("b"), Some(1));
		assert_eq!(table.get("c"), None);
		assert_eq!(table.total(), 3);
	}

	#[test]
	fn test_zero_occurrence_is_ignored() {
		let table: TransitionTable = [("a", 0), ("b", 2)].into_iter().collect();
		assert_eq!(table.len(), 1);
		assert_eq!(table.get("b"), Some(2));
	}

	#[test]
	fn test_merged_sums_and_keeps_inputs() {
		let t1: TransitionTable = [("a", 1), ("b", 2)].into_iter().collect();
		let t2: TransitionTable = [("b", 3), ("c", 4)].into_iter().collect();
		let (s1, s2) = (t1.clone(), t2.clone());

		let t3 = t1.merged(&t2);
		assert_eq!(t3.get("a"), Some(1));
		assert_eq!(t3.get("b"), Some(5));
		assert_eq!(t3.get("c"), Some(4));
		assert_eq!(t3, t2.merged(&t1));
		assert_eq!(t1, s1);
		assert_eq!(t2, s2);
	}

	#[test]
	fn test_merging_huge_counts_saturates() {
		let t1: TransitionTable = [("a", u64::MAX), ("b", 1)].into_iter().collect();
		let t2 = t1.merged(&t1);
		assert_eq!(t2.get("a"), Some(u64::MAX));
		assert_eq!(t2.get("b"), Some(2));
		assert_eq!(t2.checked_total(), None);
		assert_eq!(t2.total(), u64::MAX);

		let mut rng = StdRng::seed_from_u64(5);
		for draw_range in [DrawRange::Unbiased, DrawRange::Legacy] {
			assert!(t2.choose(t2.total(), draw_range, &mut rng).is_some());
		}
	}

	#[test]
	fn test_choose_empty_table() {
		let mut rng = StdRng::seed_from_u64(1);
		let table = TransitionTable::new();
		assert_eq!(table.choose(0, DrawRange::Unbiased, &mut rng), None);
	}

	#[test]
	fn test_choose_single_successor_always_wins() {
		let mut rng = StdRng::seed_from_u64(2);
		let table: TransitionTable = [("only", 5)].into_iter().collect();
		for draw_range in [DrawRange::Unbiased, DrawRange::Legacy] {
			for _ in 0..100 {
				assert_eq!(table.choose(5, draw_range, &mut rng), Some("only"));
			}
		}
	}

	#[test]
	fn test_choose_weighted_distribution() {
		let mut rng = StdRng::seed_from_u64(42);
		let table: TransitionTable = [("a", 3), ("b", 1)].into_iter().collect();
		let trials = 40_000;
		let mut a = 0;
		for _ in 0..trials {
			if table.choose(table.total(), DrawRange::Unbiased, &mut rng) == Some("a") {
				a += 1;
			}
		}
		let ratio = a as f64 / trials as f64;
		assert!((ratio - 0.75).abs() < 0.02, "ratio was {ratio}");
	}

	#[test]
	fn test_legacy_draw_favors_first_entry() {
		// r in 0..=4: 0,1,2,3 land on "a", only 4 lands on "b"
		let mut rng = StdRng::seed_from_u64(7);
		let table: TransitionTable = [("a", 3), ("b", 1)].into_iter().collect();
		let trials = 50_000;
		let mut a = 0;
		for _ in 0..trials {
			if table.choose(4, DrawRange::Legacy, &mut rng) == Some("a") {
				a += 1;
			}
		}
		let ratio = a as f64 / trials as f64;
		assert!((ratio - 0.8).abs() < 0.02, "ratio was {ratio}");
	}
}
