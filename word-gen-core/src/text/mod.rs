//! Text normalization helpers.

/// Lowercasing, quote sanitizing and word splitting.
pub mod tokenizer;
