//! Word-level Markov chain text generation library.
//!
//! This crate provides a first-order word transition model including:
//! - Text normalization and tokenization
//! - Transition counting and model merging
//! - Weighted random walks with an injectable random source
//! - JSON and compact binary persistence
//!
//! Chapter texts come in through the `source` seam; display formatting is
//! left to the caller.

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// Word transition model, merging and weighted walks.
pub mod model;

/// Text normalization and tokenization.
pub mod text;

/// Model export/import (JSON text or postcard binary) and file helpers.
pub mod persistence;

/// Chapter sources feeding raw texts into the model builder.
pub mod source;

pub use error::{ModelError, Result};
pub use model::markov_model::MarkovModel;
pub use model::transitions::TransitionTable;
pub use model::walker::{DrawRange, StartWeights, Walker};
pub use model::walk_options::WalkOptions;
pub use text::tokenizer::{Punctuation, tokenize};
