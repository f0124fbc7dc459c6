//! Top-level module for the word transition model.
//!
//! This module provides:
//! - Per-word transition tables (`TransitionTable`)
//! - The full first-order model (`MarkovModel`)
//! - Weighted random walks over a model (`Walker`)
//! - Walk configuration (`WalkOptions`)

/// Observed successors of a single word and weighted sampling among them.
pub mod transitions;

/// First-order word model: construction, merging and start weights.
///
/// Handles token ingestion, pair counting and non-mutating merges.
pub mod markov_model;

/// Weighted random walk with restart on dead ends.
pub mod walker;

/// Generation parameters (length, draw range, seed).
pub mod walk_options;
