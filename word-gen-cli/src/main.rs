//! word-gen - command-line front end for the word Markov generator.
//!
//! Learns a model from chapter files and/or a saved model, optionally saves
//! it, then prints (or writes) a random walk over it.

mod display;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::info;

use word_gen_core::model::walk_options::DEFAULT_LENGTH;
use word_gen_core::persistence::{load_model, save_model};
use word_gen_core::source::{ChapterSelection, FileChapters, build_from_source};
use word_gen_core::{DrawRange, MarkovModel, WalkOptions};

#[derive(Parser)]
#[command(name = "word-gen")]
#[command(about = "Generate text from a word-level Markov chain", long_about = None)]
#[command(version)]
struct Cli {
	/// Chapter file, or directory of `.txt` chapters, to learn from (repeatable)
	#[arg(short = 'f', long = "file")]
	files: Vec<String>,

	/// Only learn from these chapters (1-based, comma separated)
	#[arg(long, value_delimiter = ',')]
	chapters: Vec<usize>,

	/// Load a saved model (`.bin` for binary, JSON otherwise)
	#[arg(short = 'I', long = "import")]
	import: Option<PathBuf>,

	/// Save the model (`.bin` for binary, JSON otherwise)
	#[arg(short = 'E', long = "export")]
	export: Option<PathBuf>,

	/// Number of words to generate
	#[arg(short = 'l', long, default_value_t = DEFAULT_LENGTH)]
	length: usize,

	/// Write the generated text to this file instead of stdout
	#[arg(short = 'o', long)]
	output: Option<PathBuf>,

	/// Maximum output line width
	#[arg(short = 'w', long)]
	width: Option<usize>,

	/// Seed for a reproducible walk
	#[arg(long)]
	seed: Option<u64>,

	/// Use the historical inclusive draw range
	#[arg(long)]
	legacy_draw: bool,

	/// Print progress information
	#[arg(short = 'v', long)]
	verbose: bool,
}

impl Cli {
	fn selection(&self) -> ChapterSelection {
		if self.chapters.is_empty() {
			ChapterSelection::All
		} else {
			ChapterSelection::Only(self.chapters.clone())
		}
	}

	fn walk_options(&self) -> WalkOptions {
		let mut options = WalkOptions::default();
		options.length = self.length;
		options.draw_range = if self.legacy_draw { DrawRange::Legacy } else { DrawRange::Unbiased };
		options.set_seed(self.seed);
		options
	}

	/// Builds the model from every given input, or `None` if there is none.
	fn load(&self) -> anyhow::Result<Option<MarkovModel>> {
		if self.files.is_empty() && self.import.is_none() {
			return Ok(None);
		}

		let mut model = match &self.import {
			Some(path) => load_model(path).with_context(|| format!("Failed to import {}", path.display()))?,
			None => MarkovModel::new(),
		};

		let selection = self.selection();
		for document in &self.files {
			let partial_model = build_from_source(&FileChapters, document, &selection)
				.with_context(|| format!("Failed to learn from {document}"))?;
			model = model.merged(&partial_model);
		}

		info!("model ready: {} source words", model.len());
		Ok(Some(model))
	}
}

fn init_logger(verbose: bool) {
	let level = if verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();
	init_logger(cli.verbose);

	let Some(model) = cli.load()? else {
		eprintln!("Error: no input given. Exiting...");
		return Ok(ExitCode::from(2));
	};

	if let Some(path) = &cli.export {
		save_model(path, &model).with_context(|| format!("Failed to export {}", path.display()))?;
		info!("model exported to {}", path.display());
	}

	let words = cli.walk_options().walk(&model).context("Failed to generate text")?;
	let text = display::render_for_display(&words, cli.width);

	match &cli.output {
		Some(path) => fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?,
		None => println!("{text}"),
	}

	Ok(ExitCode::SUCCESS)
}
