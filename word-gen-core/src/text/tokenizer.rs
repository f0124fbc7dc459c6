use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ModelError, Result};

/// How punctuation is handled while splitting text into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Punctuation {
	/// Hyphens and apostrophes are deleted (so `don't` becomes `dont`),
	/// every other symbol is turned into a word break.
	#[default]
	Exclude,
	/// Every symbol becomes a token of its own, except an apostrophe
	/// enclosed by two non-space characters which stays inside its word.
	Include,
}

fn joiners() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"[-']").expect("Invalid regex pattern"))
}

fn symbols() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("Invalid regex pattern"))
}

/// Replaces typographic quotes by their ASCII counterparts.
///
/// - `U+2018..=U+201B` (single quote variants) become `'`
/// - `U+201C..=U+201F` (double quote variants) become `"`
pub fn sanitize(text: &str) -> String {
	text.chars()
		.map(|c| match c {
			'\u{2018}'..='\u{201B}' => '\'',
			'\u{201C}'..='\u{201F}' => '"',
			other => other,
		})
		.collect()
}

/// Splits natural text into lowercase word tokens.
///
/// The text is lowercased and sanitized, then punctuation is either removed
/// or isolated depending on `punctuation`. Whitespace runs are collapsed, so
/// the output never contains empty tokens.
pub fn tokenize(text: &str, punctuation: Punctuation) -> Vec<String> {
	let text = sanitize(&text.to_lowercase());

	let spaced = match punctuation {
		Punctuation::Exclude => {
			let joined = joiners().replace_all(&text, "");
			symbols().replace_all(&joined, " ").into_owned()
		}
		Punctuation::Include => {
			let mut out = String::with_capacity(text.len() * 2);
			let mut last = 0;
			for m in symbols().find_iter(&text) {
				out.push_str(&text[last..m.start()]);
				if m.as_str() == "'" && is_enclosed(&text, m.start(), m.end()) {
					out.push('\'');
				} else {
					out.push(' ');
					out.push_str(m.as_str());
					out.push(' ');
				}
				last = m.end();
			}
			out.push_str(&text[last..]);
			out
		}
	};

	spaced.split_whitespace().map(str::to_owned).collect()
}

/// Same as [`tokenize`] for raw bytes, typically read from a chapter file.
///
/// # Errors
/// Returns `ModelError::Tokenization` if the bytes are not valid UTF-8.
pub fn tokenize_bytes(bytes: &[u8], punctuation: Punctuation) -> Result<Vec<String>> {
	Ok(tokenize(decode(bytes)?, punctuation))
}

/// Decodes raw bytes as UTF-8 text.
pub(crate) fn decode(bytes: &[u8]) -> Result<&str> {
	std::str::from_utf8(bytes)
		.map_err(|e| ModelError::Tokenization(format!("input is not valid UTF-8: {e}")))
}

/// True when the byte range `start..end` of `text` sits between two
/// non-whitespace characters.
fn is_enclosed(text: &str, start: usize, end: usize) -> bool {
	let before = text[..start].chars().next_back();
	let after = text[end..].chars().next();
	matches!((before, after), (Some(b), Some(a)) if !b.is_whitespace() && !a.is_whitespace())
}
