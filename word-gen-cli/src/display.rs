use std::sync::OnceLock;

use regex::Regex;

fn spaced_punctuation() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r" ([.!?:;,\-/])").expect("Invalid regex pattern"))
}

/// Removes the space left before punctuation by a space-joined walk.
///
/// Example: `"hello , world !"` → `"hello, world!"`
pub fn prettify(text: &str) -> String {
	spaced_punctuation().replace_all(text, "$1").into_owned()
}

/// Wraps prettified text so no line is longer than `width` characters.
///
/// Words are never split: a word longer than `width` gets a line of its own.
pub fn wrap_lines(text: &str, width: usize) -> String {
	let mut out = String::new();
	let mut line = 0;

	for word in text.split_whitespace() {
		let len = word.chars().count();
		if line > 0 && line + 1 + len > width {
			out.push('\n');
			line = 0;
		} else if line > 0 {
			out.push(' ');
			line += 1;
		}
		out.push_str(word);
		line += len;
	}
	out
}

/// Renders a walk for display: prettified, and wrapped when a width is given.
pub fn render_for_display(words: &[String], max_width: Option<usize>) -> String {
	let text = prettify(&words.join(" "));
	match max_width {
		Some(width) => wrap_lines(&text, width),
		None => text,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_prettify() {
		assert_eq!(prettify("hello , world ! yes ; no - maybe / ok ?"), "hello, world! yes; no- maybe/ ok?");
		assert_eq!(prettify("\" quoted \""), "\" quoted \"");
	}

	#[test]
	fn test_wrap_lines() {
		assert_eq!(wrap_lines("aaa bbb ccc", 7), "aaa bbb\nccc");
		assert_eq!(wrap_lines("aaa bbb ccc", 80), "aaa bbb ccc");
		assert_eq!(wrap_lines("tiny enormousword x", 5), "tiny\nenormousword\nx");
		assert_eq!(wrap_lines("", 10), "");
	}

	#[test]
	fn test_render_for_display() {
		let words: Vec<String> = ["the", "cat", "sat", ".", "the", "end", "!"].iter().map(|s| s.to_string()).collect();
		assert_eq!(render_for_display(&words, None), "the cat sat. the end!");
		assert_eq!(render_for_display(&words, Some(12)), "the cat sat.\nthe end!");
	}
}
