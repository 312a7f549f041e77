//! Delimiter-aware scanning shared by the rewrite rules.
//!
//! Source text is never parsed. Instead, a [`CodeMask`] marks which bytes sit
//! inside string literals or comments so that braces, parentheses, and
//! keywords found there are ignored when matching.

use regex::{Match, Regex};
use std::ops::Range;

/// Per-byte classification of a document: `true` for code, `false` for
/// bytes inside a string literal or comment (delimiters included).
#[derive(Debug, Clone)]
pub struct CodeMask {
	code: Vec<bool>,
}

impl CodeMask {
	/// Classify every byte of `text`.
	///
	/// Recognizes `//` line comments, nested `/* */` block comments, `"..."`
	/// strings and `"""` multi-line strings. An unterminated single-line
	/// string ends at the newline.
	pub fn new(text: &str) -> Self {
		let bytes = text.as_bytes();
		let mut code = vec![true; bytes.len()];
		let mut i = 0;

		while i < bytes.len() {
			let end = match bytes[i] {
				b'/' if bytes.get(i + 1) == Some(&b'/') => line_comment_end(bytes, i),
				b'/' if bytes.get(i + 1) == Some(&b'*') => block_comment_end(bytes, i),
				b'"' if bytes[i..].starts_with(b"\"\"\"") => multiline_string_end(bytes, i + 3),
				b'"' => string_end(bytes, i + 1),
				_ => {
					i += 1;
					continue;
				}
			};
			let end = end.min(bytes.len());
			for flag in &mut code[i..end] {
				*flag = false;
			}
			i = end;
		}

		CodeMask { code }
	}

	/// Whether the byte at `idx` is code. Out-of-range indices are not.
	pub fn is_code(&self, idx: usize) -> bool {
		self.code.get(idx).copied().unwrap_or(false)
	}

	/// Find the delimiter closing the one at `open`, counting only code
	/// bytes. Supports `{}`, `()` and `[]`. Returns `None` when `open` is not
	/// an opening delimiter in code or when the document ends first.
	pub fn matching_close(&self, text: &str, open: usize) -> Option<usize> {
		let bytes = text.as_bytes();
		let opener = *bytes.get(open)?;
		let closer = match opener {
			b'{' => b'}',
			b'(' => b')',
			b'[' => b']',
			_ => return None,
		};
		if !self.is_code(open) {
			return None;
		}

		let mut depth = 0usize;
		for (idx, &byte) in bytes.iter().enumerate().skip(open) {
			if !self.is_code(idx) {
				continue;
			}
			if byte == opener {
				depth += 1;
			} else if byte == closer {
				depth -= 1;
				if depth == 0 {
					return Some(idx);
				}
			}
		}

		None
	}

	/// Number of opening minus closing braces found in code.
	pub fn brace_balance(&self, text: &str) -> isize {
		text.bytes()
			.enumerate()
			.filter(|(idx, _)| self.is_code(*idx))
			.map(|(_, byte)| match byte {
				b'{' => 1,
				b'}' => -1,
				_ => 0,
			})
			.sum()
	}

	/// Regex matches in `text` that start in code.
	pub fn code_matches<'t>(
		&'t self,
		pattern: &'t Regex,
		text: &'t str,
	) -> impl Iterator<Item = Match<'t>> {
		pattern
			.find_iter(text)
			.filter(|found| self.is_code(found.start()))
	}
}

fn line_comment_end(bytes: &[u8], start: usize) -> usize {
	bytes[start..]
		.iter()
		.position(|&b| b == b'\n')
		.map_or(bytes.len(), |offset| start + offset)
}

fn block_comment_end(bytes: &[u8], start: usize) -> usize {
	let mut depth = 0usize;
	let mut j = start;
	while j < bytes.len() {
		if bytes[j..].starts_with(b"/*") {
			depth += 1;
			j += 2;
		} else if bytes[j..].starts_with(b"*/") {
			depth -= 1;
			j += 2;
			if depth == 0 {
				return j;
			}
		} else {
			j += 1;
		}
	}
	bytes.len()
}

fn string_end(bytes: &[u8], mut j: usize) -> usize {
	while j < bytes.len() {
		match bytes[j] {
			b'\\' if bytes.get(j + 1) == Some(&b'(') => j = interpolation_end(bytes, j + 2),
			b'\\' => j += 2,
			b'"' => return j + 1,
			b'\n' => return j,
			_ => j += 1,
		}
	}
	bytes.len()
}

fn multiline_string_end(bytes: &[u8], mut j: usize) -> usize {
	while j < bytes.len() {
		if bytes[j..].starts_with(b"\\(") {
			j = interpolation_end(bytes, j + 2);
		} else if bytes[j] == b'\\' {
			j += 2;
		} else if bytes[j..].starts_with(b"\"\"\"") {
			return j + 3;
		} else {
			j += 1;
		}
	}
	bytes.len()
}

/// End of a `\( ... )` interpolation whose body starts at `j`. String
/// literals nested in the body are skipped whole.
fn interpolation_end(bytes: &[u8], mut j: usize) -> usize {
	let mut depth = 1usize;
	while j < bytes.len() {
		match bytes[j] {
			b'"' if bytes[j..].starts_with(b"\"\"\"") => j = multiline_string_end(bytes, j + 3),
			b'"' => j = string_end(bytes, j + 1),
			b'(' => {
				depth += 1;
				j += 1;
			}
			b')' => {
				depth -= 1;
				j += 1;
				if depth == 0 {
					return j;
				}
			}
			_ => j += 1,
		}
	}
	bytes.len()
}

/// Index of the first non-whitespace byte at or after `idx`.
pub fn skip_whitespace(text: &str, idx: usize) -> usize {
	text.as_bytes()
		.get(idx..)
		.and_then(|rest| rest.iter().position(|b| !b.is_ascii_whitespace()))
		.map_or(text.len(), |offset| idx + offset)
}

/// A single replacement of a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	pub range: Range<usize>,
	pub replacement: String,
}

/// Apply edits sorted by start offset. An edit overlapping one already
/// applied is dropped.
pub fn apply_edits(text: &str, edits: &[Edit]) -> String {
	let mut out = String::with_capacity(text.len());
	let mut cursor = 0;

	for edit in edits {
		if edit.range.start < cursor {
			continue;
		}
		out.push_str(&text[cursor..edit.range.start]);
		out.push_str(&edit.replacement);
		cursor = edit.range.end;
	}
	out.push_str(&text[cursor..]);

	out
}
