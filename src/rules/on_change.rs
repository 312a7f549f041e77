use crate::rules::scan::{CodeMask, Edit, apply_edits, skip_whitespace};
use crate::rules::{IssueKind, RewriteRule, SourceText};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static CALL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\.onChange\s*\(").expect("onChange call pattern is valid"));

static OF_LABEL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*of\s*:").expect("of: label pattern is valid"));

static TWO_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*(_|[A-Za-z_][A-Za-z0-9_]*)\s*,\s*([A-Za-z_][A-Za-z0-9_]*)\s+in\b")
		.expect("parameter list pattern is valid")
});

static IN_KEYWORD: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\bin\b").expect("in keyword pattern is valid"));

/// Normalizes `.onChange(of:)` trailing closures to the single-parameter
/// form.
///
/// - `{ oldValue, newValue in ... }` and `{ _, newValue in ... }` lose their
///   first parameter.
/// - A body with no parameter list gets a discard parameter:
///   `{ refreshUI() }` becomes `{ _ in refreshUI() }`.
///
/// Bodies that already contain an `in` keyword or start with `_` are left
/// alone, as are calls without a trailing closure.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnChangeRule;

impl RewriteRule for OnChangeRule {
	fn kind(&self) -> IssueKind {
		IssueKind::OnChange
	}

	fn detect(&self, source: &SourceText<'_>) -> bool {
		!find_edits(source.text).is_empty()
	}

	fn apply<'a>(&self, source: &SourceText<'a>) -> Cow<'a, str> {
		let edits = find_edits(source.text);
		if edits.is_empty() {
			Cow::Borrowed(source.text)
		} else {
			Cow::Owned(apply_edits(source.text, &edits))
		}
	}
}

fn find_edits(text: &str) -> Vec<Edit> {
	let mask = CodeMask::new(text);
	let mut edits = Vec::new();

	for call in mask.code_matches(&CALL, text) {
		if !OF_LABEL.is_match(&text[call.end()..]) {
			continue;
		}

		let open_paren = call.end() - 1;
		let Some(close_paren) = mask.matching_close(text, open_paren) else {
			continue;
		};

		// Only trailing closures are rewritten; `perform:` arguments are not.
		let open_brace = skip_whitespace(text, close_paren + 1);
		if text.as_bytes().get(open_brace) != Some(&b'{') {
			continue;
		}
		let Some(close_brace) = mask.matching_close(text, open_brace) else {
			continue;
		};

		if let Some(edit) = closure_edit(text, &mask, open_brace, close_brace) {
			edits.push(edit);
		}
	}

	edits.sort_by_key(|edit| edit.range.start);
	edits
}

fn closure_edit(text: &str, mask: &CodeMask, open_brace: usize, close_brace: usize) -> Option<Edit> {
	let body_start = open_brace + 1;
	let body = &text[body_start..close_brace];

	if let Some(caps) = TWO_PARAMS.captures(body) {
		let first = caps.get(1)?;
		let second = caps.get(2)?;
		if !mask.is_code(body_start + second.start()) {
			return None;
		}
		return Some(Edit {
			range: body_start + first.start()..body_start + second.start(),
			replacement: String::new(),
		});
	}

	let trimmed = body.trim_start();
	if trimmed.is_empty() || trimmed.starts_with('_') || has_in_keyword(mask, body, body_start) {
		return None;
	}

	let replacement = if body.starts_with(char::is_whitespace) {
		" _ in"
	} else {
		" _ in "
	};
	Some(Edit {
		range: body_start..body_start,
		replacement: replacement.to_string(),
	})
}

fn has_in_keyword(mask: &CodeMask, body: &str, body_start: usize) -> bool {
	IN_KEYWORD
		.find_iter(body)
		.any(|found| mask.is_code(body_start + found.start()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rewrite(text: &str) -> String {
		let source = SourceText {
			text,
			logical_name: "ContentView",
		};
		OnChangeRule.apply(&source).into_owned()
	}

	fn detects(text: &str) -> bool {
		let source = SourceText {
			text,
			logical_name: "ContentView",
		};
		OnChangeRule.detect(&source)
	}

	#[test]
	fn test_old_and_new_value_to_single_parameter() {
		assert_eq!(
			rewrite(".onChange(of: value) { oldValue, newValue in doSomething(newValue) }"),
			".onChange(of: value) { newValue in doSomething(newValue) }"
		);
	}

	#[test]
	fn test_discard_and_new_value_to_single_parameter() {
		assert_eq!(
			rewrite(".onChange(of: value) { _, newValue in use(newValue) }"),
			".onChange(of: value) { newValue in use(newValue) }"
		);
	}

	#[test]
	fn test_two_discards_to_single_discard() {
		let input = ".onChange(of: editedName) { _, _ in checkForChanges() }";
		let once = rewrite(input);
		assert_eq!(once, ".onChange(of: editedName) { _ in checkForChanges() }");
		assert_eq!(rewrite(&once), once);
		assert!(!detects(&once));
	}

	#[test]
	fn test_bare_body_gets_discard_parameter() {
		assert_eq!(
			rewrite(".onChange(of: value) { refreshUI() }"),
			".onChange(of: value) { _ in refreshUI() }"
		);
	}

	#[test]
	fn test_bare_body_without_leading_space() {
		assert_eq!(
			rewrite(".onChange(of: value) {refreshUI()}"),
			".onChange(of: value) { _ in refreshUI()}"
		);
	}

	#[test]
	fn test_multiline_bare_body() {
		let input = "Text(\"x\")\n    .onChange(of: scenePhase) {\n        save()\n    }\n";
		let expected = "Text(\"x\")\n    .onChange(of: scenePhase) { _ in\n        save()\n    }\n";
		assert_eq!(rewrite(input), expected);
	}

	#[test]
	fn test_multiline_two_parameters() {
		let input = ".onChange(of: query) { oldQuery,\n    newQuery in\n    search(newQuery)\n}";
		let expected = ".onChange(of: query) { newQuery in\n    search(newQuery)\n}";
		assert_eq!(rewrite(input), expected);
	}

	#[test]
	fn test_tolerates_whitespace_between_tokens() {
		assert_eq!(
			rewrite(".onChange ( of :value )\n{oldValue , newValue in x()}"),
			".onChange ( of :value )\n{newValue in x()}"
		);
	}

	#[test]
	fn test_bare_body_with_nested_block_is_wrapped_whole() {
		assert_eq!(
			rewrite(".onChange(of: flag) { if flag { refresh() } else { reset() } }\nnext()"),
			".onChange(of: flag) { _ in if flag { refresh() } else { reset() } }\nnext()"
		);
	}

	#[test]
	fn test_nested_parentheses_in_argument() {
		assert_eq!(
			rewrite(".onChange(of: items.filter({ $0.done }).count) { _, count in show(count) }"),
			".onChange(of: items.filter({ $0.done }).count) { count in show(count) }"
		);
	}

	#[test]
	fn test_single_parameter_untouched() {
		let input = ".onChange(of: value) { newValue in use(newValue) }";
		assert_eq!(rewrite(input), input);
		assert!(!detects(input));
	}

	#[test]
	fn test_discard_parameter_untouched() {
		let input = ".onChange(of: value) { _ in refreshUI() }";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_body_with_inner_in_keyword_untouched() {
		let input = ".onChange(of: items) { items.forEach { item in log(item) } }";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_body_starting_with_discard_untouched() {
		let input = ".onChange(of: value) { _ = model.reload() }";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_empty_body_untouched() {
		let input = ".onChange(of: value) {  }";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_perform_argument_untouched() {
		let input = ".onChange(of: value, perform: handle)";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_call_without_of_label_untouched() {
		let input = "model.onChange(handler) { refresh() }";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_string_and_comment_occurrences_untouched() {
		let input = "let doc = \".onChange(of: x) { y() }\"\n// .onChange(of: x) { y() }\n";
		assert_eq!(rewrite(input), input);
		assert!(!detects(input));
	}

	#[test]
	fn test_unbalanced_closure_untouched() {
		let input = ".onChange(of: value) { refresh(\n";
		assert_eq!(rewrite(input), input);
	}

	#[test]
	fn test_multiple_calls_rewritten() {
		let input = concat!(
			"a.onChange(of: x) { _, nx in f(nx) }\n",
			"b.onChange(of: y) { g() }\n",
			"c.onChange(of: z) { nz in h(nz) }\n",
		);
		let expected = concat!(
			"a.onChange(of: x) { nx in f(nx) }\n",
			"b.onChange(of: y) { _ in g() }\n",
			"c.onChange(of: z) { nz in h(nz) }\n",
		);
		assert_eq!(rewrite(input), expected);
	}

	#[test]
	fn test_rewrite_is_idempotent() {
		let input = concat!(
			".onChange(of: a) { oldValue, newValue in f(newValue) }\n",
			".onChange(of: b) { reload() }\n",
		);
		let once = rewrite(input);
		assert_eq!(rewrite(&once), once);
		assert!(!detects(&once));
	}

	#[test]
	fn test_no_match_borrows_input() {
		let source = SourceText {
			text: "struct A {}",
			logical_name: "A",
		};
		assert!(matches!(OnChangeRule.apply(&source), Cow::Borrowed(_)));
	}
}
