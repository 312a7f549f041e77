use crate::rules::scan::{CodeMask, Edit, apply_edits, skip_whitespace};
use crate::rules::{IssueKind, RewriteRule, SourceText};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

static MACRO: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"#Preview\b").expect("#Preview pattern is valid"));

static STRUCT_DECL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\bstruct\s+([A-Za-z_][A-Za-z0-9_]*)").expect("struct declaration pattern is valid")
});

/// Expands `#Preview { ... }` into a named `PreviewProvider` struct.
///
/// The struct is named after the document's logical name:
/// `#Preview { DetailView() }` in `DetailView.swift` becomes
/// `struct DetailView_Previews: PreviewProvider { static var previews: some View { DetailView() } }`.
///
/// A block spanning several lines is laid out as a multi-line struct at the
/// indentation of the `#Preview` line instead.
///
/// Later occurrences in the same document get a numeric suffix
/// (`DetailView_Previews2`, ...), skipping names already declared. Macros
/// with arguments, such as `#Preview("Dark") { ... }`, and empty bodies are
/// left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewRule;

impl RewriteRule for PreviewRule {
	fn kind(&self) -> IssueKind {
		IssueKind::Preview
	}

	fn detect(&self, source: &SourceText<'_>) -> bool {
		let mask = CodeMask::new(source.text);
		!find_sites(source.text, &mask).is_empty()
	}

	fn apply<'a>(&self, source: &SourceText<'a>) -> Cow<'a, str> {
		let text = source.text;
		let mask = CodeMask::new(text);
		let sites = find_sites(text, &mask);
		if sites.is_empty() {
			return Cow::Borrowed(text);
		}

		let base = type_name_base(source.logical_name);
		let mut taken = declared_structs(text, &mask);
		let edits: Vec<Edit> = sites
			.iter()
			.map(|site| {
				let name = next_free_name(&base, &mut taken);
				Edit {
					range: site.range.clone(),
					replacement: render_provider(text, site, &name),
				}
			})
			.collect();

		Cow::Owned(apply_edits(text, &edits))
	}
}

/// One `#Preview { ... }` occurrence.
#[derive(Debug)]
struct Site {
	/// From `#` through the closing brace.
	range: Range<usize>,

	/// Between the braces.
	content: Range<usize>,
}

fn find_sites(text: &str, mask: &CodeMask) -> Vec<Site> {
	let mut sites = Vec::new();
	let mut consumed = 0;

	for found in mask.code_matches(&MACRO, text) {
		if found.start() < consumed {
			continue;
		}

		let open = skip_whitespace(text, found.end());
		if text.as_bytes().get(open) != Some(&b'{') {
			continue;
		}
		let Some(close) = mask.matching_close(text, open) else {
			continue;
		};
		if text[open + 1..close].trim().is_empty() {
			continue;
		}

		sites.push(Site {
			range: found.start()..close + 1,
			content: open + 1..close,
		});
		consumed = close + 1;
	}

	sites
}

fn declared_structs(text: &str, mask: &CodeMask) -> HashSet<String> {
	STRUCT_DECL
		.captures_iter(text)
		.filter(|caps| caps.get(0).is_some_and(|m| mask.is_code(m.start())))
		.filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
		.collect()
}

fn next_free_name(base: &str, taken: &mut HashSet<String>) -> String {
	let mut candidate = format!("{base}_Previews");
	let mut index = 2;
	while taken.contains(&candidate) {
		candidate = format!("{base}_Previews{index}");
		index += 1;
	}
	taken.insert(candidate.clone());
	candidate
}

/// Turn a file stem into a Swift type name prefix.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, and a leading digit gets a
/// `_` prefix. An empty stem falls back to `Preview`.
pub fn type_name_base(logical_name: &str) -> String {
	let mut name: String = logical_name
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || c == '_' {
				c
			} else {
				'_'
			}
		})
		.collect();

	if name.is_empty() {
		return "Preview".to_string();
	}
	if name.starts_with(|c: char| c.is_ascii_digit()) {
		name.insert(0, '_');
	}
	name
}

fn render_provider(text: &str, site: &Site, name: &str) -> String {
	let raw = &text[site.content.clone()];
	let content = raw.trim();

	// A block written on one line stays on one line.
	if !raw.contains('\n') {
		return format!(
			"struct {name}: PreviewProvider {{ static var previews: some View {{ {content} }} }}"
		);
	}

	let indent = line_indent(text, site.range.start);
	let unit = if raw.lines().any(|line| line.starts_with('\t')) {
		"\t"
	} else {
		"    "
	};

	// Content moves one level deeper: it now sits inside `previews`.
	let mut body = String::with_capacity(content.len() + 64);
	for (i, line) in content.lines().enumerate() {
		if i > 0 {
			body.push('\n');
			if !line.trim().is_empty() {
				body.push_str(unit);
				body.push_str(line);
			}
		} else {
			body.push_str(line);
		}
	}

	format!(
		"struct {name}: PreviewProvider {{\n\
		 {indent}{unit}static var previews: some View {{\n\
		 {indent}{unit}{unit}{body}\n\
		 {indent}{unit}}}\n\
		 {indent}}}"
	)
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(text: &str, pos: usize) -> &str {
	let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
	let prefix = &text[line_start..pos];
	let width = prefix.len() - prefix.trim_start().len();
	&prefix[..width]
}
