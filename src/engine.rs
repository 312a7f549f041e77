//! The rewrite engine: an ordered set of rules applied to one document.
//!
//! The engine is a pure function over text. Reading and writing files is
//! left to the caller (see [`crate::report`]).

use crate::rules::scan::CodeMask;
use crate::rules::{IssueKind, RewriteRule, SourceText, rule_for};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// A rule produced output that looked structurally wrong and was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteWarning {
	/// The rule changed the document's brace balance.
	UnbalancedBraces {
		rule: IssueKind,
		before: isize,
		after: isize,
	},
}

impl fmt::Display for RewriteWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RewriteWarning::UnbalancedBraces {
				rule,
				before,
				after,
			} => write!(
				f,
				"{rule} rewrite changed brace balance from {before} to {after}; change discarded"
			),
		}
	}
}

/// Result of rewriting one document.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
	/// The transformed text.
	pub text: String,

	/// Whether `text` differs from the input byte-for-byte.
	pub changed: bool,

	/// Rules whose output was kept, in application order.
	pub applied: Vec<IssueKind>,

	/// Rule outputs that were discarded.
	pub warnings: Vec<RewriteWarning>,
}

/// Applies a fixed, ordered sequence of rewrite rules.
pub struct Engine {
	rules: Vec<Box<dyn RewriteRule>>,
}

impl Engine {
	/// Build an engine running the given rules.
	///
	/// Rules always run in [`IssueKind::ALL`] order no matter how `kinds` is
	/// ordered; duplicates are ignored.
	pub fn new(kinds: &[IssueKind]) -> Self {
		let rules = IssueKind::ALL
			.into_iter()
			.filter(|kind| kinds.contains(kind))
			.map(rule_for)
			.collect();
		Engine { rules }
	}

	/// The rules this engine runs, in order.
	pub fn kinds(&self) -> Vec<IssueKind> {
		self.rules.iter().map(|rule| rule.kind()).collect()
	}

	/// Report which rules would change `text`, without rewriting it.
	pub fn precheck(&self, text: &str) -> BTreeSet<IssueKind> {
		let source = SourceText {
			text,
			logical_name: "",
		};
		self.rules
			.iter()
			.filter(|rule| rule.detect(&source))
			.map(|rule| rule.kind())
			.collect()
	}

	/// Apply every rule in order.
	///
	/// A rule whose output changes the document's brace balance is treated
	/// as a mismatch: its output is dropped and a warning recorded.
	pub fn rewrite(&self, text: &str, logical_name: &str) -> RewriteOutcome {
		let mut current = text.to_string();
		let mut applied = Vec::new();
		let mut warnings = Vec::new();

		for rule in &self.rules {
			let source = SourceText {
				text: &current,
				logical_name,
			};
			let next = match rule.apply(&source) {
				Cow::Borrowed(_) => continue,
				Cow::Owned(next) => next,
			};
			if next == current {
				continue;
			}

			let before = CodeMask::new(&current).brace_balance(&current);
			let after = CodeMask::new(&next).brace_balance(&next);
			if before != after {
				warnings.push(RewriteWarning::UnbalancedBraces {
					rule: rule.kind(),
					before,
					after,
				});
				continue;
			}

			applied.push(rule.kind());
			current = next;
		}

		RewriteOutcome {
			changed: current != text,
			text: current,
			applied,
			warnings,
		}
	}
}

impl Default for Engine {
	fn default() -> Self {
		Engine::new(&IssueKind::ALL)
	}
}

impl fmt::Debug for Engine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Engine")
			.field("rules", &self.kinds())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct BrokenRule;

	impl RewriteRule for BrokenRule {
		fn kind(&self) -> IssueKind {
			IssueKind::Preview
		}

		fn detect(&self, _source: &SourceText<'_>) -> bool {
			true
		}

		fn apply<'a>(&self, source: &SourceText<'a>) -> Cow<'a, str> {
			Cow::Owned(format!("{} {{", source.text))
		}
	}

	const MIXED: &str = concat!(
		"import SwiftUI\n",
		"\n",
		"struct DetailView: View {\n",
		"    @State private var value = 0\n",
		"\n",
		"    var body: some View {\n",
		"        Text(\"\\(value)\")\n",
		"            .onChange(of: value) { oldValue, newValue in\n",
		"                log(newValue)\n",
		"            }\n",
		"            .onChange(of: value) { refreshUI() }\n",
		"    }\n",
		"}\n",
		"\n",
		"#Preview {\n",
		"    DetailView()\n",
		"}\n",
	);

	#[test]
	fn test_rewrite_applies_all_rules() {
		let engine = Engine::default();
		let outcome = engine.rewrite(MIXED, "DetailView");

		assert!(outcome.changed);
		assert_eq!(outcome.applied, vec![IssueKind::OnChange, IssueKind::Preview]);
		assert!(outcome.warnings.is_empty());
		assert!(outcome.text.contains(".onChange(of: value) { newValue in\n"));
		assert!(outcome.text.contains(".onChange(of: value) { _ in refreshUI() }"));
		assert!(outcome.text.contains(
			"struct DetailView_Previews: PreviewProvider {\n    static var previews: some View {\n        DetailView()\n    }\n}\n"
		));
		assert!(!outcome.text.contains("#Preview"));
	}

	#[test]
	fn test_rewrite_is_idempotent() {
		let engine = Engine::default();
		let once = engine.rewrite(MIXED, "DetailView");
		let twice = engine.rewrite(&once.text, "DetailView");

		assert_eq!(twice.text, once.text);
		assert!(!twice.changed);
		assert!(twice.applied.is_empty());
	}

	#[test]
	fn test_no_op_preserves_text() {
		let engine = Engine::default();
		let text = "struct Plain: View {\n    var body: some View { Text(\"hi\") }\n}\n";
		let outcome = engine.rewrite(text, "Plain");

		assert_eq!(outcome.text, text);
		assert!(!outcome.changed);
		assert!(engine.precheck(text).is_empty());
	}

	#[test]
	fn test_precheck_reports_matching_rules() {
		let engine = Engine::default();
		assert_eq!(
			engine.precheck(MIXED),
			BTreeSet::from([IssueKind::OnChange, IssueKind::Preview])
		);
		assert_eq!(
			engine.precheck("#Preview { A() }"),
			BTreeSet::from([IssueKind::Preview])
		);
		assert_eq!(
			engine.precheck(".onChange(of: a) { _, b in f(b) }"),
			BTreeSet::from([IssueKind::OnChange])
		);
	}

	#[test]
	fn test_precheck_does_not_mutate_and_matches_rewrite() {
		let engine = Engine::default();
		let text = ".onChange(of: a) { b in f(b) }\n#Preview(\"x\") { A() }\n";
		assert!(engine.precheck(text).is_empty());
		assert!(!engine.rewrite(text, "A").changed);
	}

	#[test]
	fn test_engine_with_subset_of_rules() {
		let engine = Engine::new(&[IssueKind::Preview]);
		assert_eq!(engine.kinds(), vec![IssueKind::Preview]);

		let outcome = engine.rewrite(MIXED, "DetailView");
		assert_eq!(outcome.applied, vec![IssueKind::Preview]);
		assert!(outcome.text.contains("{ oldValue, newValue in"));
	}

	#[test]
	fn test_engine_orders_rules() {
		let engine = Engine::new(&[IssueKind::Preview, IssueKind::OnChange, IssueKind::Preview]);
		assert_eq!(engine.kinds(), vec![IssueKind::OnChange, IssueKind::Preview]);
	}

	#[test]
	fn test_unbalanced_output_is_discarded() {
		let engine = Engine {
			rules: vec![Box::new(BrokenRule)],
		};
		let outcome = engine.rewrite("struct A {}", "A");

		assert!(!outcome.changed);
		assert_eq!(outcome.text, "struct A {}");
		assert_eq!(
			outcome.warnings,
			vec![RewriteWarning::UnbalancedBraces {
				rule: IssueKind::Preview,
				before: 0,
				after: 1,
			}]
		);
	}
}
