//! Rewrite rules for swiftfix.
//!
//! This module handles:
//! - Delimiter-aware scanning of source text (strings and comments skipped)
//! - Normalizing `.onChange(of:)` closures to the single-parameter form
//! - Expanding `#Preview` macros into `PreviewProvider` structs

pub mod on_change;
pub mod preview;
pub mod scan;

pub use on_change::OnChangeRule;
pub use preview::PreviewRule;

use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

/// Which rule matched a document. Used for reporting and rule selection.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
	/// Two-parameter or parameterless `.onChange(of:)` closure.
	OnChange,
	/// Inline `#Preview { ... }` macro.
	Preview,
}

impl IssueKind {
	/// Every rule, in the order the engine applies them.
	pub const ALL: [IssueKind; 2] = [IssueKind::OnChange, IssueKind::Preview];

	/// Label printed in per-file warnings.
	pub fn label(&self) -> &'static str {
		match self {
			IssueKind::OnChange => "onChange",
			IssueKind::Preview => "#Preview",
		}
	}

	/// Name used in config files and on the command line.
	pub fn config_name(&self) -> &'static str {
		match self {
			IssueKind::OnChange => "on-change",
			IssueKind::Preview => "preview",
		}
	}
}

impl fmt::Display for IssueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// The text of one document and the logical name derived from its path.
#[derive(Debug, Clone, Copy)]
pub struct SourceText<'a> {
	/// Full document text.
	pub text: &'a str,

	/// Base file name without extension, e.g. `DetailView`.
	pub logical_name: &'a str,
}

/// A pure text-to-text transformation for one syntax shape.
///
/// Implementations must be idempotent: applying a rule to its own output
/// returns that output unchanged. Regions the rule cannot match with
/// confidence are left untouched.
pub trait RewriteRule {
	/// The issue kind this rule fixes.
	fn kind(&self) -> IssueKind;

	/// Whether `apply` would change the document.
	fn detect(&self, source: &SourceText<'_>) -> bool;

	/// Rewrite the document, borrowing the input when nothing matched.
	fn apply<'a>(&self, source: &SourceText<'a>) -> Cow<'a, str>;
}

/// Build the rule implementing `kind`.
pub fn rule_for(kind: IssueKind) -> Box<dyn RewriteRule> {
	match kind {
		IssueKind::OnChange => Box::new(OnChangeRule),
		IssueKind::Preview => Box::new(PreviewRule),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_issue_kind_labels() {
		assert_eq!(IssueKind::OnChange.to_string(), "onChange");
		assert_eq!(IssueKind::Preview.to_string(), "#Preview");
	}

	#[test]
	fn test_rule_for_kind() {
		for kind in IssueKind::ALL {
			assert_eq!(rule_for(kind).kind(), kind);
		}
	}

	#[test]
	fn test_issue_kind_deserializes_kebab_case() {
		#[derive(Deserialize)]
		struct Wrapper {
			rules: Vec<IssueKind>,
		}

		let parsed: Wrapper = toml::from_str(r#"rules = ["on-change", "preview"]"#).unwrap();
		assert_eq!(parsed.rules, vec![IssueKind::OnChange, IssueKind::Preview]);
	}
}
