//! Per-file pipeline and console reporting.
//!
//! For each located file: read, pre-check, print issues, rewrite, write back
//! only if the text changed, print a confirmation, count. Read and write
//! failures are logged and counted, never propagated, so one bad file does
//! not stop the run.

use crate::engine::Engine;
use crate::rules::IssueKind;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Issue kinds detected per file, before rewriting.
pub type IssueReport = BTreeMap<PathBuf, BTreeSet<IssueKind>>;

/// Whether rewritten files are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// Rewrite files in place.
	Apply,
	/// Report what would change without writing anything.
	Check,
}

/// A file that could not be read or written.
#[derive(Debug)]
pub struct FileFailure {
	pub path: PathBuf,
	pub error: io::Error,
}

/// Counters and diagnostics for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
	/// Files visited.
	pub scanned: usize,

	/// Files for which the pre-check found at least one issue.
	pub with_issues: usize,

	/// Files rewritten (or, in check mode, that would be rewritten).
	pub fixed: usize,

	/// Files skipped because of an I/O or encoding error.
	pub failures: Vec<FileFailure>,

	/// Issue kinds per file, keyed by path.
	pub issues: IssueReport,
}

/// Runs the engine over a list of files and reports progress.
#[derive(Debug)]
pub struct Orchestrator<'a> {
	engine: &'a Engine,
	root: &'a Path,
	extension: &'a str,
	mode: Mode,
}

impl<'a> Orchestrator<'a> {
	/// `root` is used only to shorten displayed paths.
	pub fn new(engine: &'a Engine, root: &'a Path, extension: &'a str, mode: Mode) -> Self {
		Orchestrator {
			engine,
			root,
			extension,
			mode,
		}
	}

	/// Process `files` in order, printing per-file lines to `out`.
	///
	/// Only errors writing to `out` are returned.
	pub fn run<W: Write>(&self, files: &[PathBuf], out: &mut W) -> io::Result<RunSummary> {
		let mut summary = RunSummary::default();
		writeln!(out, "Found {} .{} files", files.len(), self.extension)?;

		for path in files {
			summary.scanned += 1;
			let shown = display_path(self.root, path);

			let text = match fs::read_to_string(path) {
				Ok(text) => text,
				Err(error) => {
					tracing::error!(path = %shown, error = %error, "failed to read file");
					summary.failures.push(FileFailure {
						path: path.clone(),
						error,
					});
					continue;
				}
			};

			let issues = self.engine.precheck(&text);
			if issues.is_empty() {
				tracing::debug!(path = %shown, "no issues");
				continue;
			}

			summary.with_issues += 1;
			writeln!(out, "  warning: {shown} - Issues: {}", join_labels(&issues))?;
			summary.issues.insert(path.clone(), issues);

			let outcome = self.engine.rewrite(&text, &logical_name(path));
			for warning in &outcome.warnings {
				tracing::warn!(path = %shown, "{warning}");
			}
			if !outcome.changed {
				continue;
			}

			match self.mode {
				Mode::Check => {
					summary.fixed += 1;
					writeln!(out, "  would fix: {shown}")?;
				}
				Mode::Apply => match fs::write(path, &outcome.text) {
					Ok(()) => {
						summary.fixed += 1;
						writeln!(out, "  fixed: {shown}")?;
					}
					Err(error) => {
						tracing::error!(path = %shown, error = %error, "failed to write file");
						summary.failures.push(FileFailure {
							path: path.clone(),
							error,
						});
					}
				},
			}
		}

		Ok(summary)
	}

	/// Print the closing summary block.
	pub fn print_summary<W: Write>(&self, summary: &RunSummary, out: &mut W) -> io::Result<()> {
		writeln!(out)?;
		writeln!(out, "Summary:")?;
		writeln!(out, "  - Total files scanned: {}", summary.scanned)?;
		writeln!(out, "  - Files with issues: {}", summary.with_issues)?;
		writeln!(out, "  - Files fixed: {}", summary.fixed)?;
		if !summary.failures.is_empty() {
			writeln!(out, "  - Files failed: {}", summary.failures.len())?;
		}
		writeln!(out)?;

		let closing = match (self.mode, summary.with_issues) {
			(_, 0) => "No compatibility issues found.",
			(Mode::Check, _) => "Run without --check to apply fixes.",
			(Mode::Apply, _) => "All compatibility issues have been fixed.",
		};
		writeln!(out, "{closing}")
	}
}

/// The logical name of a document: its file name without extension.
pub fn logical_name(path: &Path) -> String {
	path.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default()
}

/// Path relative to `root` with `/` separators, for console output.
pub fn display_path(root: &Path, path: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.to_string_lossy()
		.replace('\\', "/")
}

fn join_labels(issues: &BTreeSet<IssueKind>) -> String {
	issues
		.iter()
		.map(IssueKind::label)
		.collect::<Vec<_>>()
		.join(", ")
}
