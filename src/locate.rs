//! Source file discovery.
//!
//! This module handles:
//! - Validating the scan root
//! - Recursively walking it in a deterministic (file name) order
//! - Pruning hidden and build-output directories
//! - Filtering files by extension and excluded names

use crate::error::{FixError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names skipped by default (Xcode build output).
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["Build", "DerivedData"];

/// Default source file extension, without the dot.
pub const DEFAULT_EXTENSION: &str = "swift";

/// Filters applied while walking the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateOptions {
	/// File extension to keep, without the leading dot.
	pub extension: String,

	/// Directory names to prune (exact match on the final component).
	pub exclude_dirs: Vec<String>,

	/// File names to skip (exact match on the final component).
	pub exclude_files: Vec<String>,
}

impl Default for LocateOptions {
	fn default() -> Self {
		LocateOptions {
			extension: DEFAULT_EXTENSION.to_string(),
			exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
			exclude_files: Vec::new(),
		}
	}
}

/// Normalize a user-supplied extension: `.swift` and `swift` are equivalent.
pub fn normalize_extension(extension: &str) -> String {
	extension.trim().trim_start_matches('.').to_string()
}

/// Check that `root` is an existing directory and return its canonical form.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
	if !root.exists() {
		return Err(FixError::RootNotFound {
			path: root.to_path_buf(),
		});
	}
	if !root.is_dir() {
		return Err(FixError::RootNotDirectory {
			path: root.to_path_buf(),
		});
	}
	root.canonicalize().map_err(|_| FixError::RootNotFound {
		path: root.to_path_buf(),
	})
}

/// Recursively find source files under `root`.
///
/// Files are returned in file-name order within each directory. Entries that
/// cannot be read below the root are logged and skipped; an unreadable root
/// is an error.
pub fn locate(root: &Path, options: &LocateOptions) -> Result<Vec<PathBuf>> {
	if !root.is_dir() {
		return Err(if root.exists() {
			FixError::RootNotDirectory {
				path: root.to_path_buf(),
			}
		} else {
			FixError::RootNotFound {
				path: root.to_path_buf(),
			}
		});
	}

	let extension = OsStr::new(options.extension.as_str());
	let mut files = Vec::new();

	let walker = WalkDir::new(root)
		.sort_by_file_name()
		.into_iter()
		.filter_entry(|entry| !is_pruned(entry, options));

	for entry in walker {
		let entry = match entry {
			Ok(entry) => entry,
			Err(source) if source.depth() == 0 => {
				return Err(FixError::Walk {
					root: root.to_path_buf(),
					source,
				});
			}
			Err(err) => {
				tracing::warn!(
					path = ?err.path(),
					error = %err,
					"skipping unreadable entry"
				);
				continue;
			}
		};

		if !entry.file_type().is_file() || entry.path().extension() != Some(extension) {
			continue;
		}
		if is_listed(entry.file_name(), &options.exclude_files) {
			tracing::debug!(path = %entry.path().display(), "skipping excluded file");
			continue;
		}

		files.push(entry.into_path());
	}

	Ok(files)
}

fn is_pruned(entry: &DirEntry, options: &LocateOptions) -> bool {
	if entry.depth() == 0 || !entry.file_type().is_dir() {
		return false;
	}

	let name = entry.file_name();
	if name.to_string_lossy().starts_with('.') {
		tracing::debug!(path = %entry.path().display(), "skipping hidden directory");
		return true;
	}
	if is_listed(name, &options.exclude_dirs) {
		tracing::debug!(path = %entry.path().display(), "skipping excluded directory");
		return true;
	}

	false
}

fn is_listed(name: &OsStr, names: &[String]) -> bool {
	names.iter().any(|listed| OsStr::new(listed) == name)
}
