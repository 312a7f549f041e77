use crate::locate::{DEFAULT_EXCLUDE_DIRS, DEFAULT_EXTENSION, LocateOptions, normalize_extension};
use crate::rules::IssueKind;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Top-level configuration from a `.swiftfix.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
	/// If true, stop the directory cascade here and jump to ~/.swiftfix.toml.
	#[serde(default)]
	pub root: bool,

	/// Source file extension to scan, with or without the leading dot.
	#[serde(default)]
	pub extension: Option<String>,

	/// Extra directory names to skip while scanning.
	#[serde(default)]
	pub exclude_dirs: Vec<String>,

	/// File names to skip while scanning.
	#[serde(default)]
	pub exclude_files: Vec<String>,

	/// Rules that should not run.
	#[serde(default)]
	pub disabled_rules: Vec<IssueKind>,

	/// Environment variable name that, if truthy, skips ~/.swiftfix.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub user_config_lookup_disable_env_var: Option<String>,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from every config file in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// Extension from the most specific config that sets one.
	pub extension: Option<String>,

	/// Union of all `exclude-dirs`, in cascade order.
	pub exclude_dirs: Vec<String>,

	/// Union of all `exclude-files`, in cascade order.
	pub exclude_files: Vec<String>,

	/// Union of all `disabled-rules`.
	pub disabled_rules: BTreeSet<IssueKind>,

	/// Config files that contributed, most specific first.
	pub sources: Vec<PathBuf>,
}

impl Config {
	/// Validate values serde cannot check on its own.
	pub fn validate(&self) -> Result<(), crate::error::FixError> {
		if let Some(ref extension) = self.extension
			&& (normalize_extension(extension).is_empty() || extension.contains(['/', '\\']))
		{
			return Err(crate::error::FixError::InvalidValue {
				key: "extension".to_string(),
				value: extension.clone(),
			});
		}

		let names = [
			("exclude-dirs", &self.exclude_dirs),
			("exclude-files", &self.exclude_files),
		];
		for (key, values) in names {
			if let Some(bad) = values
				.iter()
				.find(|v| v.trim().is_empty() || v.contains(['/', '\\']))
			{
				return Err(crate::error::FixError::InvalidValue {
					key: key.to_string(),
					value: bad.clone(),
				});
			}
		}

		Ok(())
	}
}

impl MergedConfig {
	/// Locator filters: built-in excluded directories plus configured ones.
	pub fn locate_options(&self) -> LocateOptions {
		let mut exclude_dirs: Vec<String> =
			DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect();
		for dir in &self.exclude_dirs {
			if !exclude_dirs.contains(dir) {
				exclude_dirs.push(dir.clone());
			}
		}

		LocateOptions {
			extension: self
				.extension
				.as_deref()
				.map(normalize_extension)
				.unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
			exclude_dirs,
			exclude_files: self.exclude_files.clone(),
		}
	}

	/// Rules left after removing the disabled ones.
	pub fn enabled_rules(&self) -> Vec<IssueKind> {
		IssueKind::ALL
			.into_iter()
			.filter(|kind| !self.disabled_rules.contains(kind))
			.collect()
	}
}
