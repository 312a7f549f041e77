use std::path::PathBuf;

/// Library-level structured errors for swiftfix.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid value for {key}: {value:?}")]
	InvalidValue { key: String, value: String },

	#[error("Scan root does not exist: {path}")]
	RootNotFound { path: PathBuf },

	#[error("Scan root is not a directory: {path}")]
	RootNotDirectory { path: PathBuf },

	#[error("Failed to walk directory tree under {root}")]
	Walk {
		root: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using FixError.
pub type Result<T> = std::result::Result<T, FixError>;
