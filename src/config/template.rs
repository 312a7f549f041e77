/// Generate the `.swiftfix.toml` written by `swiftfix --init`.
pub fn generate_init_template() -> String {
	r#"# swiftfix configuration
#
# Config files are discovered from the scan root upward. A file with
# `root = true` stops the cascade; ~/.swiftfix.toml is read last.

root = true

# File extension to scan (default: "swift").
# extension = "swift"

# Directory names to skip in addition to Build and DerivedData.
# Hidden directories are always skipped.
exclude-dirs = []

# File names to skip, e.g. the app entry point.
exclude-files = []

# Rules that should not run: "on-change", "preview".
disabled-rules = []

# Skip ~/.swiftfix.toml when this environment variable is truthy.
# user-config-lookup-disable-env-var = "CI"
"#
	.to_string()
}
