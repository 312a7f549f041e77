use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use swiftfix::config::{
	CONFIG_FILE_NAME, discover_configs, generate_init_template, load_merged_config, merge_configs,
	user_config_path,
};
use swiftfix::engine::Engine;
use swiftfix::locate::{locate, normalize_extension, resolve_root};
use swiftfix::report::{Mode, Orchestrator};
use swiftfix::rules::IssueKind;

#[derive(Parser)]
#[command(name = "swiftfix")]
#[command(
	author,
	version,
	about = "CLI tool for rewriting SwiftUI onChange closures and #Preview macros for older toolchains"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Directory to scan for source files (write a directory named `config` as `./config`)
	#[arg(env = "SWIFTFIX_ROOT", value_name = "ROOT")]
	root: Option<PathBuf>,

	/// Report files that would change without writing them (exits 1 if any)
	#[arg(long)]
	check: bool,

	/// Only run the given rule (repeatable)
	#[arg(long = "rule", value_name = "RULE", value_enum)]
	rules: Vec<IssueKind>,

	/// Also skip directories with this name (repeatable)
	#[arg(long = "exclude", value_name = "DIR")]
	excludes: Vec<String>,

	/// File extension to scan instead of the configured one
	#[arg(long, value_name = "EXT")]
	extension: Option<String>,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,

	/// Create a template .swiftfix.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .swiftfix.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the config cascade and the merged effective settings
	Show {
		/// Scan root to resolve configuration for (defaults to the current directory)
		root: Option<PathBuf>,
	},
	/// Check all config files for errors without scanning anything
	Validate {
		/// Scan root to resolve configuration for (defaults to the current directory)
		root: Option<PathBuf>,
	},
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	// Handle --init
	if cli.init {
		return handle_init(cli.force);
	}

	// Handle subcommands
	if let Some(ref command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show { root } => handle_config_show(root.as_deref()),
				ConfigAction::Validate { root } => handle_config_validate(root.as_deref()),
			},
		};
	}

	handle_fix(&cli)
}

fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter =
		EnvFilter::try_from_env("SWIFTFIX_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(false)
		.without_time()
		.init();
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	let template = generate_init_template();
	std::fs::write(&config_path, template)
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn config_root(root: Option<&Path>) -> Result<PathBuf> {
	match root {
		Some(root) => Ok(resolve_root(root)?),
		None => std::env::current_dir().context("Failed to get current directory"),
	}
}

fn handle_config_show(root: Option<&Path>) -> Result<ExitCode> {
	let root = config_root(root)?;
	let configs = discover_configs(&root).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
	} else {
		println!("Configuration files (in cascade order):\n");
	}

	for loaded in &configs {
		let config = &loaded.config;
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", config.root);
		if let Some(ref extension) = config.extension {
			println!("  extension: {}", extension);
		}
		if !config.exclude_dirs.is_empty() {
			println!("  exclude-dirs: {}", config.exclude_dirs.join(", "));
		}
		if !config.exclude_files.is_empty() {
			println!("  exclude-files: {}", config.exclude_files.join(", "));
		}
		if !config.disabled_rules.is_empty() {
			let names: Vec<_> = config.disabled_rules.iter().map(|r| r.config_name()).collect();
			println!("  disabled-rules: {}", names.join(", "));
		}
		if let Some(ref env_var) = config.user_config_lookup_disable_env_var {
			println!("  user-config-lookup-disable-env-var: {}", env_var);
		}
		println!();
	}

	let merged = merge_configs(&configs);
	let options = merged.locate_options();
	let rules: Vec<_> = merged.enabled_rules().iter().map(|r| r.config_name()).collect();
	println!("Effective settings:");
	println!("  extension: {}", options.extension);
	println!("  exclude-dirs: {}", options.exclude_dirs.join(", "));
	println!("  exclude-files: {}", options.exclude_files.join(", "));
	println!("  rules: {}", rules.join(", "));
	println!();

	// Show user config path
	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(root: Option<&Path>) -> Result<ExitCode> {
	let root = config_root(root)?;

	match discover_configs(&root) {
		Ok(configs) => {
			if configs.is_empty() {
				println!("No configuration files found.");
			} else {
				println!("All configuration files are valid:");
				for loaded in &configs {
					println!("  {}", loaded.path.display());
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			if let Some(source) = std::error::Error::source(&e) {
				eprintln!("  caused by: {}", source);
			}
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_fix(cli: &Cli) -> Result<ExitCode> {
	let root = cli
		.root
		.as_deref()
		.ok_or_else(|| anyhow::anyhow!("No scan root given. Pass ROOT or set SWIFTFIX_ROOT."))?;
	let root = resolve_root(root)?;

	let config = load_merged_config(&root).context("Failed to load configuration")?;

	let mut options = config.locate_options();
	for dir in &cli.excludes {
		if !options.exclude_dirs.contains(dir) {
			options.exclude_dirs.push(dir.clone());
		}
	}
	if let Some(ref extension) = cli.extension {
		options.extension = normalize_extension(extension);
		if options.extension.is_empty() {
			anyhow::bail!("Invalid --extension value: {extension:?}");
		}
	}

	// Explicit --rule flags win over disabled-rules from config.
	let kinds = if cli.rules.is_empty() {
		config.enabled_rules()
	} else {
		cli.rules.clone()
	};
	let engine = Engine::new(&kinds);
	let mode = if cli.check { Mode::Check } else { Mode::Apply };

	tracing::info!(root = %root.display(), rules = ?engine.kinds(), ?mode, "starting scan");
	println!("Scanning {} for .{} files...", root.display(), options.extension);

	let files = locate(&root, &options)
		.with_context(|| format!("Failed to scan {}", root.display()))?;

	let orchestrator = Orchestrator::new(&engine, &root, &options.extension, mode);
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	let summary = orchestrator
		.run(&files, &mut out)
		.context("Failed to write progress output")?;
	orchestrator
		.print_summary(&summary, &mut out)
		.context("Failed to write summary")?;

	if mode == Mode::Check && summary.with_issues > 0 {
		return Ok(ExitCode::FAILURE);
	}
	Ok(ExitCode::SUCCESS)
}
