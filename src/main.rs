//! Drill - identification drills with mastery tracking
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drill::cli::catalog_cmd::{load_catalog, CatalogCommand, CatalogOptions};
use drill::cli::init::{InitCommand, InitOptions};
use drill::cli::run::{RunCommand, RunOptions};
use drill::config::{drill_home, Config};
use drill::core::ExamSession;
use drill::error::exit_codes;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "DRILL_LOG";

// =============================================================================
// CLI Definition
// =============================================================================

/// Drill - identification drills with mastery tracking
#[derive(Parser)]
#[command(name = "drill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive drill (guess by item id, `?` to give up, `q` to quit)
    Run {
        /// Catalog file (.json or .toml); defaults to the alphabet
        #[arg(long, short)]
        catalog: Option<PathBuf>,
        /// Seed for reproducible sessions
        #[arg(long)]
        seed: Option<u64>,
        /// Number of choices per round
        #[arg(long)]
        set_size: Option<usize>,
        /// Output as JSON (one object per line)
        #[arg(long, short)]
        json: bool,
        /// Suppress per-round output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List catalog items
    Catalog {
        /// Catalog file (.json or .toml); defaults to the alphabet
        #[arg(long, short)]
        catalog: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Write a default project config to .drill/config.toml
    Init {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Force overwrite existing files
        #[arg(long, short)]
        force: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("drill error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Install the stderr subscriber. `DRILL_LOG` takes `EnvFilter` syntax.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.drill/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("drill panic: {}", info);

        if let Some(home) = drill_home() {
            let crash_log = home.join("crash.log");
            let _ = std::fs::create_dir_all(&home);
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Run {
            catalog,
            seed,
            set_size,
            json,
            quiet,
        } => run_drill(catalog.as_deref(), seed, set_size, json, quiet, &cwd),
        Commands::Catalog {
            catalog,
            json,
            quiet,
        } => run_catalog(catalog.as_deref(), json, quiet),
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::OK as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn run_drill(
    catalog: Option<&Path>,
    seed: Option<u64>,
    set_size: Option<usize>,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = Config::load_from_cwd(cwd);
    if let Some(seed) = seed {
        config.selection.seed = Some(seed);
    }
    if let Some(set_size) = set_size {
        config.exam.set_size = set_size;
    }

    let catalog = load_catalog(catalog)?;
    let session = ExamSession::from_config(catalog, &config)?;

    let mut cmd = RunCommand::new(session);
    let options = RunOptions { json, quiet };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let output = cmd.run(stdin.lock(), &mut stdout, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_catalog(
    catalog: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = CatalogCommand::new(catalog);
    let options = CatalogOptions { json, quiet };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = InitCommand::new(cwd);
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}
