//! kmuc-hoster CLI
//!
//! Scaffolds the Docker setup of a small web project from a few questions.
//!
//! ## Usage
//!
//! ```bash
//! mkdir my-project && cd my-project
//! kmuc-hoster init
//! kmuc-hoster init --directory ../other-project
//! ```
//!
//! An interrupted `init` picks up where it stopped on the next run.

mod prompt;
mod report;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use kmuc_init::{InitError, InitOptions, InitResult, ProgressStore, run_init};
use tracing_subscriber::EnvFilter;

use crate::prompt::InquirePrompter;
use crate::report::{SpinnerReporter, print_summary};

#[derive(Parser)]
#[command(name = "kmuc-hoster")]
#[command(about = "Docker setup and deployment scripts for small web projects", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,

	/// Where to keep the init progress checkpoint
	#[arg(long, value_name = "PATH", env = "KMUC_PROGRESS_FILE", global = true)]
	progress_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Generate Dockerfile, docker-compose.yml and deploy scripts for a project
	Init {
		/// Project directory (defaults to the current directory)
		#[arg(short, long, value_name = "DIRECTORY", default_value = ".")]
		directory: PathBuf,
	},
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let store = match cli.progress_file {
		Some(path) => ProgressStore::at(path),
		None => ProgressStore::default_location(),
	};
	tracing::debug!(path = %store.path().display(), "using progress file");

	let result = match cli.command {
		Commands::Init { directory } => run_init_command(InitOptions { directory }, &store),
	};

	if let Err(e) = result {
		eprintln!("Error: {}", e);
		if let Some(hint) = error_hint(&e, store.exists()) {
			eprintln!("{}", hint.yellow());
		}
		process::exit(1);
	}
}

fn run_init_command(options: InitOptions, store: &ProgressStore) -> InitResult<()> {
	println!("{}", "kmuc-hoster init".cyan().bold());
	println!();

	let mut reporter = SpinnerReporter::new();
	match run_init(&options, &mut InquirePrompter, store, &mut reporter) {
		Ok(outcome) => {
			print_summary(&outcome);
			Ok(())
		}
		Err(InitError::Cancelled) => {
			println!("{}", "Aborted.".yellow());
			if store.exists() {
				println!("{}", RESUME_HINT.yellow());
			}
			Ok(())
		}
		Err(e) => Err(e),
	}
}

const RESUME_HINT: &str = "Progress was saved. Run `kmuc-hoster init` again to resume.";

/// Advice printed below an error message.
///
/// `checkpoint_saved` tells whether the run left a checkpoint behind.
fn error_hint(error: &InitError, checkpoint_saved: bool) -> Option<&'static str> {
	match error {
		InitError::UnsafeDirectory { .. } => Some(
			"Create a project directory first:\n  mkdir my-project && cd my-project && kmuc-hoster init",
		),
		_ if checkpoint_saved => Some(RESUME_HINT),
		_ => None,
	}
}

/// Log to stderr. `-v` flags win over `RUST_LOG`; the default is warnings only.
fn init_tracing(verbosity: u8) {
	let filter = match verbosity {
		0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
		1 => EnvFilter::new("info"),
		2 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.without_time()
		.init();
}
