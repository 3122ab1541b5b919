//! debugkit CLI - run built-in workloads under instrumentation wrappers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use debugkit_resource::CountingAllocator;

mod commands;
mod workloads;

/// Counts allocator activity so `--wrap gc` has something to observe.
#[global_allocator]
static ALLOCATOR: CountingAllocator = CountingAllocator::system();

/// debugkit Function Instrumentation Toolkit
#[derive(Parser)]
#[command(name = "debugkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Output format options.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run a workload under instrumentation
    Run(commands::run::RunArgs),
    /// List workloads and wrapper kinds
    List(commands::list::ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "debugkit={lvl},debugkit_core={lvl},debugkit_resource={lvl},debugkit_observe={lvl},debugkit_cli={lvl}",
            lvl = log_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Run the command
    let result = match cli.command {
        Commands::Run(args) => {
            commands::run::execute(args, cli.config.as_deref(), cli.format, cli.quiet)
        }
        Commands::List(args) => commands::list::execute(args, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
