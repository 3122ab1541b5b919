//! Run command - Execute a workload under instrumentation.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use debugkit::prelude::*;
use debugkit_observe::ReportRecord;

use crate::OutputFormat;
use crate::workloads::{self, Workload, WorkloadError, positional};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Workload to execute
    #[arg(required = true)]
    pub workload: Workload,

    /// Positional arguments for the workload
    pub args: Vec<String>,

    /// Wrapper to apply, outermost first (repeatable)
    #[arg(short = 'w', long = "wrap")]
    pub wrap: Vec<WrapperKind>,

    /// Number of timed runs (overrides the config file)
    #[arg(short = 'n', long)]
    pub runs: Option<i64>,

    /// Report severity (overrides the config file)
    #[arg(short, long)]
    pub severity: Option<Severity>,

    /// Also append report lines to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run result.
#[derive(Debug, Serialize)]
struct RunResult {
    workload: Workload,
    stack: Vec<WrapperKind>,
    runs: i64,
    result: Value,
    reports: Vec<ReportRecord>,
}

/// Execute the run command.
pub fn execute(
    args: RunArgs,
    config_path: Option<&Path>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let config = resolve_config(&args, config_path)?;

    // Report lines always go to the collector; live output depends on flags
    let collector = Arc::new(CollectingReporter::new());
    let dispatcher = ReportDispatcher::new().with_sink(collector.clone());
    if matches!(format, OutputFormat::Human) && !quiet {
        dispatcher.subscribe(Arc::new(WriterReporter::new(std::io::stdout())));
    }
    if let Some(path) = &args.output {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;
        dispatcher.subscribe(Arc::new(WriterReporter::new(file)));
    }

    let toolkit = Toolkit::builder()
        .with_config(&config)
        .with_reporter(Arc::new(dispatcher))
        .with_gc_counter(Arc::new(&crate::ALLOCATOR))
        .build()
        .context("Invalid instrumentation config")?;

    if config.stack.is_empty() {
        tracing::info!(workload = args.workload.as_str(), "Running workload without instrumentation");
    } else {
        tracing::info!(
            workload = args.workload.as_str(),
            wrappers = ?config.stack,
            runs = config.runs,
            "Running instrumented workload"
        );
    }

    let result = dispatch(&toolkit, &config.stack, args.workload, &args.args)?;

    match format {
        OutputFormat::Human => {
            println!("Result: {}", result);
        }
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let report = RunResult {
                workload: args.workload,
                stack: config.stack,
                runs: config.runs,
                result,
                reports: collector.records(),
            };
            let json = if matches!(format, OutputFormat::JsonCompact) {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &RunArgs, config_path: Option<&Path>) -> Result<InstrumentConfig> {
    let mut config = match config_path {
        Some(path) => InstrumentConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => InstrumentConfig::default(),
    };

    if !args.wrap.is_empty() {
        config.stack = args.wrap.clone();
    }
    if let Some(runs) = args.runs {
        config.runs = runs;
    }
    if let Some(severity) = args.severity {
        config.severity = severity;
    }

    config.validate()?;
    Ok(config)
}

fn dispatch(
    toolkit: &Toolkit,
    stack: &[WrapperKind],
    workload: Workload,
    args: &[String],
) -> Result<Value> {
    match workload {
        Workload::Add => {
            let a = positional(args, 0, "A", 1i64)?;
            let b = positional(args, 1, "B", 2i64)?;
            invoke(toolkit, stack, workloads::add(), (a, b))
        }
        Workload::Sleep => {
            let seconds = positional(args, 0, "SECONDS", 0.1f64)?;
            invoke(toolkit, stack, workloads::sleep(), (seconds,))
        }
        Workload::Spin => {
            let iterations = positional(args, 0, "ITERATIONS", 10_000_000u64)?;
            invoke(toolkit, stack, workloads::spin(), (iterations,))
        }
        Workload::Alloc => {
            let count = positional(args, 0, "COUNT", 1000usize)?;
            let size = positional(args, 1, "SIZE", 1024usize)?;
            invoke(toolkit, stack, workloads::alloc(), (count, size))
        }
        Workload::Write => {
            let bytes = positional(args, 0, "BYTES", 1024 * 1024u64)?;
            invoke(toolkit, stack, workloads::write(), (bytes,))
        }
        Workload::Fail => {
            let message = args
                .first()
                .cloned()
                .unwrap_or_else(|| "requested failure".to_string());
            invoke(toolkit, stack, workloads::fail(), (message,))
        }
    }
}

fn invoke<Args, C>(toolkit: &Toolkit, stack: &[WrapperKind], callable: C, args: Args) -> Result<Value>
where
    Args: Arguments + Clone,
    C: Callable<Args, Error = WorkloadError> + Send + Sync,
    C::Output: Serialize,
{
    let output = toolkit
        .apply(callable, stack)
        .call(args)
        .context("Workload failed")?;
    Ok(serde_json::to_value(output)?)
}
