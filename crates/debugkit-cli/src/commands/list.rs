//! List command - Show available workloads and wrapper kinds.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

use debugkit::WrapperKind;

use crate::OutputFormat;
use crate::workloads::Workload;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Show workloads only
    #[arg(long, conflicts_with = "wrappers")]
    pub workloads: bool,

    /// Show wrapper kinds only
    #[arg(long)]
    pub wrappers: bool,
}

#[derive(Debug, Serialize)]
struct WorkloadDisplay {
    name: &'static str,
    arguments: &'static str,
    about: &'static str,
}

#[derive(Debug, Serialize)]
struct WrapperDisplay {
    name: &'static str,
    about: &'static str,
}

/// Listing result.
#[derive(Debug, Serialize)]
struct Listing {
    #[serde(skip_serializing_if = "Option::is_none")]
    workloads: Option<Vec<WorkloadDisplay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wrappers: Option<Vec<WrapperDisplay>>,
}

fn wrapper_about(kind: WrapperKind) -> &'static str {
    match kind {
        WrapperKind::Inputs => "Log the call and its arguments before it runs",
        WrapperKind::Timing => "Run repeatedly and log each duration and the average",
        WrapperKind::Gc => "Log allocator counters when they changed across the call",
        WrapperKind::Resources => "Log CPU and virtual memory deltas",
        WrapperKind::DetailedResources => "Log CPU, time, memory, disk and network deltas",
    }
}

fn build_listing(args: &ListArgs) -> Listing {
    let show_all = !args.workloads && !args.wrappers;

    let workloads = (show_all || args.workloads).then(|| {
        Workload::value_variants()
            .iter()
            .map(|w| WorkloadDisplay {
                name: w.as_str(),
                arguments: w.synopsis(),
                about: w.about(),
            })
            .collect()
    });

    let wrappers = (show_all || args.wrappers).then(|| {
        WrapperKind::ALL
            .into_iter()
            .map(|kind| WrapperDisplay {
                name: kind.as_str(),
                about: wrapper_about(kind),
            })
            .collect()
    });

    Listing {
        workloads,
        wrappers,
    }
}

/// Execute the list command.
pub fn execute(args: ListArgs, format: OutputFormat) -> Result<()> {
    let listing = build_listing(&args);

    match format {
        OutputFormat::Human => {
            if let Some(workloads) = &listing.workloads {
                println!("Workloads:");
                for w in workloads {
                    println!("  {:<8} {:<28} {}", w.name, w.arguments, w.about);
                }
            }
            if let Some(wrappers) = &listing.wrappers {
                if listing.workloads.is_some() {
                    println!();
                }
                println!("Wrappers (--wrap, outermost first):");
                for w in wrappers {
                    println!("  {:<20} {}", w.name, w.about);
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::JsonCompact => {
            println!("{}", serde_json::to_string(&listing)?);
        }
    }

    Ok(())
}
