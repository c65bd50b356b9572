//! Bootstrap command implementation.
//!
//! Builds the curves of a configuration file and prints their nodes or
//! the per-node build report.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use pillar_config::{BuiltCurve, CurveKind};
use pillar_curves::bootstrap::{NodeResolution, SkipReason};
use pillar_curves::traits::{DiscountFactors, ReadableCurve};

use crate::cli::OutputFormat;
use crate::commands::build_curves;
use crate::output::{format_percent, format_value, print_header, print_output, print_warning};

/// Arguments for the bootstrap command.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Curve configuration file (.toml or .json)
    #[arg(short, long, env = "PILLAR_CONFIG")]
    pub config: PathBuf,

    /// Only print this curve (every curve is still built)
    #[arg(long)]
    pub curve: Option<String>,

    /// Print how each node was found instead of the nodes
    #[arg(long)]
    pub report: bool,
}

#[derive(Clone, Tabled, Serialize)]
struct NodeRow {
    #[tabled(rename = "Curve")]
    curve: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Zero Rate")]
    zero_rate: String,
}

#[derive(Tabled, Serialize)]
struct ReportRow {
    #[tabled(rename = "Curve")]
    curve: String,
    #[tabled(rename = "Instrument")]
    instrument: String,
    #[tabled(rename = "Maturity")]
    maturity: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Error")]
    error: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
}

/// Execute the bootstrap command.
pub fn execute(args: &BootstrapArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let built = build_curves(&args.config)?;
    let curves: Vec<&BuiltCurve> = match &args.curve {
        Some(name) => vec![built.get(name)?],
        None => built.iter().collect(),
    };

    if format == OutputFormat::Table && !quiet {
        for curve in &curves {
            for skipped in &curve.report.skipped {
                print_warning(&format!(
                    "{}: skipped {} maturing {} ({})",
                    curve.name,
                    skipped.instrument,
                    skipped.maturity,
                    describe_skip(&skipped.reason)
                ));
            }
        }
        let title = if args.report { "Bootstrap Report" } else { "Bootstrapped Curves" };
        print_header(title);
    }

    if args.report {
        let rows: Vec<ReportRow> = curves.iter().flat_map(|c| report_rows(c)).collect();
        print_output(&rows, format)
    } else {
        let rows = curves
            .iter()
            .map(|c| node_rows(c))
            .collect::<Result<Vec<_>>>()?
            .concat();
        print_output(&rows, format)
    }
}

fn node_rows(built: &BuiltCurve) -> Result<Vec<NodeRow>> {
    let curve = built.curve.as_ref();
    curve
        .nodes()
        .into_iter()
        .map(|(date, value)| -> Result<NodeRow> {
            let t = curve.time(date);
            let zero_rate = if built.kind == CurveKind::Discount && t > 0.0 {
                format_percent(curve.zero_rate(date)?)
            } else {
                "-".to_string()
            };
            Ok(NodeRow {
                curve: built.name.clone(),
                date: date.to_string(),
                time: format!("{t:.6}"),
                value: format_value(value),
                zero_rate,
            })
        })
        .collect()
}

fn report_rows(built: &BuiltCurve) -> Vec<ReportRow> {
    built
        .report
        .nodes
        .iter()
        .map(|node| ReportRow {
            curve: built.name.clone(),
            instrument: node.instrument.clone(),
            maturity: node.maturity.to_string(),
            value: format_value(node.value),
            error: format!("{:.3e}", node.error),
            resolution: match node.resolution {
                NodeResolution::InitialGuess => "guess".to_string(),
                NodeResolution::Solved { iterations } => format!("solved ({iterations})"),
            },
        })
        .collect()
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::BaseDate => "matures on the base date".to_string(),
        SkipReason::DuplicateMaturity { kept } => format!("same maturity as {kept}"),
    }
}
