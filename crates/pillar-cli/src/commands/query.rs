//! Query command implementation.
//!
//! Evaluates a bootstrapped curve at arbitrary dates.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use pillar_config::CurveKind;
use pillar_core::Date;
use pillar_curves::curve::FrozenCurve;
use pillar_curves::traits::{DiscountFactors, ReadableCurve};

use crate::cli::OutputFormat;
use crate::commands::build_curves;
use crate::error::CliError;
use crate::output::{format_value, print_output};

/// Arguments for the query command.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Curve configuration file (.toml or .json)
    #[arg(short, long, env = "PILLAR_CONFIG")]
    pub config: PathBuf,

    /// Curve to evaluate
    #[arg(long)]
    pub curve: String,

    /// Dates (YYYY-MM-DD, comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub dates: Vec<Date>,

    /// What to read off the curve
    #[arg(short, long, value_enum, default_value = "value")]
    pub measure: Measure,
}

/// Curve measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Measure {
    /// Interpolated curve value
    #[default]
    Value,
    /// Discount factor
    #[value(name = "df")]
    DiscountFactor,
    /// Continuously compounded zero rate
    Zero,
}

impl Measure {
    fn name(self) -> &'static str {
        match self {
            Measure::Value => "value",
            Measure::DiscountFactor => "discount factors",
            Measure::Zero => "zero rates",
        }
    }

    fn evaluate(self, curve: &FrozenCurve, date: Date) -> Result<f64> {
        let value = match self {
            Measure::Value => curve.value(date)?,
            Measure::DiscountFactor => curve.discount_factor(date)?,
            Measure::Zero => curve.zero_rate(date)?,
        };
        Ok(value)
    }
}

#[derive(Tabled, Serialize)]
struct QueryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Execute the query command.
pub fn execute(args: &QueryArgs, format: OutputFormat) -> Result<()> {
    let built = build_curves(&args.config)?;
    let target = built.get(&args.curve)?;

    if args.measure != Measure::Value && target.kind != CurveKind::Discount {
        return Err(CliError::NotADiscountCurve {
            curve: target.name.clone(),
            kind: target.kind.to_string(),
            measure: args.measure.name().to_string(),
        }
        .into());
    }

    let curve = target.curve.as_ref();
    let values = args
        .dates
        .iter()
        .map(|&date| args.measure.evaluate(curve, date))
        .collect::<Result<Vec<_>>>()?;

    if format == OutputFormat::Minimal {
        for value in values {
            println!("{value}");
        }
        return Ok(());
    }

    let rows: Vec<QueryRow> = args
        .dates
        .iter()
        .zip(values)
        .map(|(&date, value)| QueryRow {
            date: date.to_string(),
            time: format!("{:.6}", curve.time(date)),
            value: format_value(value),
        })
        .collect();
    print_output(&rows, format)
}
