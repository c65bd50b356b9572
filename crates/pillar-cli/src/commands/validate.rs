//! Validate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pillar_config::{CurveSetConfig, Validate};

use crate::error::CliError;
use crate::output::{print_error, print_success};

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Curve configuration file (.toml or .json)
    #[arg(short, long, env = "PILLAR_CONFIG")]
    pub config: PathBuf,
}

/// Execute the validate command.
pub fn execute(args: &ValidateArgs, quiet: bool) -> Result<()> {
    let path = args.config.display().to_string();
    let config = CurveSetConfig::load(&args.config)
        .with_context(|| format!("Failed to load {path}"))?;

    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            print_error(&error.to_string());
        }
        return Err(CliError::InvalidConfig {
            path,
            count: errors.len(),
        }
        .into());
    }

    if !quiet {
        let levels = config.build_levels()?;
        print_success(&format!(
            "{path}: {} curve(s) in {} build level(s)",
            config.curves.len(),
            levels.len()
        ));
    }
    Ok(())
}
