//! CLI command implementations.

pub mod bootstrap;
pub mod query;
pub mod validate;

pub use bootstrap::BootstrapArgs;
pub use query::QueryArgs;
pub use validate::ValidateArgs;

use std::path::Path;

use anyhow::{Context, Result};
use pillar_config::{CurveSet, CurveSetConfig};
use tracing::info;

/// Loads and builds every curve of a configuration file.
pub fn build_curves(path: &Path) -> Result<CurveSet> {
    let config = CurveSetConfig::load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let built = config
        .build()
        .with_context(|| format!("Failed to build curves from {}", path.display()))?;
    info!(path = %path.display(), curves = built.len(), "curves built");
    Ok(built)
}
