//! Building independent curves concurrently.

use rayon::prelude::*;
use tracing::info;

use super::sequential::{BootstrapOutput, Bootstrapper};
use crate::error::CurveResult;

/// Runs bootstrappers that share no mutable state on the rayon pool.
///
/// Each curve is built sequentially on its own; results come back in the
/// order of `jobs`. Frozen base curves may be shared between jobs through
/// `Arc`, but no job can depend on another job's output.
pub fn build_independent(jobs: Vec<Bootstrapper>) -> Vec<CurveResult<BootstrapOutput>> {
    info!(curves = jobs.len(), "parallel bootstrap");
    jobs.into_par_iter().map(Bootstrapper::run).collect()
}
