//! Sequential curve bootstrapping.
//!
//! Instruments are sorted by maturity and each one pins a single node,
//! solved against the nodes already accepted:
//!
//! 1. Skip instruments maturing on the base date or on an accepted node
//! 2. Compute a first guess (closed form, else the class default)
//! 3. Append a trial node at the maturity holding the guess
//! 4. Accept the guess if it already reproduces the quote
//! 5. Otherwise run Brent inside the class bounds and keep the root
//!
//! A failure removes the trial node and aborts the build; the curve keeps
//! every node accepted before it.
//!
//! # Example
//!
//! ```rust
//! use pillar_core::Date;
//! use pillar_curves::prelude::*;
//!
//! let spot = Date::from_ymd(2025, 1, 2).unwrap();
//! let output = Bootstrapper::new(CurveDefinition::discount("USD", spot))
//!     .add_instrument(Deposit::from_tenor(spot, "1M", 0.0023).unwrap())
//!     .add_instrument(Deposit::from_tenor(spot, "3M", 0.0027).unwrap())
//!     .add_instrument(Deposit::from_tenor(spot, "6M", 0.0043).unwrap())
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(output.curve.node_count(), 4);
//! assert_eq!(output.report.solver_iterations(), 0);
//! ```
//!
//! Independent curves can be built in parallel with [`build_independent`].

mod parallel;
mod report;
mod sequential;

pub use parallel::build_independent;
pub use report::{BootstrapReport, NodeReport, NodeResolution, SkipReason, SkippedInstrument};
pub use sequential::{BootstrapOutput, Bootstrapper};

use pillar_math::solvers::DEFAULT_MAX_ITERATIONS;

/// Default quote tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-11;

/// Configuration for the sequential bootstrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapConfig {
    /// Quote error below which a node is accepted; also the solver's
    /// bracket tolerance.
    pub tolerance: f64,
    /// Cap on objective evaluations per node.
    pub max_iterations: u32,
    /// When set, each node is solved by growing a bracket outward from
    /// its guess with this first step, inside the instrument class
    /// bounds, instead of bracketing the whole class range at once.
    pub step: Option<f64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step: None,
        }
    }
}

impl BootstrapConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
            step: None,
        }
    }

    /// Solves nodes by bracket expansion from the guess.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}
