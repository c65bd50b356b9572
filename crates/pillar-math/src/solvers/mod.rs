//! One-dimensional root finding.
//!
//! The bootstrapper drives a quote error to zero one node at a time. The
//! solver here is Brent's method: inverse quadratic interpolation when the
//! step stays inside the bracket, bisection otherwise.
//!
//! Two entry points:
//!
//! - [`Brent::solve`]: the caller supplies a bracket `[lower, upper]`
//! - [`Brent::solve_with_step`]: the bracket is grown outward from a guess
//!
//! # Example
//!
//! ```rust
//! use pillar_math::solvers::{Brent, SolverConfig};
//!
//! let mut f = |x: f64| x * x - 2.0;
//! let result = Brent::new(SolverConfig::default())
//!     .solve(&mut f, 1.5, 1.0, 2.0)
//!     .unwrap();
//! assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```

mod brent;

pub use brent::{brent, Brent};

use crate::error::MathError;

/// Default tolerance for root finding.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default cap on objective evaluations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Convergence tolerance, applied to both bracket width and residual.
    pub tolerance: f64,
    /// Maximum number of objective evaluations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum evaluations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a successful solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of objective evaluations used.
    pub iterations: u32,
    /// Objective value at the last evaluation of `root`.
    pub residual: f64,
}

/// A function driven to zero by a solver.
///
/// Evaluation may fail (for example when a trial value makes the model
/// undefined); the error type only needs to absorb solver errors.
/// Closures `FnMut(f64) -> f64` implement this trait with `MathError`.
pub trait ObjectiveFunction {
    /// Error raised by evaluation and by the solver itself.
    type Error: From<MathError>;

    /// Objective value at `x`.
    fn value(&mut self, x: f64) -> Result<f64, Self::Error>;
}

impl<F> ObjectiveFunction for F
where
    F: FnMut(f64) -> f64,
{
    type Error = MathError;

    fn value(&mut self, x: f64) -> Result<f64, MathError> {
        Ok(self(x))
    }
}
