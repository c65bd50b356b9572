//! Error types for interpolation and root finding.

use thiserror::Error;

/// A specialized Result type for mathematical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors raised by point spaces, interpolation strategies, and solvers.
///
/// Two families live here. Contract violations (`InvalidSpace`,
/// `DegenerateBounds`, `InvalidDomain`, `ExtrapolationNotAllowed`,
/// `DimensionMismatch`, `InvalidInput`) are always fatal to the call that
/// raised them. Solver failures (`NoBracket`, `MaxIterationsExceeded`) are
/// node-local and reported as recoverable, see [`MathError::is_recoverable`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// A discrete space was built from unusable points.
    #[error("Invalid space: {reason}")]
    InvalidSpace {
        /// Description of the problem.
        reason: String,
    },

    /// Two bracketing points share the coordinate being interpolated along.
    #[error("Degenerate bounds: x0 = x1 = {x}")]
    DegenerateBounds {
        /// The shared coordinate.
        x: f64,
    },

    /// Log-linear interpolation over a non-positive value.
    #[error("Invalid domain: log-linear interpolation needs positive values, got {value}")]
    InvalidDomain {
        /// The offending value.
        value: f64,
    },

    /// Query lies outside the node range and extrapolation is off.
    #[error("Extrapolation not allowed: {x} is outside [{min}, {max}]")]
    ExtrapolationNotAllowed {
        /// The query coordinate.
        x: f64,
        /// Smallest node coordinate on that axis.
        min: f64,
        /// Largest node coordinate on that axis.
        max: f64,
    },

    /// Coordinate arity does not match the space.
    #[error("Dimension mismatch: expected {expected} coordinates, got {actual}")]
    DimensionMismatch {
        /// Expected number of independent coordinates.
        expected: usize,
        /// Number supplied.
        actual: usize,
    },

    /// The objective has the same sign at both ends of the bracket.
    #[error("No bracket: f({lower}) = {f_lower:.3e} and f({upper}) = {f_upper:.3e} have the same sign")]
    NoBracket {
        /// Lower end of the bracket.
        lower: f64,
        /// Upper end of the bracket.
        upper: f64,
        /// Objective at the lower end.
        f_lower: f64,
        /// Objective at the upper end.
        f_upper: f64,
    },

    /// The solver hit its evaluation cap.
    #[error("Maximum iterations exceeded: {iterations} evaluations (residual: {residual:.3e})")]
    MaxIterationsExceeded {
        /// Evaluations performed.
        iterations: u32,
        /// Absolute objective value at the best point.
        residual: f64,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates an invalid space error.
    #[must_use]
    pub fn invalid_space(reason: impl Into<String>) -> Self {
        Self::InvalidSpace {
            reason: reason.into(),
        }
    }

    /// Creates an invalid space error for too few points.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::invalid_space(format!("need at least {required} points, got {actual}"))
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a max iterations error.
    #[must_use]
    pub fn max_iterations(iterations: u32, residual: f64) -> Self {
        Self::MaxIterationsExceeded {
            iterations,
            residual,
        }
    }

    /// True for solver failures that another bracket or guess might fix.
    ///
    /// Everything else is a contract violation.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoBracket { .. } | Self::MaxIterationsExceeded { .. }
        )
    }
}
