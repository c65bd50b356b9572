//! Error types for curve construction and bootstrapping.

use pillar_core::{CoreError, Date};
use pillar_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Numerical failure from interpolation or the solver.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Date, tenor or day count failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An instrument matures before a node that was already accepted.
    #[error("Unordered instruments: {instrument} matures {maturity}, before accepted node {last_node}")]
    UnorderedInstruments {
        /// Offending instrument id.
        instrument: String,
        /// Its maturity.
        maturity: Date,
        /// Date of the last accepted node.
        last_node: Date,
    },

    /// A node would be placed before the curve's last node or base date.
    #[error("Node at {date} would precede {last}")]
    NodeOrder {
        /// Requested node date.
        date: Date,
        /// Date it must not precede.
        last: Date,
    },

    /// Two distinct node dates fall on the same point of the curve's time
    /// axis, as 30/360 does for the 30th and 31st of a month.
    #[error("Node at {date} has the same time {time} as the node at {existing}")]
    CoincidentNodes {
        /// Requested node date.
        date: Date,
        /// Date of the node already at that time.
        existing: Date,
        /// Shared year fraction from the base date.
        time: f64,
    },

    /// Nothing to bootstrap.
    #[error("No instruments provided for curve '{curve}'")]
    NoInstruments {
        /// Curve name.
        curve: String,
    },

    /// Reference dates between curves don't match.
    #[error("Reference date mismatch: expected {expected}, got {got}")]
    ReferenceMismatch {
        /// Expected reference date.
        expected: Date,
        /// Actual reference date.
        got: Date,
    },

    /// A base curve cannot carry a spread curve.
    #[error("Incompatible base curve '{base}': {reason}")]
    IncompatibleBase {
        /// Base curve name.
        base: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A curve referenced by name has not been built.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Missing curve name.
        name: String,
    },

    /// An instrument could not be priced.
    #[error("Pricing error in {instrument}: {reason}")]
    Pricing {
        /// Instrument id.
        instrument: String,
        /// What went wrong.
        reason: String,
    },

    /// Solving one node failed; the curve holds every node before it.
    #[error("Bootstrap failed at {instrument} ({maturity}), last quote error {last_error:.3e}: {source}")]
    NodeFailure {
        /// Instrument whose node could not be solved.
        instrument: String,
        /// Its maturity.
        maturity: Date,
        /// Quote error at the last trial value, NaN if none was evaluated.
        last_error: f64,
        /// Underlying failure.
        #[source]
        source: Box<CurveError>,
    },
}

impl CurveError {
    /// Creates a pricing error.
    #[must_use]
    pub fn pricing(instrument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Pricing {
            instrument: instrument.into(),
            reason: reason.into(),
        }
    }

    /// Creates an incompatible base error.
    #[must_use]
    pub fn incompatible_base(base: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IncompatibleBase {
            base: base.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a per-node failure with the instrument that caused it.
    #[must_use]
    pub fn node_failure(
        instrument: impl Into<String>,
        maturity: Date,
        last_error: f64,
        source: CurveError,
    ) -> Self {
        Self::NodeFailure {
            instrument: instrument.into(),
            maturity,
            last_error,
            source: Box::new(source),
        }
    }

    /// True for solver failures a caller may retry with other settings
    /// (wider bounds, looser tolerance, more iterations).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Math(e) => e.is_recoverable(),
            Self::NodeFailure { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}
