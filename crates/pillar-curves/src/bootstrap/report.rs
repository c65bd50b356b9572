//! What a bootstrap did, node by node.

use pillar_core::Date;
use serde::Serialize;

/// How a node's value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NodeResolution {
    /// The first guess already reproduced the quote.
    InitialGuess,
    /// Brent's method was run.
    Solved {
        /// Objective evaluations used by the solver.
        iterations: u32,
    },
}

/// One accepted node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    /// Instrument that pinned the node.
    pub instrument: String,
    /// Node date.
    pub maturity: Date,
    /// Accepted value.
    pub value: f64,
    /// Quote error at the accepted value.
    pub error: f64,
    /// How the value was found.
    pub resolution: NodeResolution,
}

/// Why an instrument produced no node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// It matures on the curve's base date.
    BaseDate,
    /// Another instrument already pinned a node on the same date.
    DuplicateMaturity {
        /// The instrument that was kept.
        kept: String,
    },
}

/// An instrument that was passed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInstrument {
    /// Instrument id.
    pub instrument: String,
    /// Its maturity.
    pub maturity: Date,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Record of a completed bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BootstrapReport {
    /// Curve name.
    pub curve: String,
    /// Accepted nodes in maturity order.
    pub nodes: Vec<NodeReport>,
    /// Instruments that produced no node.
    pub skipped: Vec<SkippedInstrument>,
}

impl BootstrapReport {
    /// Creates an empty report for `curve`.
    #[must_use]
    pub fn new(curve: impl Into<String>) -> Self {
        Self {
            curve: curve.into(),
            ..Self::default()
        }
    }

    /// Total solver evaluations across all nodes.
    #[must_use]
    pub fn solver_iterations(&self) -> u32 {
        self.nodes
            .iter()
            .map(|n| match n.resolution {
                NodeResolution::InitialGuess => 0,
                NodeResolution::Solved { iterations } => iterations,
            })
            .sum()
    }

    /// True when no node needed the solver.
    #[must_use]
    pub fn all_accepted_by_guess(&self) -> bool {
        self.nodes
            .iter()
            .all(|n| n.resolution == NodeResolution::InitialGuess)
    }

    /// Largest absolute quote error over accepted nodes.
    #[must_use]
    pub fn max_abs_error(&self) -> f64 {
        self.nodes.iter().map(|n| n.error.abs()).fold(0.0, f64::max)
    }

    /// The node report for an instrument, if it pinned one.
    #[must_use]
    pub fn node(&self, instrument: &str) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.instrument == instrument)
    }
}
