//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file failed validation.
    #[error("{path}: {count} validation error(s)")]
    InvalidConfig {
        /// Configuration file.
        path: String,
        /// Number of errors found.
        count: usize,
    },

    /// A discount measure was asked of a curve that holds something else.
    #[error("Curve '{curve}' is a {kind} curve; only discount curves have {measure}")]
    NotADiscountCurve {
        /// Curve name.
        curve: String,
        /// What the curve holds.
        kind: String,
        /// Requested measure.
        measure: String,
    },
}
