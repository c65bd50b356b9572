//! # Pillar Config
//!
//! Curve build configuration for the Pillar bootstrapping engine.
//!
//! A configuration file (TOML or JSON) lists curves, each with its time
//! axis, interpolation, solver settings, and quoted instruments. Curves
//! may read other curves of the same file:
//!
//! - a zero curve with `base_curve` is built as a spread over that curve
//! - a volatility curve prices its caps and floors off `discount_curve`
//!
//! [`CurveSetConfig::build`] validates the file, orders the curves by
//! their references, and bootstraps each level of independent curves in
//! parallel.
//!
//! ## Example
//!
//! ```rust
//! use pillar_config::prelude::*;
//! use pillar_core::Date;
//!
//! let spot = Date::from_ymd(2025, 1, 2).unwrap();
//! let usd = CurveConfig::new("USD", spot)
//!     .with_instrument(InstrumentConfig::deposit("3M".parse().unwrap(), 0.0027))
//!     .with_instrument(InstrumentConfig::swap("2Y".parse().unwrap(), 0.0065));
//! assert!(usd.is_valid());
//!
//! let built = CurveSetConfig::new(vec![usd]).build().unwrap();
//! assert_eq!(built.get("USD").unwrap().report.nodes.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::too_many_lines)]

pub mod curve;
pub mod error;
pub mod set;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::curve::{
        CurveConfig, CurveKind, InstrumentConfig, OptionStripConfig, SolverSettings,
    };
    pub use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};
    pub use crate::set::{BuiltCurve, CurveSet, CurveSetConfig};
}

pub use curve::{CurveConfig, CurveKind, InstrumentConfig, OptionStripConfig, SolverSettings};
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use set::{BuiltCurve, CurveSet, CurveSetConfig};
