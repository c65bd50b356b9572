//! # Pillar Curves
//!
//! Sequential bootstrapping of curves from market instruments.
//!
//! This crate provides:
//!
//! - **Curves**: [`CurveUnderConstruction`](curve::CurveUnderConstruction),
//!   mutable only at its last node, frozen into a shareable
//!   [`FrozenCurve`](curve::FrozenCurve)
//! - **Instruments**: deposits, FRAs, futures, swaps, zero rate deposits
//!   and caps/floors, each pinning one node
//! - **Bootstrap**: the node-by-node state machine with closed-form first
//!   guesses and a Brent fallback
//! - **Spread curves**: curves stored as spreads over a frozen base curve
//!
//! ## Quick Start
//!
//! ```rust
//! use pillar_core::Date;
//! use pillar_curves::prelude::*;
//!
//! let spot = Date::from_ymd(2025, 1, 2).unwrap();
//! let curve = Bootstrapper::new(CurveDefinition::discount("USD", spot))
//!     .add_instrument(Deposit::from_tenor(spot, "3M", 0.0027).unwrap())
//!     .add_instrument(Deposit::from_tenor(spot, "6M", 0.0043).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let three_months = Date::from_ymd(2025, 4, 2).unwrap();
//! let df = curve.discount_factor(three_months).unwrap();
//! assert!(df < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_arguments)]

pub mod bootstrap;
pub mod curve;
pub mod error;
pub mod instruments;
pub mod objective;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::{
        build_independent, BootstrapConfig, BootstrapOutput, BootstrapReport, Bootstrapper,
        NodeReport, NodeResolution,
    };
    pub use crate::curve::{CurveDefinition, CurveUnderConstruction, FrozenCurve};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::instruments::{
        CapFloor, CapFloorKind, Deposit, Fra, InstrumentClass, PriceableInstrument, RateDeposit,
        RateFuture, Swap,
    };
    pub use crate::objective::QuoteObjective;
    pub use crate::traits::{DiscountFactors, ReadableCurve};
    pub use pillar_math::interpolation::InterpolationMethod;
}

pub use error::{CurveError, CurveResult};
