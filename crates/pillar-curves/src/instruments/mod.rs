//! Market instruments used to bootstrap curves.
//!
//! Each instrument pins one curve node at its maturity. The bootstrapper
//! adjusts that node until [`PriceableInstrument::implied_quote`] matches
//! [`PriceableInstrument::quote`].
//!
//! # Instrument Types
//!
//! - [`Deposit`]: money market deposit, discount factor node
//! - [`Fra`]: forward rate agreement, discount factor node
//! - [`RateFuture`]: interest rate future quoted as a price
//! - [`Swap`]: fixed-for-floating par swap, single curve
//! - [`RateDeposit`]: deposit priced off a zero rate curve, or a zero
//!   spread over a base curve
//! - [`CapFloor`]: cap or floor quoted in flat Black volatility, volatility
//!   node over a frozen discount curve

mod cap_floor;
mod deposit;
mod fra;
mod future;
mod rate_deposit;
mod swap;

pub use cap_floor::{CapFloor, CapFloorKind};
pub use deposit::Deposit;
pub use fra::Fra;
pub use future::RateFuture;
pub use rate_deposit::RateDeposit;
pub use swap::Swap;

use std::fmt;

use pillar_core::Date;
use serde::{Deserialize, Serialize};

use crate::error::CurveResult;
use crate::traits::ReadableCurve;

/// What kind of value the node solved for an instrument holds.
///
/// The class fixes the default first guess and the solver bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    /// Discount factors.
    DiscountFactor,
    /// Continuously compounded zero rates or spreads over a base curve.
    Rate,
    /// Black volatilities.
    Volatility,
}

impl InstrumentClass {
    /// First guess when the instrument has no closed form of its own.
    #[must_use]
    pub fn default_guess(&self) -> f64 {
        match self {
            InstrumentClass::DiscountFactor => 0.9,
            InstrumentClass::Rate => 0.0,
            InstrumentClass::Volatility => 0.2,
        }
    }

    /// Solver bracket `(lower, upper)` for the node value.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            InstrumentClass::DiscountFactor => (1e-9, 2.0),
            InstrumentClass::Rate => (-1.0, 1.0),
            InstrumentClass::Volatility => (1e-5, 2.0),
        }
    }
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentClass::DiscountFactor => "discount factor",
            InstrumentClass::Rate => "rate",
            InstrumentClass::Volatility => "volatility",
        };
        write!(f, "{name}")
    }
}

/// An instrument that pins one curve node.
///
/// Implementations must be thread-safe (`Send + Sync`) so that independent
/// curves can be bootstrapped in parallel.
pub trait PriceableInstrument: Send + Sync + fmt::Debug {
    /// Identifier used in logs, reports and errors.
    fn id(&self) -> &str;

    /// Date of the node this instrument determines.
    fn maturity(&self) -> Date;

    /// Market quote the curve must reproduce.
    fn quote(&self) -> f64;

    /// Quote implied by `curve`, in the same units as [`quote`].
    ///
    /// [`quote`]: PriceableInstrument::quote
    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64>;

    /// Kind of value solved at the maturity node.
    fn class(&self) -> InstrumentClass {
        InstrumentClass::DiscountFactor
    }

    /// Closed-form node value given the nodes already on `curve`.
    ///
    /// Called before the maturity node exists, so reads past the last node
    /// are extrapolated. `None` falls back to the class default.
    fn initial_guess(&self, _curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        Ok(None)
    }
}

impl<T: PriceableInstrument + ?Sized> PriceableInstrument for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn maturity(&self) -> Date {
        (**self).maturity()
    }

    fn quote(&self) -> f64 {
        (**self).quote()
    }

    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        (**self).implied_quote(curve)
    }

    fn class(&self) -> InstrumentClass {
        (**self).class()
    }

    fn initial_guess(&self, curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        (**self).initial_guess(curve)
    }
}

/// Simple-interest forward rate over `[start, end]` with accrual `tau`.
pub(crate) fn simple_forward(
    curve: &dyn ReadableCurve,
    start: Date,
    end: Date,
    tau: f64,
) -> CurveResult<f64> {
    let df_start = curve.value(start)?;
    let df_end = curve.value(end)?;
    Ok((df_start / df_end - 1.0) / tau)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_guess_inside_bounds() {
        for class in [
            InstrumentClass::DiscountFactor,
            InstrumentClass::Rate,
            InstrumentClass::Volatility,
        ] {
            let (lo, hi) = class.bounds();
            let guess = class.default_guess();
            assert!(lo <= guess && guess <= hi, "{class}");
        }
    }

    #[test]
    fn test_class_serde() {
        let json = serde_json::to_string(&InstrumentClass::DiscountFactor).unwrap();
        assert_eq!(json, "\"discount_factor\"");
    }
}
