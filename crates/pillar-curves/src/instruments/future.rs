//! Interest rate futures.

use pillar_core::{DayCount, DayCountConvention, Date};

use super::{simple_forward, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::ReadableCurve;

/// A short-term interest rate future quoted as a price, `100 − rate`.
///
/// The futures rate is the forward rate over the reference period plus a
/// convexity adjustment:
///
/// ```text
/// price = 100 × (1 − (F + convexity))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RateFuture {
    id: String,
    accrual_start: Date,
    accrual_end: Date,
    price: f64,
    convexity_adjustment: f64,
    day_count: DayCountConvention,
}

impl RateFuture {
    /// Creates a future over `[accrual_start, accrual_end]` at `price`.
    #[must_use]
    pub fn new(accrual_start: Date, accrual_end: Date, price: f64) -> Self {
        Self {
            id: format!("FUT {accrual_start}"),
            accrual_start,
            accrual_end,
            price,
            convexity_adjustment: 0.0,
            day_count: DayCountConvention::Act360,
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the convexity adjustment, in rate units.
    #[must_use]
    pub fn with_convexity_adjustment(mut self, adjustment: f64) -> Self {
        self.convexity_adjustment = adjustment;
        self
    }

    /// Sets the accrual day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Rate implied by the quoted price.
    #[must_use]
    pub fn futures_rate(&self) -> f64 {
        (100.0 - self.price) / 100.0
    }

    /// Futures rate less the convexity adjustment.
    #[must_use]
    pub fn forward_rate(&self) -> f64 {
        self.futures_rate() - self.convexity_adjustment
    }

    fn year_fraction(&self) -> f64 {
        self.day_count
            .year_fraction_f64(self.accrual_start, self.accrual_end)
    }
}

impl PriceableInstrument for RateFuture {
    fn id(&self) -> &str {
        &self.id
    }

    fn maturity(&self) -> Date {
        self.accrual_end
    }

    fn quote(&self) -> f64 {
        self.price
    }

    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        let forward = simple_forward(
            curve,
            self.accrual_start,
            self.accrual_end,
            self.year_fraction(),
        )?;
        Ok(100.0 * (1.0 - (forward + self.convexity_adjustment)))
    }

    fn initial_guess(&self, curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        let df_start = curve.value(self.accrual_start)?;
        Ok(Some(df_start / (1.0 + self.forward_rate() * self.year_fraction())))
    }
}
