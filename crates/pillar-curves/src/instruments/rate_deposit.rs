//! Deposits priced off zero rate curves.

use pillar_core::{DayCount, DayCountConvention, Date, Tenor};

use super::{InstrumentClass, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::ReadableCurve;

/// A deposit whose curve stores continuously compounded zero rates.
///
/// Discount factors are `exp(−z(t) × t)`. On a spread curve `z` is the
/// base rate plus the spread being solved, so the same instrument
/// bootstraps both outright zero curves and spreads over a frozen base.
///
/// The first guess inverts the deposit formula for the total zero rate and
/// subtracts the base curve's contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct RateDeposit {
    id: String,
    start_date: Date,
    end_date: Date,
    rate: f64,
    day_count: DayCountConvention,
}

impl RateDeposit {
    /// Creates a deposit accruing ACT/360.
    #[must_use]
    pub fn new(start_date: Date, end_date: Date, rate: f64) -> Self {
        Self {
            id: format!("ZDEP {end_date}"),
            start_date,
            end_date,
            rate,
            day_count: DayCountConvention::Act360,
        }
    }

    /// Creates a deposit from a tenor string.
    pub fn from_tenor(spot_date: Date, tenor: &str, rate: f64) -> CurveResult<Self> {
        let tenor: Tenor = tenor.parse()?;
        let end_date = tenor.advance(spot_date)?;
        Ok(Self::new(spot_date, end_date, rate).with_id(format!("ZDEP-{tenor}")))
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the accrual day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_f64(self.start_date, self.end_date)
    }
}

/// Discount factor from a zero rate curve. Time zero is exactly one and
/// never touches the nodes.
fn discount(curve: &dyn ReadableCurve, date: Date) -> CurveResult<f64> {
    let t = curve.time(date);
    if t == 0.0 {
        return Ok(1.0);
    }
    Ok((-curve.value_at_time(t)? * t).exp())
}

impl PriceableInstrument for RateDeposit {
    fn id(&self) -> &str {
        &self.id
    }

    fn maturity(&self) -> Date {
        self.end_date
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn class(&self) -> InstrumentClass {
        InstrumentClass::Rate
    }

    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        let df_start = discount(curve, self.start_date)?;
        let df_end = discount(curve, self.end_date)?;
        Ok((df_start / df_end - 1.0) / self.year_fraction())
    }

    fn initial_guess(&self, curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        let t_end = curve.time(self.end_date);
        if t_end <= 0.0 {
            return Ok(None);
        }
        let df_end = discount(curve, self.start_date)? / (1.0 + self.rate * self.year_fraction());
        let total = -df_end.ln() / t_end;
        Ok(Some(total - curve.base_value_at_time(t_end)?))
    }
}
