//! Forward rate agreement.

use pillar_core::{DayCount, DayCountConvention, Date, Tenor, TenorUnit};

use super::{simple_forward, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::ReadableCurve;

/// A forward rate agreement quoted as the simple forward rate between two
/// future dates.
///
/// The start discount factor is read off the curve (interpolated or
/// extrapolated); the end discount factor is the node being solved:
///
/// ```text
/// DF(end) = DF(start) / (1 + F × τ)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Fra {
    id: String,
    start_date: Date,
    end_date: Date,
    rate: f64,
    day_count: DayCountConvention,
}

impl Fra {
    /// Creates a FRA accruing ACT/360.
    #[must_use]
    pub fn new(start_date: Date, end_date: Date, rate: f64) -> Self {
        Self {
            id: format!("FRA {start_date}x{end_date}"),
            start_date,
            end_date,
            rate,
            day_count: DayCountConvention::Act360,
        }
    }

    /// Creates a FRA in `AxB` month notation, e.g. `3x6` is a 3M rate
    /// starting in 3M.
    pub fn from_months(
        spot_date: Date,
        start_months: u32,
        end_months: u32,
        rate: f64,
    ) -> CurveResult<Self> {
        let start = Tenor::new(start_months, TenorUnit::Months).advance(spot_date)?;
        let end = Tenor::new(end_months, TenorUnit::Months).advance(spot_date)?;
        Ok(Self::new(start, end, rate).with_id(format!("FRA-{start_months}x{end_months}")))
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

    /// Accrual start.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Accrual fraction.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_f64(self.start_date, self.end_date)
    }
}

impl PriceableInstrument for Fra {
    fn id(&self) -> &str {
        &self.id
    }

    fn maturity(&self) -> Date {
        self.end_date
    }

    fn quote(&self) -> f64 {
        self.rate
    }

    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        simple_forward(curve, self.start_date, self.end_date, self.year_fraction())
    }

    fn initial_guess(&self, curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        let df_start = curve.value(self.start_date)?;
        Ok(Some(df_start / (1.0 + self.rate * self.year_fraction())))
    }
}
