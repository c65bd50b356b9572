//! Par interest rate swaps.

use pillar_core::{DayCount, DayCountConvention, Date, Frequency, Tenor};

use super::PriceableInstrument;
use crate::error::{CurveError, CurveResult};
use crate::traits::ReadableCurve;

/// A fixed-for-floating swap quoted as its par rate, valued off a single
/// curve.
///
/// With the floating leg worth `DF(effective) − DF(termination)`:
///
/// ```text
/// par = (DF(effective) − DF(termination)) / Σ τᵢ × DF(tᵢ)
/// ```
///
/// Fixed payment dates are generated backward from termination, so any
/// short stub sits at the front.
#[derive(Debug, Clone, PartialEq)]
pub struct Swap {
    id: String,
    effective_date: Date,
    termination_date: Date,
    fixed_rate: f64,
    fixed_frequency: Frequency,
    fixed_day_count: DayCountConvention,
}

impl Swap {
    /// Creates a swap with a 30/360 fixed leg.
    #[must_use]
    pub fn new(
        effective_date: Date,
        termination_date: Date,
        fixed_rate: f64,
        fixed_frequency: Frequency,
    ) -> Self {
        Self {
            id: format!("SWP {termination_date}"),
            effective_date,
            termination_date,
            fixed_rate,
            fixed_frequency,
            fixed_day_count: DayCountConvention::Thirty360US,
        }
    }

    /// Creates a spot-starting swap from a tenor string such as `5Y`.
    pub fn from_tenor(
        spot_date: Date,
        tenor: &str,
        fixed_rate: f64,
        fixed_frequency: Frequency,
    ) -> CurveResult<Self> {
        let tenor: Tenor = tenor.parse()?;
        let termination = tenor.advance(spot_date)?;
        Ok(Self::new(spot_date, termination, fixed_rate, fixed_frequency)
            .with_id(format!("SWP-{tenor}")))
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the fixed leg day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.fixed_day_count = day_count;
        self
    }

    /// Fixed rate.
    #[must_use]
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// Fixed leg payment dates, ending at termination.
    pub fn schedule(&self) -> CurveResult<Vec<Date>> {
        let step = self.fixed_frequency.months_per_period() as i32;
        let mut dates = vec![self.termination_date];
        for k in 1.. {
            let date = self.termination_date.add_months(-step * k)?;
            if date <= self.effective_date {
                break;
            }
            dates.push(date);
        }
        dates.reverse();
        Ok(dates)
    }

    /// Accrual fractions paired with payment dates.
    fn accruals(&self) -> CurveResult<Vec<(Date, f64)>> {
        let schedule = self.schedule()?;
        let mut start = self.effective_date;
        Ok(schedule
            .into_iter()
            .map(|end| {
                let tau = self.fixed_day_count.year_fraction_f64(start, end);
                start = end;
                (end, tau)
            })
            .collect())
    }

    /// Present value of one unit of fixed rate.
    pub fn annuity(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        self.accruals()?
            .into_iter()
            .map(|(date, tau)| -> CurveResult<f64> { Ok(tau * curve.value(date)?) })
            .sum()
    }
}

impl PriceableInstrument for Swap {
    fn id(&self) -> &str {
        &self.id
    }

    fn maturity(&self) -> Date {
        self.termination_date
    }

    fn quote(&self) -> f64 {
        self.fixed_rate
    }

    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        let annuity = self.annuity(curve)?;
        if annuity <= 0.0 {
            return Err(CurveError::pricing(
                &self.id,
                format!("non-positive annuity {annuity}"),
            ));
        }
        let floating = curve.value(self.effective_date)? - curve.value(self.termination_date)?;
        Ok(floating / annuity)
    }

    fn initial_guess(&self, curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        // Intermediate payment dates past the last node read extrapolated
        // values, so the guess is exact only when they are already pinned.
        let accruals = self.accruals()?;
        let Some(((_, tau_last), earlier)) = accruals.split_last() else {
            return Ok(None);
        };
        let mut partial = 0.0;
        for (date, tau) in earlier {
            partial += tau * curve.value(*date)?;
        }
        let df_effective = curve.value(self.effective_date)?;
        let guess = (df_effective - self.fixed_rate * partial) / (1.0 + self.fixed_rate * tau_last);
        Ok((guess.is_finite() && guess > 0.0).then_some(guess))
    }
}
