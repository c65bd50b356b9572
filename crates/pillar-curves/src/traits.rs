//! Read access to curves.
//!
//! Instruments price against [`ReadableCurve`], which both the curve under
//! construction and frozen curves implement. Node values carry no unit at
//! this level: a discount curve stores discount factors, a volatility curve
//! stores volatilities, a spread curve stores spreads.

use pillar_core::{DayCount, DayCountConvention, Date};
use pillar_math::MathError;

use crate::error::CurveResult;

/// A curve that can be evaluated at dates or times.
///
/// Time is the year fraction from [`base_date`](ReadableCurve::base_date)
/// under the curve's own day count.
pub trait ReadableCurve: Send + Sync {
    /// The curve's name.
    fn name(&self) -> &str;

    /// Date at which time is zero.
    fn base_date(&self) -> Date;

    /// Convention measuring time from the base date.
    fn day_count(&self) -> DayCountConvention;

    /// Value at time `t` in years.
    fn value_at_time(&self, t: f64) -> CurveResult<f64>;

    /// Part of [`value_at_time`](ReadableCurve::value_at_time) contributed
    /// by an underlying base curve. Zero for outright curves.
    fn base_value_at_time(&self, _t: f64) -> CurveResult<f64> {
        Ok(0.0)
    }

    /// Year fraction from the base date to `date`.
    fn time(&self, date: Date) -> f64 {
        self.day_count().year_fraction_f64(self.base_date(), date)
    }

    /// Value at `date`.
    fn value(&self, date: Date) -> CurveResult<f64> {
        self.value_at_time(self.time(date))
    }

    /// Base curve contribution at `date`.
    fn base_value(&self, date: Date) -> CurveResult<f64> {
        self.base_value_at_time(self.time(date))
    }
}

/// Rate views over a curve whose values are discount factors.
///
/// Implemented for every [`ReadableCurve`]; calling these on a curve that
/// stores anything else gives meaningless numbers.
pub trait DiscountFactors: ReadableCurve {
    /// Discount factor at `date`.
    fn discount_factor(&self, date: Date) -> CurveResult<f64> {
        self.value(date)
    }

    /// Continuously compounded zero rate to `date`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `date` is not after the base date.
    fn zero_rate(&self, date: Date) -> CurveResult<f64> {
        let t = self.time(date);
        if t <= 0.0 {
            return Err(MathError::invalid_input(format!(
                "zero rate needs a date after the base date, got {date}"
            ))
            .into());
        }
        Ok(-self.value_at_time(t)?.ln() / t)
    }

    /// Simply compounded forward rate between two dates, accrued with
    /// `day_count`.
    fn forward_rate(
        &self,
        start: Date,
        end: Date,
        day_count: DayCountConvention,
    ) -> CurveResult<f64> {
        let tau = day_count.year_fraction_f64(start, end);
        if tau <= 0.0 {
            return Err(MathError::invalid_input(format!(
                "forward period {start} to {end} is empty"
            ))
            .into());
        }
        let df_start = self.discount_factor(start)?;
        let df_end = self.discount_factor(end)?;
        Ok((df_start / df_end - 1.0) / tau)
    }
}

impl<C: ReadableCurve + ?Sized> DiscountFactors for C {}
