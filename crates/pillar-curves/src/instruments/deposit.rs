//! Money market deposit.

use pillar_core::{DayCount, DayCountConvention, Date, Tenor};

use super::{simple_forward, PriceableInstrument};
use crate::error::CurveResult;
use crate::traits::ReadableCurve;

/// A money market deposit quoted as a simple rate.
///
/// Used for the short end of discount curves, overnight to 12 months.
/// The quote is reproduced when
///
/// ```text
/// DF(end) = DF(start) / (1 + rate × τ)
/// ```
///
/// which is also the closed-form first guess for the end node, so a
/// deposit starting on an existing node is solved without iterating.
///
/// ```rust
/// use pillar_core::Date;
/// use pillar_curves::instruments::{Deposit, PriceableInstrument};
///
/// let spot = Date::from_ymd(2025, 1, 2).unwrap();
/// let deposit = Deposit::from_tenor(spot, "3M", 0.0027).unwrap();
/// assert_eq!(deposit.id(), "DEP-3M");
/// assert_eq!(deposit.maturity(), Date::from_ymd(2025, 4, 2).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    id: String,
    start_date: Date,
    end_date: Date,
    rate: f64,
    day_count: DayCountConvention,
}

impl Deposit {
    /// Creates a deposit accruing ACT/360.
    #[must_use]
    pub fn new(start_date: Date, end_date: Date, rate: f64) -> Self {
        Self {
            id: format!("DEP {end_date}"),
            start_date,
            end_date,
            rate,
            day_count: DayCountConvention::Act360,
        }
    }

    /// Creates a deposit from a tenor string such as `ON`, `1W` or `3M`.
    pub fn from_tenor(spot_date: Date, tenor: &str, rate: f64) -> CurveResult<Self> {
        let tenor: Tenor = tenor.parse()?;
        let end_date = tenor.advance(spot_date)?;
        Ok(Self::new(spot_date, end_date, rate).with_id(format!("DEP-{tenor}")))
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

    /// Start date.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Deposit rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Accrual fraction of the deposit period.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.day_count.year_fraction_f64(self.start_date, self.end_date)
    }
}

impl PriceableInstrument for Deposit {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveDefinition, CurveUnderConstruction};
    use approx::assert_relative_eq;

    fn spot() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    #[test]
    fn test_from_tenor() {
        let dep = Deposit::from_tenor(spot(), "6M", 0.0043).unwrap();
        assert_eq!(dep.maturity(), Date::from_ymd(2025, 7, 2).unwrap());
        assert_eq!(dep.id(), "DEP-6M");
        assert_eq!(dep.quote(), 0.0043);

        let on = Deposit::from_tenor(spot(), "ON", 0.002).unwrap();
        assert_eq!(on.maturity(), Date::from_ymd(2025, 1, 3).unwrap());
        assert!(Deposit::from_tenor(spot(), "3Q", 0.01).is_err());
    }

    #[test]
    fn test_year_fraction_act360() {
        let dep = Deposit::new(spot(), spot().add_days(90), 0.05);
        assert_relative_eq!(dep.year_fraction(), 0.25);
    }

    #[test]
    fn test_guess_reprices_exactly() {
        let dep = Deposit::from_tenor(spot(), "3M", 0.0027).unwrap();
        let mut curve =
            CurveUnderConstruction::new(CurveDefinition::discount("USD", spot())).unwrap();

        let guess = dep.initial_guess(&curve).unwrap().unwrap();
        assert_relative_eq!(guess, 1.0 / (1.0 + 0.0027 * dep.year_fraction()));

        curve.append_or_replace_last_node(dep.maturity(), guess).unwrap();
        assert_relative_eq!(dep.implied_quote(&curve).unwrap(), 0.0027, epsilon = 1e-14);
    }
}
