//! Caps and floors quoted in flat Black volatility.

use std::fmt;
use std::sync::Arc;

use pillar_core::{DayCount, DayCountConvention, Date, Frequency};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::{InstrumentClass, PriceableInstrument};
use crate::curve::FrozenCurve;
use crate::error::{CurveError, CurveResult};
use crate::traits::{DiscountFactors, ReadableCurve};

/// Whether the strip pays on rates above or below the strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapFloorKind {
    /// Calls on the forward rate.
    Cap,
    /// Puts on the forward rate.
    Floor,
}

impl fmt::Display for CapFloorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapFloorKind::Cap => write!(f, "CAP"),
            CapFloorKind::Floor => write!(f, "FLR"),
        }
    }
}

/// One optionlet of the strip, with everything the discount curve fixes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Optionlet {
    fixing: Date,
    expiry: f64,
    accrual: f64,
    forward: f64,
    df_payment: f64,
}

/// A cap or floor used to strip optionlet volatilities.
///
/// Forwards and discount factors come from a frozen discount curve; the
/// curve being bootstrapped holds optionlet volatilities by fixing date.
/// The quote is the premium implied by the flat volatility, so a strip
/// priced with every optionlet at the flat volatility reproduces it:
///
/// ```text
/// premium = Σ τᵢ × DF(payᵢ) × Black(Fᵢ, K, σ(fixingᵢ), Tᵢ)
/// ```
///
/// The first optionlet fixes at the start date and is left out, as its
/// rate is already known.
#[derive(Debug, Clone)]
pub struct CapFloor {
    id: String,
    kind: CapFloorKind,
    maturity: Date,
    strike: f64,
    flat_vol: f64,
    optionlets: Vec<Optionlet>,
    premium: f64,
}

impl CapFloor {
    /// Creates a quarterly ACT/360 cap.
    pub fn cap(
        discount: &Arc<FrozenCurve>,
        start_date: Date,
        maturity: Date,
        strike: f64,
        flat_vol: f64,
    ) -> CurveResult<Self> {
        Self::new(
            CapFloorKind::Cap,
            discount,
            start_date,
            maturity,
            strike,
            flat_vol,
            Frequency::Quarterly,
        )
    }

    /// Creates a quarterly ACT/360 floor.
    pub fn floor(
        discount: &Arc<FrozenCurve>,
        start_date: Date,
        maturity: Date,
        strike: f64,
        flat_vol: f64,
    ) -> CurveResult<Self> {
        Self::new(
            CapFloorKind::Floor,
            discount,
            start_date,
            maturity,
            strike,
            flat_vol,
            Frequency::Quarterly,
        )
    }

    /// Creates a strip resetting at `frequency`.
    ///
    /// # Errors
    ///
    /// `Pricing` if no optionlet fixes after the discount curve's base
    /// date, or if a forward or the strike is not positive.
    pub fn new(
        kind: CapFloorKind,
        discount: &Arc<FrozenCurve>,
        start_date: Date,
        maturity: Date,
        strike: f64,
        flat_vol: f64,
        frequency: Frequency,
    ) -> CurveResult<Self> {
        let id = format!("{kind} {maturity} K={strike}");
        let optionlets = optionlets(discount.as_ref(), start_date, maturity, frequency)?;
        if optionlets.is_empty() {
            return Err(CurveError::pricing(id, "no optionlet fixes after the base date"));
        }

        let mut strip = Self {
            id,
            kind,
            maturity,
            strike,
            flat_vol,
            optionlets,
            premium: 0.0,
        };
        strip.premium = strip.price(|_| Ok(flat_vol))?;
        Ok(strip)
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Cap or floor.
    #[must_use]
    pub fn kind(&self) -> CapFloorKind {
        self.kind
    }

    /// Quoted flat volatility.
    #[must_use]
    pub fn flat_vol(&self) -> f64 {
        self.flat_vol
    }

    /// Fixing dates of the priced optionlets.
    #[must_use]
    pub fn fixing_dates(&self) -> Vec<Date> {
        self.optionlets.iter().map(|o| o.fixing).collect()
    }

    fn price(&self, mut vol_at: impl FnMut(Date) -> CurveResult<f64>) -> CurveResult<f64> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| CurveError::pricing(&self.id, e.to_string()))?;
        let mut premium = 0.0;
        for o in &self.optionlets {
            let vol = vol_at(o.fixing)?;
            let value = black(self.kind, o.forward, self.strike, vol, o.expiry, &normal)
                .ok_or_else(|| {
                    CurveError::pricing(
                        &self.id,
                        format!("Black undefined for forward {} strike {}", o.forward, self.strike),
                    )
                })?;
            premium += o.accrual * o.df_payment * value;
        }
        Ok(premium)
    }
}

fn optionlets(
    discount: &FrozenCurve,
    start_date: Date,
    maturity: Date,
    frequency: Frequency,
) -> CurveResult<Vec<Optionlet>> {
    let step = frequency.months_per_period() as i32;
    let mut ends = vec![maturity];
    for k in 1.. {
        let date = maturity.add_months(-step * k)?;
        if date <= start_date {
            break;
        }
        ends.push(date);
    }
    ends.reverse();

    let day_count = DayCountConvention::Act360;
    let mut fixing = start_date;
    let mut strip = Vec::with_capacity(ends.len());
    for end in ends {
        let expiry = discount.time(fixing);
        if expiry > 0.0 {
            let accrual = day_count.year_fraction_f64(fixing, end);
            strip.push(Optionlet {
                fixing,
                expiry,
                accrual,
                forward: discount.forward_rate(fixing, end, day_count)?,
                df_payment: discount.discount_factor(end)?,
            });
        }
        fixing = end;
    }
    Ok(strip)
}

/// Undiscounted Black price of one optionlet; `None` when the lognormal
/// model is undefined.
fn black(
    kind: CapFloorKind,
    forward: f64,
    strike: f64,
    vol: f64,
    expiry: f64,
    normal: &Normal,
) -> Option<f64> {
    if forward <= 0.0 || strike <= 0.0 {
        return None;
    }
    let sd = vol * expiry.sqrt();
    if sd <= 0.0 {
        return Some(match kind {
            CapFloorKind::Cap => (forward - strike).max(0.0),
            CapFloorKind::Floor => (strike - forward).max(0.0),
        });
    }
    let d1 = ((forward / strike).ln() + 0.5 * sd * sd) / sd;
    let d2 = d1 - sd;
    Some(match kind {
        CapFloorKind::Cap => forward * normal.cdf(d1) - strike * normal.cdf(d2),
        CapFloorKind::Floor => strike * normal.cdf(-d2) - forward * normal.cdf(-d1),
    })
}

impl PriceableInstrument for CapFloor {
    fn id(&self) -> &str {
        &self.id
    }

    fn maturity(&self) -> Date {
        self.maturity
    }

    fn quote(&self) -> f64 {
        self.premium
    }

    fn class(&self) -> InstrumentClass {
        InstrumentClass::Volatility
    }

    fn implied_quote(&self, curve: &dyn ReadableCurve) -> CurveResult<f64> {
        self.price(|fixing| curve.value(fixing))
    }

    fn initial_guess(&self, _curve: &dyn ReadableCurve) -> CurveResult<Option<f64>> {
        Ok(Some(self.flat_vol))
    }
}
