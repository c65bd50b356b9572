//! Day count conventions.
//!
//! A day count turns a pair of dates into a year fraction. Curves are
//! parameterised by time measured this way from their base date, so the
//! convention is injected once when a curve is constructed.
//!
//! # Supported Conventions
//!
//! - [`Act360`]: Actual/360, money market deposits and FRAs
//! - [`Act365Fixed`]: Actual/365 Fixed, the default curve time axis
//! - [`Act365Leap`]: Actual/365 with a 366 basis over Feb 29
//! - [`Thirty360US`]: 30/360 bond basis with February month-end rules
//! - [`Thirty360E`]: 30E/360 Eurobond basis

mod act360;
mod act365;
mod thirty360;

pub use act360::Act360;
pub use act365::{Act365Fixed, Act365Leap};
pub use thirty360::{Thirty360E, Thirty360US};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`) because frozen
/// curves holding them are shared across bootstrap threads.
pub trait DayCount: Send + Sync {
    /// Market name of the convention (e.g. "ACT/360").
    fn name(&self) -> &'static str;

    /// Year fraction between two dates. Negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Day count between two dates under the convention's day rules.
    fn day_count(&self, start: Date, end: Date) -> i64;

    /// Year fraction as `f64`, for use on the curve time axis.
    fn year_fraction_f64(&self, start: Date, end: Date) -> f64 {
        self.year_fraction(start, end).to_f64().unwrap_or(f64::NAN)
    }
}

/// Runtime selectable day count convention.
///
/// Serializes as its market name, and parses the common aliases
/// ("ACT/365", "BOND", "30E/360", ...).
///
/// ```rust
/// use pillar_core::daycounts::{DayCount, DayCountConvention};
/// use pillar_core::types::Date;
///
/// let dc: DayCountConvention = "ACT/360".parse().unwrap();
/// let start = Date::from_ymd(2025, 1, 1).unwrap();
/// let end = Date::from_ymd(2025, 4, 1).unwrap();
/// assert_eq!(dc.year_fraction_f64(start, end), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayCountConvention {
    /// Actual/360.
    Act360,
    /// Actual/365 Fixed.
    #[default]
    Act365Fixed,
    /// Actual/365 Leap.
    Act365Leap,
    /// 30/360 US.
    Thirty360US,
    /// 30E/360.
    Thirty360E,
}

impl DayCountConvention {
    /// Creates a boxed day count implementation.
    #[must_use]
    pub fn to_day_count(&self) -> Box<dyn DayCount> {
        match self {
            DayCountConvention::Act360 => Box::new(Act360),
            DayCountConvention::Act365Fixed => Box::new(Act365Fixed),
            DayCountConvention::Act365Leap => Box::new(Act365Leap),
            DayCountConvention::Thirty360US => Box::new(Thirty360US),
            DayCountConvention::Thirty360E => Box::new(Thirty360E),
        }
    }

    /// Returns all available conventions.
    #[must_use]
    pub fn all() -> &'static [DayCountConvention] {
        &[
            DayCountConvention::Act360,
            DayCountConvention::Act365Fixed,
            DayCountConvention::Act365Leap,
            DayCountConvention::Thirty360US,
            DayCountConvention::Thirty360E,
        ]
    }
}

impl DayCount for DayCountConvention {
    fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => Act360.name(),
            DayCountConvention::Act365Fixed => Act365Fixed.name(),
            DayCountConvention::Act365Leap => Act365Leap.name(),
            DayCountConvention::Thirty360US => Thirty360US.name(),
            DayCountConvention::Thirty360E => Thirty360E.name(),
        }
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        match self {
            DayCountConvention::Act360 => Act360.year_fraction(start, end),
            DayCountConvention::Act365Fixed => Act365Fixed.year_fraction(start, end),
            DayCountConvention::Act365Leap => Act365Leap.year_fraction(start, end),
            DayCountConvention::Thirty360US => Thirty360US.year_fraction(start, end),
            DayCountConvention::Thirty360E => Thirty360E.year_fraction(start, end),
        }
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        match self {
            DayCountConvention::Act360
            | DayCountConvention::Act365Fixed
            | DayCountConvention::Act365Leap => start.days_between(&end),
            DayCountConvention::Thirty360US => Thirty360US.day_count(start, end),
            DayCountConvention::Thirty360E => Thirty360E.day_count(start, end),
        }
    }
}

impl std::fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DayCountConvention {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "ACT/360" | "ACTUAL/360" | "ACT360" => Ok(DayCountConvention::Act360),
            "ACT/365" | "ACT/365F" | "ACT/365 FIXED" | "ACTUAL/365" | "ACT365FIXED" | "ACT365" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "ACT/365L" | "ACT/365 LEAP" | "ACT365LEAP" => Ok(DayCountConvention::Act365Leap),
            "30/360" | "30/360 US" | "30U/360" | "BOND" | "THIRTY360US" => {
                Ok(DayCountConvention::Thirty360US)
            }
            "30E/360" | "EUROBOND" | "THIRTY360E" => Ok(DayCountConvention::Thirty360E),
            _ => Err(CoreError::unknown_day_count(s)),
        }
    }
}

impl TryFrom<String> for DayCountConvention {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayCountConvention> for String {
    fn from(dc: DayCountConvention) -> Self {
        dc.name().to_string()
    }
}
