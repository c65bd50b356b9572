//! Actual/365 variants.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::date::is_leap_year;
use crate::types::Date;

/// Actual/365 Fixed: actual days over 365, leap years ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Act365Fixed;

impl DayCount for Act365Fixed {
    fn name(&self) -> &'static str {
        "ACT/365F"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        Decimal::from(start.days_between(&end)) / Decimal::from(365)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}

/// Actual/365 Leap: basis is 366 when the period `(start, end]` contains
/// a February 29, otherwise 365.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Act365Leap;

impl Act365Leap {
    fn contains_feb_29(start: Date, end: Date) -> bool {
        if start >= end {
            return false;
        }
        (start.year()..=end.year())
            .filter(|&year| is_leap_year(year))
            .filter_map(|year| Date::from_ymd(year, 2, 29).ok())
            .any(|feb_29| feb_29 > start && feb_29 <= end)
    }
}

impl DayCount for Act365Leap {
    fn name(&self) -> &'static str {
        "ACT/365L"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        let basis = if Self::contains_feb_29(start, end) { 366 } else { 365 };
        Decimal::from(start.days_between(&end)) / Decimal::from(basis)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}
