//! Market tenors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Date;
use crate::error::{CoreError, CoreResult};

/// Unit of a numeric tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Calendar days.
    Days,
    /// Weeks of seven days.
    Weeks,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

/// A market tenor such as `ON`, `1W`, `3M`, or `10Y`.
///
/// Overnight style tenors (`ON`, `TN`, `SN`) are expressed as day counts
/// of one, two and three days. No business-day adjustment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    count: u32,
    unit: TenorUnit,
    #[serde(skip)]
    label: Option<&'static str>,
}

impl Tenor {
    /// Creates a numeric tenor.
    #[must_use]
    pub const fn new(count: u32, unit: TenorUnit) -> Self {
        Self {
            count,
            unit,
            label: None,
        }
    }

    /// Number of units.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Tenor unit.
    #[must_use]
    pub const fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Returns the date reached by moving `self` forward from `start`.
    ///
    /// Fails when the count does not fit the date arithmetic or the
    /// resulting date is out of range.
    pub fn advance(&self, start: Date) -> CoreResult<Date> {
        let n = i32::try_from(self.count)
            .map_err(|_| CoreError::invalid_tenor(self.to_string(), "count is too large"))?;
        match self.unit {
            TenorUnit::Days => start.checked_add_days(i64::from(n)),
            TenorUnit::Weeks => start.checked_add_days(i64::from(n) * 7),
            TenorUnit::Months => start.add_months(n),
            TenorUnit::Years => start.add_years(n),
        }
    }

    const fn labelled(count: u32, label: &'static str) -> Self {
        Self {
            count,
            unit: TenorUnit::Days,
            label: Some(label),
        }
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_uppercase();

        match text.as_str() {
            "ON" | "O/N" => return Ok(Self::labelled(1, "ON")),
            "TN" | "T/N" => return Ok(Self::labelled(2, "TN")),
            "SN" | "S/N" => return Ok(Self::labelled(3, "SN")),
            _ => {}
        }

        let Some(last) = text.chars().last() else {
            return Err(CoreError::invalid_tenor(s, "empty tenor"));
        };
        let unit = match last {
            'D' => TenorUnit::Days,
            'W' => TenorUnit::Weeks,
            'M' => TenorUnit::Months,
            'Y' => TenorUnit::Years,
            _ => return Err(CoreError::invalid_tenor(s, "unit must be one of D, W, M, Y")),
        };

        let count: u32 = text[..text.len() - 1]
            .parse()
            .map_err(|_| CoreError::invalid_tenor(s, "count is not a non-negative integer"))?;

        Ok(Self::new(count, unit))
    }
}

impl TryFrom<String> for Tenor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label {
            return f.write_str(label);
        }
        let unit = match self.unit {
            TenorUnit::Days => 'D',
            TenorUnit::Weeks => 'W',
            TenorUnit::Months => 'M',
            TenorUnit::Years => 'Y',
        };
        write!(f, "{}{}", self.count, unit)
    }
}
