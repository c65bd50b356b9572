//! # Pillar Core
//!
//! Calendar primitives shared by the Pillar curve engine.
//!
//! - **Dates**: [`Date`](types::Date), a thin wrapper over `chrono::NaiveDate`
//! - **Tenors**: [`Tenor`](types::Tenor), market tenor strings such as `ON`, `3M`, `10Y`
//! - **Day counts**: conventions that turn a pair of dates into a year fraction
//!
//! ## Example
//!
//! ```rust
//! use pillar_core::prelude::*;
//!
//! let base = Date::from_ymd(2025, 1, 2).unwrap();
//! let maturity = "3M".parse::<Tenor>().unwrap().advance(base).unwrap();
//! let t = DayCountConvention::Act365Fixed.year_fraction_f64(base, maturity);
//! assert!(t > 0.24 && t < 0.25);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::doc_markdown)]

pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::{DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Date, Frequency, Tenor, TenorUnit};
}

pub use daycounts::{DayCount, DayCountConvention};
pub use error::{CoreError, CoreResult};
pub use types::{Date, Frequency, Tenor, TenorUnit};
