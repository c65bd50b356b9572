//! # Pillar Math
//!
//! Numerical building blocks for curve bootstrapping:
//!
//! - **Points**: [`Point`](point::Point) and [`DiscreteSpace`](point::DiscreteSpace)
//! - **Interpolation**: linear, log-linear, bilinear and trilinear strategies
//!   with flat extrapolation, plus base-plus-spread composition
//! - **Solvers**: Brent's method, bracketed or bracket-expanding
//!
//! ## Example
//!
//! ```rust
//! use pillar_math::prelude::*;
//!
//! let space = DiscreteSpace::new(
//!     vec![Point::xy(0.0, 1.0), Point::xy(1.0, 0.97), Point::xy(2.0, 0.93)],
//!     InterpolationMethod::LogLinear.min_points(),
//! )
//! .unwrap();
//! let curve = GridInterpolator::new(space, InterpolationMethod::LogLinear, true).unwrap();
//!
//! let df = curve.value(&[1.5]).unwrap();
//! assert!(df < 0.97 && df > 0.93);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

pub mod error;
pub mod interpolation;
pub mod point;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        GridInterpolator, InterpolationMethod, Interpolator, SpreadComposite,
    };
    pub use crate::point::{DiscreteSpace, Point};
    pub use crate::solvers::{Brent, ObjectiveFunction, SolverConfig, SolverResult};
}

pub use error::{MathError, MathResult};
