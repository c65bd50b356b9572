//! Interpolation strategies over discrete point spaces.
//!
//! # Available Methods
//!
//! | Method | Axes | Bounds | Notes |
//! |--------|------|--------|-------|
//! | [`InterpolationMethod::Linear`] | 1 | 2 | |
//! | [`InterpolationMethod::LogLinear`] | 1 | 2 | values must be positive |
//! | [`InterpolationMethod::LinearRate`] | 1 | 2 | discount factors, linear in `-ln(y)/x` |
//! | [`InterpolationMethod::Bilinear`] | 2 | 4 | degrades to linear |
//! | [`InterpolationMethod::Trilinear`] | 3 | 8 | degrades to bilinear, then linear |
//!
//! A strategy evaluates a query against the minimal bracketing set of
//! points. Bilinear bounds are ordered `[x0y0, x1y0, x0y1, x1y1]`,
//! trilinear bounds are two such squares, the `z0` one first. When a
//! query sits on a node along some axis (or is clamped there by flat
//! extrapolation) that axis contributes a single coordinate and the
//! bounding set halves; the strategy then runs at the next lower degree.
//!
//! [`GridInterpolator`] finds the bracketing set for a query and applies
//! the strategy. [`SpreadComposite`] adds two interpolators together.

mod grid;
mod spread;

pub use grid::GridInterpolator;
pub use spread::SpreadComposite;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{MathError, MathResult};
use crate::point::Point;

/// Something that can be evaluated at an independent coordinate tuple.
pub trait Interpolator: Send + Sync {
    /// Interpolated value at `coordinates` (independent axes only).
    fn value(&self, coordinates: &[f64]) -> MathResult<f64>;

    /// Number of independent axes expected by [`Interpolator::value`].
    fn dimension(&self) -> usize;
}

impl<T: Interpolator + ?Sized> Interpolator for Arc<T> {
    fn value(&self, coordinates: &[f64]) -> MathResult<f64> {
        (**self).value(coordinates)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

impl<T: Interpolator + ?Sized> Interpolator for &T {
    fn value(&self, coordinates: &[f64]) -> MathResult<f64> {
        (**self).value(coordinates)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }
}

/// Grid interpolation strategy, resolved once from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterpolationMethod {
    /// Linear in the value.
    #[default]
    Linear,
    /// Linear in the natural log of the value.
    LogLinear,
    /// Discount factors interpolated through their continuously
    /// compounded rate `-ln(y)/x`, linear in the rate.
    LinearRate,
    /// Linear along x then along y.
    Bilinear,
    /// Bilinear at z0 and z1 then linear along z.
    Trilinear,
}

impl InterpolationMethod {
    /// Configuration name of the method.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::Linear => "LinearInterpolation",
            InterpolationMethod::LogLinear => "LogLinearInterpolation",
            InterpolationMethod::LinearRate => "LinearRateInterpolation",
            InterpolationMethod::Bilinear => "BilinearInterpolation",
            InterpolationMethod::Trilinear => "TrilinearInterpolation",
        }
    }

    /// Number of independent axes the method works over.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            InterpolationMethod::Linear
            | InterpolationMethod::LogLinear
            | InterpolationMethod::LinearRate => 1,
            InterpolationMethod::Bilinear => 2,
            InterpolationMethod::Trilinear => 3,
        }
    }

    /// Minimum points a space needs for a full-degree evaluation.
    #[must_use]
    pub fn min_points(&self) -> usize {
        1 << self.dimension()
    }

    /// Evaluates the strategy at `query` over a bracketing set.
    ///
    /// `bounds` must hold 1, 2, 4 or 8 points (at most [`min_points`]),
    /// ordered with the first axis varying fastest.
    ///
    /// # Errors
    ///
    /// - `DegenerateBounds` if two points to be blended share the coordinate
    /// - `InvalidDomain` for log-linear or linear-rate over a non-positive value
    /// - `InvalidInput` if the bound count is not a supported power of two
    ///
    /// [`min_points`]: InterpolationMethod::min_points
    pub fn value(&self, query: &[f64], bounds: &[Point]) -> MathResult<f64> {
        let n = bounds.len();
        if n == 0 || !n.is_power_of_two() || n > self.min_points() {
            return Err(MathError::invalid_input(format!(
                "{} cannot blend {n} bounding points",
                self.name()
            )));
        }
        self.blend(query, bounds)
    }

    fn blend(&self, query: &[f64], bounds: &[Point]) -> MathResult<f64> {
        if bounds.len() == 1 {
            return Ok(bounds[0].value());
        }

        let half = bounds.len() / 2;
        let lo = &bounds[0];
        let hi = &bounds[half];
        let axis = varying_axis(lo, hi)?;
        let x = query.get(axis).copied().ok_or(MathError::DimensionMismatch {
            expected: lo.dimension(),
            actual: query.len(),
        })?;

        let y0 = self.blend(query, &bounds[..half])?;
        let y1 = self.blend(query, &bounds[half..])?;
        let (x0, x1) = (lo.independent()[axis], hi.independent()[axis]);

        match self {
            InterpolationMethod::LogLinear => log_linear(x, x0, x1, y0, y1),
            InterpolationMethod::LinearRate => linear_rate(x, x0, x1, y0, y1),
            _ => Ok(linear(x, x0, x1, y0, y1)),
        }
    }
}

/// First axis along which two bounds differ.
fn varying_axis(lo: &Point, hi: &Point) -> MathResult<usize> {
    lo.independent()
        .iter()
        .zip(hi.independent())
        .position(|(a, b)| a != b)
        .ok_or(MathError::DegenerateBounds {
            x: lo.independent().first().copied().unwrap_or(f64::NAN),
        })
}

/// Weighted form, so that both endpoints are reproduced exactly.
#[inline]
fn linear(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    let w = (x - x0) / (x1 - x0);
    (1.0 - w) * y0 + w * y1
}

fn log_linear(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> MathResult<f64> {
    check_positive(y0, y1)?;
    Ok(linear(x, x0, x1, y0.ln(), y1.ln()).exp())
}

/// Linear in `r = -ln(y)/x`, rebuilt as `exp(-r x)`. The rate is
/// undefined at `x <= 0`, so a segment starting there is log-linear,
/// which holds the rate of its right end flat back to the origin.
fn linear_rate(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> MathResult<f64> {
    check_positive(y0, y1)?;
    if x == x0 {
        return Ok(y0);
    }
    if x == x1 {
        return Ok(y1);
    }
    if x0 <= 0.0 || x1 <= 0.0 || x <= 0.0 {
        return log_linear(x, x0, x1, y0, y1);
    }
    let r0 = -y0.ln() / x0;
    let r1 = -y1.ln() / x1;
    Ok((-linear(x, x0, x1, r0, r1) * x).exp())
}

fn check_positive(y0: f64, y1: f64) -> MathResult<()> {
    match [y0, y1].into_iter().find(|y| *y <= 0.0 || y.is_nan()) {
        Some(bad) => Err(MathError::InvalidDomain { value: bad }),
        None => Ok(()),
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationMethod {
    type Err = MathError;

    /// Accepts the method name with or without the `Interpolation` suffix,
    /// in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        let key = key.strip_suffix("interpolation").unwrap_or(&key);

        match key {
            "linear" => Ok(InterpolationMethod::Linear),
            "loglinear" => Ok(InterpolationMethod::LogLinear),
            "linearrate" => Ok(InterpolationMethod::LinearRate),
            "bilinear" => Ok(InterpolationMethod::Bilinear),
            "trilinear" => Ok(InterpolationMethod::Trilinear),
            _ => Err(MathError::invalid_input(format!(
                "unknown interpolation method '{s}'"
            ))),
        }
    }
}

impl TryFrom<String> for InterpolationMethod {
    type Error = MathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InterpolationMethod> for String {
    fn from(method: InterpolationMethod) -> Self {
        method.name().to_string()
    }
}
