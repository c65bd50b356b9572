//! Base-plus-spread composition.

use super::Interpolator;
use crate::error::{MathError, MathResult};

/// Sum of a base interpolator and a spread interpolator evaluated at the
/// same coordinate.
///
/// The base is typically a frozen discount or rate curve shared by
/// reference; the spread is the curve being built over it.
#[derive(Debug, Clone)]
pub struct SpreadComposite<B, S> {
    base: B,
    spread: S,
}

impl<B: Interpolator, S: Interpolator> SpreadComposite<B, S> {
    /// Pairs a base with a spread of the same dimension.
    pub fn new(base: B, spread: S) -> MathResult<Self> {
        if base.dimension() != spread.dimension() {
            return Err(MathError::DimensionMismatch {
                expected: base.dimension(),
                actual: spread.dimension(),
            });
        }
        Ok(Self { base, spread })
    }

    /// The base interpolator.
    pub fn base(&self) -> &B {
        &self.base
    }

    /// The spread interpolator.
    pub fn spread(&self) -> &S {
        &self.spread
    }

    /// Mutable access to the spread, used while it is being bootstrapped.
    pub fn spread_mut(&mut self) -> &mut S {
        &mut self.spread
    }
}

impl<B: Interpolator, S: Interpolator> Interpolator for SpreadComposite<B, S> {
    fn value(&self, coordinates: &[f64]) -> MathResult<f64> {
        Ok(self.base.value(coordinates)? + self.spread.value(coordinates)?)
    }

    fn dimension(&self) -> usize {
        self.base.dimension()
    }
}
