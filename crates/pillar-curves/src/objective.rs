//! Quote error as a function of the last node.

use pillar_math::solvers::ObjectiveFunction;

use crate::curve::CurveUnderConstruction;
use crate::error::{CurveError, CurveResult};
use crate::instruments::PriceableInstrument;

/// Quote error of one instrument as its maturity node moves.
///
/// The curve's last node must be the instrument's trial node. Every
/// evaluation overwrites it, so after a solve the node holds whatever was
/// evaluated last; the bootstrapper resets it to the returned root.
pub struct QuoteObjective<'a> {
    instrument: &'a dyn PriceableInstrument,
    curve: &'a mut CurveUnderConstruction,
    tolerance: f64,
    last_error: f64,
}

impl<'a> QuoteObjective<'a> {
    /// Binds `instrument` to the last node of `curve`.
    pub fn new(
        instrument: &'a dyn PriceableInstrument,
        curve: &'a mut CurveUnderConstruction,
        tolerance: f64,
    ) -> Self {
        Self {
            instrument,
            curve,
            tolerance,
            last_error: f64::NAN,
        }
    }

    /// Sets the last node to `trial` and returns `quote − implied quote`.
    pub fn evaluate(&mut self, trial: f64) -> CurveResult<f64> {
        self.curve.set_last_value(trial)?;
        let implied = self.instrument.implied_quote(&*self.curve)?;
        self.last_error = self.instrument.quote() - implied;
        Ok(self.last_error)
    }

    /// Evaluates at the node's current value and reports whether the quote
    /// is already matched within tolerance.
    pub fn initial_guess_is_acceptable(&mut self) -> CurveResult<bool> {
        let current = self
            .curve
            .last_node()
            .map(|(_, value)| value)
            .ok_or_else(|| CurveError::pricing(self.instrument.id(), "curve has no trial node"))?;
        Ok(self.evaluate(current)?.abs() < self.tolerance)
    }

    /// Quote error at the most recent evaluation, NaN before the first.
    #[must_use]
    pub fn last_error(&self) -> f64 {
        self.last_error
    }
}

impl ObjectiveFunction for QuoteObjective<'_> {
    type Error = CurveError;

    fn value(&mut self, x: f64) -> CurveResult<f64> {
        self.evaluate(x)
    }
}
