//! The sequential bootstrapper.

use std::sync::Arc;

use pillar_math::solvers::{Brent, SolverConfig};
use tracing::{debug, error, info, warn};

use super::report::{BootstrapReport, NodeReport, NodeResolution, SkipReason, SkippedInstrument};
use super::BootstrapConfig;
use crate::curve::{CurveDefinition, CurveUnderConstruction, FrozenCurve};
use crate::error::{CurveError, CurveResult};
use crate::instruments::{InstrumentClass, PriceableInstrument};
use crate::objective::QuoteObjective;
use crate::traits::ReadableCurve;

/// A bootstrapped curve with the record of how it was built.
#[derive(Debug, Clone)]
pub struct BootstrapOutput {
    /// The frozen curve.
    pub curve: FrozenCurve,
    /// Per-node outcomes.
    pub report: BootstrapReport,
}

/// Builds a curve from instruments, one node per distinct maturity.
///
/// ```rust
/// use pillar_core::{Date, Frequency};
/// use pillar_curves::prelude::*;
///
/// let spot = Date::from_ymd(2025, 1, 15).unwrap();
/// let curve = Bootstrapper::new(CurveDefinition::discount("USD", spot))
///     .add_instrument(Deposit::from_tenor(spot, "6M", 0.041).unwrap())
///     .add_instrument(Swap::from_tenor(spot, "2Y", 0.038, Frequency::Annual).unwrap())
///     .add_instrument(Swap::from_tenor(spot, "5Y", 0.036, Frequency::Annual).unwrap())
///     .build()
///     .unwrap();
///
/// let df = curve.value(spot.add_years(3).unwrap()).unwrap();
/// assert!(df > 0.85 && df < 0.95);
/// ```
#[derive(Debug)]
pub struct Bootstrapper {
    definition: CurveDefinition,
    base_curve: Option<Arc<FrozenCurve>>,
    instruments: Vec<Box<dyn PriceableInstrument>>,
    config: BootstrapConfig,
}

impl Bootstrapper {
    /// Creates a bootstrapper for an outright curve.
    #[must_use]
    pub fn new(definition: CurveDefinition) -> Self {
        Self {
            definition,
            base_curve: None,
            instruments: Vec::new(),
            config: BootstrapConfig::default(),
        }
    }

    /// Builds a spread curve over `base` instead of an outright curve.
    #[must_use]
    pub fn over(mut self, base: Arc<FrozenCurve>) -> Self {
        self.base_curve = Some(base);
        self
    }

    /// Sets the bootstrap configuration.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the quote tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Sets the per-node evaluation cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Adds an instrument.
    #[must_use]
    pub fn add_instrument<I: PriceableInstrument + 'static>(mut self, instrument: I) -> Self {
        self.instruments.push(Box::new(instrument));
        self
    }

    /// Adds several instruments.
    #[must_use]
    pub fn add_instruments<I: PriceableInstrument + 'static>(
        mut self,
        instruments: impl IntoIterator<Item = I>,
    ) -> Self {
        for instrument in instruments {
            self.instruments.push(Box::new(instrument));
        }
        self
    }

    /// Name of the curve being built.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Number of instruments added.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// A fresh curve from the definition, with no instrument nodes.
    pub fn new_curve(&self) -> CurveResult<CurveUnderConstruction> {
        match &self.base_curve {
            Some(base) => CurveUnderConstruction::over(self.definition.clone(), Arc::clone(base)),
            None => CurveUnderConstruction::new(self.definition.clone()),
        }
    }

    /// Bootstraps a fresh curve and freezes it.
    pub fn run(self) -> CurveResult<BootstrapOutput> {
        let mut curve = self.new_curve()?;
        let report = self.bootstrap_into(&mut curve)?;
        Ok(BootstrapOutput {
            curve: curve.freeze(),
            report,
        })
    }

    /// Bootstraps a fresh curve and returns only the frozen curve.
    pub fn build(self) -> CurveResult<FrozenCurve> {
        self.run().map(|output| output.curve)
    }

    /// Appends one node per instrument to `curve`.
    ///
    /// Instruments are stably sorted by maturity, so among instruments
    /// sharing a maturity the one added first wins and the rest are
    /// skipped. Nodes already on `curve` are kept and must not lie after
    /// any instrument's maturity.
    ///
    /// # Errors
    ///
    /// - `NoInstruments` when nothing was added
    /// - `UnorderedInstruments` when an instrument matures before an
    ///   accepted node
    /// - `NodeFailure` when a node cannot be solved; the trial node is
    ///   removed and every earlier node is left untouched. Distinct
    ///   maturities that the day count maps to the same time (30/360 on
    ///   the 30th and 31st) fail here with `CoincidentNodes`; they are
    ///   not merged like equal maturities
    pub fn bootstrap_into(&self, curve: &mut CurveUnderConstruction) -> CurveResult<BootstrapReport> {
        let name = curve.name().to_string();
        if self.instruments.is_empty() {
            return Err(CurveError::NoInstruments { curve: name });
        }

        let mut ordered: Vec<&dyn PriceableInstrument> =
            self.instruments.iter().map(AsRef::as_ref).collect();
        ordered.sort_by_key(|instrument| instrument.maturity());

        info!(curve = %name, instruments = ordered.len(), "bootstrap started");

        let base_date = curve.base_date();
        let mut report = BootstrapReport::new(&name);
        let mut last_pinned: Option<&str> = None;

        for instrument in ordered {
            let maturity = instrument.maturity();

            if maturity == base_date {
                warn!(curve = %name, instrument = instrument.id(), "matures on the base date, skipped");
                report.skipped.push(SkippedInstrument {
                    instrument: instrument.id().to_string(),
                    maturity,
                    reason: SkipReason::BaseDate,
                });
                continue;
            }

            let last_node = curve.last_node().map_or(base_date, |(date, _)| date);
            if maturity < last_node {
                return Err(CurveError::UnorderedInstruments {
                    instrument: instrument.id().to_string(),
                    maturity,
                    last_node,
                });
            }
            if maturity == last_node {
                let kept = last_pinned.unwrap_or("existing node").to_string();
                warn!(
                    curve = %name,
                    instrument = instrument.id(),
                    kept = %kept,
                    %maturity,
                    "duplicate maturity, skipped"
                );
                report.skipped.push(SkippedInstrument {
                    instrument: instrument.id().to_string(),
                    maturity,
                    reason: SkipReason::DuplicateMaturity { kept },
                });
                continue;
            }

            let node = self
                .solve_node(instrument, curve)
                .map_err(|(source, last_error)| {
                    error!(
                        curve = %name,
                        instrument = instrument.id(),
                        %maturity,
                        last_error,
                        error = %source,
                        "node failed, bootstrap aborted"
                    );
                    CurveError::node_failure(instrument.id(), maturity, last_error, source)
                })?;

            debug!(
                curve = %name,
                instrument = instrument.id(),
                %maturity,
                value = node.value,
                error = node.error,
                resolution = ?node.resolution,
                "node accepted"
            );
            last_pinned = Some(instrument.id());
            report.nodes.push(node);
        }

        info!(
            curve = %name,
            nodes = report.nodes.len(),
            skipped = report.skipped.len(),
            solver_iterations = report.solver_iterations(),
            max_error = report.max_abs_error(),
            "bootstrap complete"
        );
        Ok(report)
    }

    /// Appends the trial node and resolves it, removing it on failure.
    fn solve_node(
        &self,
        instrument: &dyn PriceableInstrument,
        curve: &mut CurveUnderConstruction,
    ) -> Result<NodeReport, (CurveError, f64)> {
        let class = instrument.class();
        let guess = first_guess(instrument, curve, class);
        let maturity = instrument.maturity();

        curve
            .append_or_replace_last_node(maturity, guess)
            .map_err(|e| (e, f64::NAN))?;

        let outcome = self.resolve(instrument, curve, guess, class);
        if outcome.is_err() {
            curve.remove_last_node();
        }
        outcome.map(|(value, error, resolution)| NodeReport {
            instrument: instrument.id().to_string(),
            maturity,
            value,
            error,
            resolution,
        })
    }

    fn resolve(
        &self,
        instrument: &dyn PriceableInstrument,
        curve: &mut CurveUnderConstruction,
        guess: f64,
        class: InstrumentClass,
    ) -> Result<(f64, f64, NodeResolution), (CurveError, f64)> {
        let tolerance = self.config.tolerance;
        let mut objective = QuoteObjective::new(instrument, curve, tolerance);

        match objective.initial_guess_is_acceptable() {
            Ok(true) => {
                return Ok((guess, objective.last_error(), NodeResolution::InitialGuess));
            }
            Ok(false) => {}
            Err(e) => return Err((e, objective.last_error())),
        }

        let (lower, upper) = class.bounds();
        let solver = Brent::new(SolverConfig::new(tolerance, self.config.max_iterations));
        let start = guess.clamp(lower, upper);
        let solved = match self.config.step {
            Some(step) => solver
                .with_lower_limit(lower)
                .with_upper_limit(upper)
                .solve_with_step(&mut objective, start, step),
            None => solver.solve(&mut objective, start, lower, upper),
        };
        let result = match solved {
            Ok(result) => result,
            Err(e) => return Err((e, objective.last_error())),
        };

        // The node holds the last trial, which need not be the root.
        let error = objective
            .evaluate(result.root)
            .map_err(|e| (e, objective.last_error()))?;

        Ok((
            result.root,
            error,
            NodeResolution::Solved {
                iterations: result.iterations,
            },
        ))
    }
}

/// The instrument's closed form if it has a usable one, else the class
/// default.
fn first_guess(
    instrument: &dyn PriceableInstrument,
    curve: &CurveUnderConstruction,
    class: InstrumentClass,
) -> f64 {
    match instrument.initial_guess(curve) {
        Ok(Some(guess)) if guess.is_finite() => guess,
        Ok(_) => class.default_guess(),
        Err(e) => {
            debug!(instrument = instrument.id(), error = %e, "closed-form guess unavailable");
            class.default_guess()
        }
    }
}
