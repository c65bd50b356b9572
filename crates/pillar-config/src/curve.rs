//! Curve configuration types.
//!
//! A [`CurveConfig`] describes one curve to bootstrap: its time axis,
//! interpolation, solver settings, the curves it reads, and the quoted
//! instruments that pin its nodes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pillar_core::{DayCountConvention, Date, Frequency, Tenor};
use pillar_curves::bootstrap::{BootstrapConfig, Bootstrapper, DEFAULT_TOLERANCE};
use pillar_curves::curve::{CurveDefinition, FrozenCurve};
use pillar_curves::instruments::{
    CapFloor, CapFloorKind, Deposit, Fra, InstrumentClass, PriceableInstrument, RateDeposit,
    RateFuture, Swap,
};
use pillar_curves::CurveError;
use pillar_math::interpolation::InterpolationMethod;
use pillar_math::solvers::DEFAULT_MAX_ITERATIONS;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

// =============================================================================
// CURVE KIND
// =============================================================================

/// What the nodes of a curve hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Discount factors, seeded with 1.0 at the base date.
    #[default]
    Discount,
    /// Continuously compounded zero rates, or spreads over a base curve.
    Zero,
    /// Optionlet volatilities by fixing date.
    Volatility,
}

impl CurveKind {
    /// Class every instrument of such a curve must belong to.
    #[must_use]
    pub fn instrument_class(self) -> InstrumentClass {
        match self {
            CurveKind::Discount => InstrumentClass::DiscountFactor,
            CurveKind::Zero => InstrumentClass::Rate,
            CurveKind::Volatility => InstrumentClass::Volatility,
        }
    }

    /// Interpolation used when none is configured.
    #[must_use]
    pub fn default_interpolation(self) -> InterpolationMethod {
        match self {
            CurveKind::Discount => InterpolationMethod::LogLinear,
            CurveKind::Zero | CurveKind::Volatility => InterpolationMethod::Linear,
        }
    }

    /// Base-date seed used when none is configured.
    #[must_use]
    pub fn default_base_value(self) -> Option<f64> {
        match self {
            CurveKind::Discount => Some(1.0),
            CurveKind::Zero | CurveKind::Volatility => None,
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveKind::Discount => write!(f, "discount"),
            CurveKind::Zero => write!(f, "zero"),
            CurveKind::Volatility => write!(f, "volatility"),
        }
    }
}

// =============================================================================
// SOLVER SETTINGS
// =============================================================================

/// Per-node solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Quote error below which a node is accepted.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Cap on objective evaluations per node.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// First step of a bracket grown outward from each node's guess.
    /// Without it the solver brackets the instrument class range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            step: None,
        }
    }
}

impl From<SolverSettings> for BootstrapConfig {
    fn from(settings: SolverSettings) -> Self {
        let config = BootstrapConfig::new(settings.tolerance, settings.max_iterations);
        match settings.step {
            Some(step) => config.with_step(step),
            None => config,
        }
    }
}

impl Validate for SolverSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.tolerance > 0.0 && self.tolerance <= 1e-4) {
            errors.push(ValidationError::with_rule(
                "tolerance",
                "Tolerance must be between 0 and 1e-4",
                "valid_tolerance",
            ));
        }

        if self.max_iterations == 0 || self.max_iterations > 10000 {
            errors.push(ValidationError::with_rule(
                "max_iterations",
                "Max iterations must be between 1 and 10000",
                "valid_iterations",
            ));
        }

        if let Some(step) = self.step {
            if !(step.is_finite() && step > 0.0) {
                errors.push(ValidationError::with_rule(
                    "step",
                    format!("Step must be positive, got {step}"),
                    "positive_step",
                ));
            }
        }

        errors
    }
}

// =============================================================================
// CURVE CONFIGURATION
// =============================================================================

/// Configuration for bootstrapping one curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Curve name, unique within a set.
    pub name: String,

    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// What the nodes hold.
    #[serde(default)]
    pub kind: CurveKind,

    /// Date at which time is zero; also the spot date of tenor instruments.
    pub base_date: Date,

    /// Convention measuring time from the base date.
    #[serde(default = "default_curve_day_count")]
    pub day_count: DayCountConvention,

    /// Interpolation over time; the kind's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<InterpolationMethod>,

    /// Whether values past the last node are held flat.
    #[serde(default = "default_true")]
    pub extrapolation_permitted: bool,

    /// Value seeded at the base date; the kind's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_value: Option<f64>,

    /// Solver settings.
    #[serde(default)]
    pub solver: SolverSettings,

    /// Zero curve this one is a spread over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_curve: Option<String>,

    /// Discount curve options are priced off (volatility curves).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_curve: Option<String>,

    /// Quoted instruments, in any order.
    #[serde(default)]
    pub instruments: Vec<InstrumentConfig>,
}

fn default_curve_day_count() -> DayCountConvention {
    DayCountConvention::Act365Fixed
}

fn default_true() -> bool {
    true
}

impl CurveConfig {
    /// Creates a discount curve configuration with default settings.
    pub fn new(name: impl Into<String>, base_date: Date) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: CurveKind::Discount,
            base_date,
            day_count: default_curve_day_count(),
            interpolation: None,
            extrapolation_permitted: true,
            base_value: None,
            solver: SolverSettings::default(),
            base_curve: None,
            discount_curve: None,
            instruments: Vec::new(),
        }
    }

    /// Sets the curve kind.
    #[must_use]
    pub fn with_kind(mut self, kind: CurveKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the interpolation method.
    #[must_use]
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = Some(method);
        self
    }

    /// Sets the time axis day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the solver settings.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Makes this a spread curve over `base`.
    #[must_use]
    pub fn with_base_curve(mut self, base: impl Into<String>) -> Self {
        self.base_curve = Some(base.into());
        self
    }

    /// Prices options off `discount`.
    #[must_use]
    pub fn with_discount_curve(mut self, discount: impl Into<String>) -> Self {
        self.discount_curve = Some(discount.into());
        self
    }

    /// Adds an instrument.
    #[must_use]
    pub fn with_instrument(mut self, instrument: InstrumentConfig) -> Self {
        self.instruments.push(instrument);
        self
    }

    /// Interpolation actually used.
    pub fn interpolation_method(&self) -> InterpolationMethod {
        self.interpolation
            .unwrap_or_else(|| self.kind.default_interpolation())
    }

    /// Base-date seed actually used.
    pub fn seed_value(&self) -> Option<f64> {
        self.base_value.or_else(|| self.kind.default_base_value())
    }

    /// Names of the curves this one reads.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.base_curve
            .iter()
            .chain(self.discount_curve.iter())
            .map(String::as_str)
    }

    /// Static curve definition.
    pub fn definition(&self) -> CurveDefinition {
        let definition = CurveDefinition::new(&self.name, self.base_date)
            .with_interpolation(self.interpolation_method())
            .with_day_count(self.day_count)
            .with_extrapolation(self.extrapolation_permitted);
        match self.seed_value() {
            Some(value) => definition.with_base_value(value),
            None => definition,
        }
    }

    /// Creates the bootstrapper for this curve, reading referenced curves
    /// from `built`.
    ///
    /// # Errors
    ///
    /// `CurveNotFound` if a referenced curve has not been built, or any
    /// error raised while constructing the instruments.
    pub fn bootstrapper(
        &self,
        built: &HashMap<String, Arc<FrozenCurve>>,
    ) -> ConfigResult<Bootstrapper> {
        let lookup = |name: &str| -> ConfigResult<Arc<FrozenCurve>> {
            built.get(name).cloned().ok_or_else(|| {
                CurveError::CurveNotFound {
                    name: name.to_string(),
                }
                .into()
            })
        };

        let discount = self.discount_curve.as_deref().map(lookup).transpose()?;
        let mut job = Bootstrapper::new(self.definition()).with_config(self.solver.into());
        if let Some(base) = self.base_curve.as_deref() {
            job = job.over(lookup(base)?);
        }
        for instrument in &self.instruments {
            job = job.add_instrument(instrument.build(self.base_date, discount.as_ref())?);
        }
        Ok(job)
    }
}

impl Validate for CurveConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "Name cannot be empty"));
        }

        errors.extend(self.solver.validate().into_iter().map(|e| e.nested("solver")));

        let method = self.interpolation_method();
        if method.dimension() != 1 {
            errors.push(ValidationError::with_rule(
                "interpolation",
                format!("{method} is not a curve interpolation"),
                "one_dimensional",
            ));
        }

        if let Some(seed) = self.seed_value() {
            let needs_positive = matches!(
                method,
                InterpolationMethod::LogLinear | InterpolationMethod::LinearRate
            );
            if !seed.is_finite() || (needs_positive && seed <= 0.0) {
                errors.push(ValidationError::with_rule(
                    "base_value",
                    format!("Base value {seed} is invalid for {method}"),
                    "valid_base_value",
                ));
            }
        }

        if self.base_curve.is_some() && self.kind != CurveKind::Zero {
            errors.push(ValidationError::with_rule(
                "base_curve",
                "Only zero curves can be spread curves",
                "spread_kind",
            ));
        }

        match (self.kind, &self.discount_curve) {
            (CurveKind::Volatility, None) => errors.push(ValidationError::with_rule(
                "discount_curve",
                "Volatility curves need a discount curve",
                "required",
            )),
            (CurveKind::Discount | CurveKind::Zero, Some(_)) => {
                errors.push(ValidationError::new(
                    "discount_curve",
                    "Only volatility curves read a discount curve",
                ));
            }
            _ => {}
        }

        if self.dependencies().any(|dep| dep == self.name) {
            errors.push(ValidationError::with_rule(
                "name",
                "A curve cannot reference itself",
                "acyclic",
            ));
        }

        if self.instruments.is_empty() {
            errors.push(ValidationError::with_rule(
                "instruments",
                "At least one instrument is required",
                "non_empty",
            ));
        }

        let class = self.kind.instrument_class();
        for (i, instrument) in self.instruments.iter().enumerate() {
            let prefix = format!("instruments[{i}]");
            if instrument.class() != class {
                errors.push(
                    ValidationError::with_rule(
                        "type",
                        format!(
                            "{} does not fit a {} curve",
                            instrument.type_name(),
                            self.kind
                        ),
                        "instrument_kind",
                    )
                    .nested(&prefix),
                );
            }
            errors.extend(instrument.validate().into_iter().map(|e| e.nested(&prefix)));
        }

        errors
    }
}

// =============================================================================
// INSTRUMENT CONFIGURATION
// =============================================================================

/// A quoted instrument, tagged by `type`.
///
/// Tenors run from the curve's base date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstrumentConfig {
    /// Money market deposit, by tenor or by explicit dates.
    Deposit {
        /// Identifier override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Tenor from the base date.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tenor: Option<Tenor>,
        /// Accrual start, with `end`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<Date>,
        /// Accrual end, with `start`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<Date>,
        /// Simple rate.
        rate: f64,
        /// Accrual day count (ACT/360 when absent).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day_count: Option<DayCountConvention>,
    },

    /// Forward rate agreement in `AxB` month notation.
    Fra {
        /// Identifier override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Months to the accrual start.
        start_months: u32,
        /// Months to the accrual end.
        end_months: u32,
        /// Simple forward rate.
        rate: f64,
        /// Accrual day count (ACT/360 when absent).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day_count: Option<DayCountConvention>,
    },

    /// Price-quoted rate future.
    Future {
        /// Identifier override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Accrual start.
        start: Date,
        /// Accrual end.
        end: Date,
        /// Quoted price, `100 - rate`.
        price: f64,
        /// Rate subtracted from the futures rate to get the forward.
        #[serde(default)]
        convexity: f64,
        /// Accrual day count (ACT/360 when absent).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day_count: Option<DayCountConvention>,
    },

    /// Spot-starting par swap.
    Swap {
        /// Identifier override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Swap tenor.
        tenor: Tenor,
        /// Par fixed rate.
        rate: f64,
        /// Fixed leg frequency.
        #[serde(default = "default_fixed_frequency")]
        frequency: Frequency,
        /// Fixed leg day count (30/360 when absent).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day_count: Option<DayCountConvention>,
    },

    /// Continuously compounded zero rate to a tenor.
    ZeroDeposit {
        /// Identifier override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Tenor from the base date.
        tenor: Tenor,
        /// Zero rate.
        rate: f64,
        /// Rate day count (ACT/365F when absent).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day_count: Option<DayCountConvention>,
    },

    /// Cap quoted in flat volatility.
    Cap(OptionStripConfig),

    /// Floor quoted in flat volatility.
    Floor(OptionStripConfig),
}

/// Cap or floor quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionStripConfig {
    /// Identifier override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Strip tenor from the base date.
    pub tenor: Tenor,
    /// Strike rate.
    pub strike: f64,
    /// Flat Black volatility.
    pub vol: f64,
    /// Reset frequency.
    #[serde(default = "default_option_frequency")]
    pub frequency: Frequency,
}

fn default_fixed_frequency() -> Frequency {
    Frequency::Annual
}

fn default_option_frequency() -> Frequency {
    Frequency::Quarterly
}

impl InstrumentConfig {
    /// Deposit by tenor.
    #[must_use]
    pub fn deposit(tenor: Tenor, rate: f64) -> Self {
        Self::Deposit {
            id: None,
            tenor: Some(tenor),
            start: None,
            end: None,
            rate,
            day_count: None,
        }
    }

    /// Annual swap by tenor.
    #[must_use]
    pub fn swap(tenor: Tenor, rate: f64) -> Self {
        Self::Swap {
            id: None,
            tenor,
            rate,
            frequency: default_fixed_frequency(),
            day_count: None,
        }
    }

    /// Zero deposit by tenor.
    #[must_use]
    pub fn zero_deposit(tenor: Tenor, rate: f64) -> Self {
        Self::ZeroDeposit {
            id: None,
            tenor,
            rate,
            day_count: None,
        }
    }

    /// Quarterly cap by tenor.
    #[must_use]
    pub fn cap(tenor: Tenor, strike: f64, vol: f64) -> Self {
        Self::Cap(OptionStripConfig {
            id: None,
            tenor,
            strike,
            vol,
            frequency: default_option_frequency(),
        })
    }

    /// Value of the `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Fra { .. } => "fra",
            Self::Future { .. } => "future",
            Self::Swap { .. } => "swap",
            Self::ZeroDeposit { .. } => "zero_deposit",
            Self::Cap(_) => "cap",
            Self::Floor(_) => "floor",
        }
    }

    /// Class of node the instrument pins.
    pub fn class(&self) -> InstrumentClass {
        match self {
            Self::Deposit { .. } | Self::Fra { .. } | Self::Future { .. } | Self::Swap { .. } => {
                InstrumentClass::DiscountFactor
            }
            Self::ZeroDeposit { .. } => InstrumentClass::Rate,
            Self::Cap(_) | Self::Floor(_) => InstrumentClass::Volatility,
        }
    }

    /// Builds the instrument with tenors running from `spot`.
    ///
    /// # Errors
    ///
    /// - `Validation` for a deposit without a tenor or dates, or an
    ///   option without a discount curve
    /// - Curve errors raised by the instrument constructors
    pub fn build(
        &self,
        spot: Date,
        discount: Option<&Arc<FrozenCurve>>,
    ) -> ConfigResult<Box<dyn PriceableInstrument>> {
        let instrument: Box<dyn PriceableInstrument> = match self {
            Self::Deposit {
                id,
                tenor,
                start,
                end,
                rate,
                day_count,
            } => {
                let mut deposit = match (tenor, start, end) {
                    (Some(tenor), None, None) => Deposit::new(spot, advance(*tenor, spot)?, *rate)
                        .with_id(format!("DEP-{tenor}")),
                    (None, Some(start), Some(end)) => Deposit::new(*start, *end, *rate),
                    _ => return Err(invalid("tenor", "Deposit needs a tenor or start and end")),
                };
                if let Some(id) = id {
                    deposit = deposit.with_id(id.clone());
                }
                if let Some(day_count) = day_count {
                    deposit = deposit.with_day_count(*day_count);
                }
                Box::new(deposit)
            }
            Self::Fra {
                id,
                start_months,
                end_months,
                rate,
                day_count,
            } => {
                let mut fra = Fra::from_months(spot, *start_months, *end_months, *rate)?;
                if let Some(id) = id {
                    fra = fra.with_id(id.clone());
                }
                if let Some(day_count) = day_count {
                    fra = fra.with_day_count(*day_count);
                }
                Box::new(fra)
            }
            Self::Future {
                id,
                start,
                end,
                price,
                convexity,
                day_count,
            } => {
                let mut future =
                    RateFuture::new(*start, *end, *price).with_convexity_adjustment(*convexity);
                if let Some(id) = id {
                    future = future.with_id(id.clone());
                }
                if let Some(day_count) = day_count {
                    future = future.with_day_count(*day_count);
                }
                Box::new(future)
            }
            Self::Swap {
                id,
                tenor,
                rate,
                frequency,
                day_count,
            } => {
                let mut swap = Swap::new(spot, advance(*tenor, spot)?, *rate, *frequency)
                    .with_id(id.clone().unwrap_or_else(|| format!("SWP-{tenor}")));
                if let Some(day_count) = day_count {
                    swap = swap.with_day_count(*day_count);
                }
                Box::new(swap)
            }
            Self::ZeroDeposit {
                id,
                tenor,
                rate,
                day_count,
            } => {
                let mut deposit = RateDeposit::new(spot, advance(*tenor, spot)?, *rate)
                    .with_id(id.clone().unwrap_or_else(|| format!("ZDEP-{tenor}")));
                if let Some(day_count) = day_count {
                    deposit = deposit.with_day_count(*day_count);
                }
                Box::new(deposit)
            }
            Self::Cap(strip) => Box::new(strip.build(CapFloorKind::Cap, spot, discount)?),
            Self::Floor(strip) => Box::new(strip.build(CapFloorKind::Floor, spot, discount)?),
        };
        Ok(instrument)
    }
}

impl OptionStripConfig {
    fn build(
        &self,
        kind: CapFloorKind,
        spot: Date,
        discount: Option<&Arc<FrozenCurve>>,
    ) -> ConfigResult<CapFloor> {
        let discount =
            discount.ok_or_else(|| invalid("discount_curve", "Options need a discount curve"))?;
        let maturity = advance(self.tenor, spot)?;
        let strip = CapFloor::new(
            kind,
            discount,
            spot,
            maturity,
            self.strike,
            self.vol,
            self.frequency,
        )?;
        let id = self
            .id
            .clone()
            .unwrap_or_else(|| format!("{kind}-{}", self.tenor));
        Ok(strip.with_id(id))
    }
}

fn advance(tenor: Tenor, spot: Date) -> ConfigResult<Date> {
    tenor
        .advance(spot)
        .map_err(|e| ConfigError::Curve(CurveError::from(e)))
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn check_finite(errors: &mut Vec<ValidationError>, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(ValidationError::with_rule(
            field,
            format!("{value} is not a finite number"),
            "finite",
        ));
    }
}

impl Validate for InstrumentConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        match self {
            Self::Deposit {
                tenor,
                start,
                end,
                rate,
                ..
            } => {
                check_finite(&mut errors, "rate", *rate);
                match (tenor, start, end) {
                    (Some(_), None, None) => {}
                    (None, Some(start), Some(end)) if start < end => {}
                    (None, Some(_), Some(_)) => {
                        errors.push(ValidationError::new("end", "End must be after start"));
                    }
                    _ => errors.push(ValidationError::with_rule(
                        "tenor",
                        "Give either a tenor or both start and end",
                        "exclusive_dates",
                    )),
                }
            }
            Self::Fra {
                start_months,
                end_months,
                rate,
                ..
            } => {
                check_finite(&mut errors, "rate", *rate);
                if start_months >= end_months {
                    errors.push(ValidationError::new(
                        "end_months",
                        "End month must be after start month",
                    ));
                }
            }
            Self::Future {
                start,
                end,
                price,
                convexity,
                ..
            } => {
                check_finite(&mut errors, "convexity", *convexity);
                if !(*price > 0.0 && *price < 200.0) {
                    errors.push(ValidationError::with_rule(
                        "price",
                        "Price must be between 0 and 200",
                        "valid_price",
                    ));
                }
                if start >= end {
                    errors.push(ValidationError::new("end", "End must be after start"));
                }
            }
            Self::Swap { tenor, rate, .. } => {
                check_finite(&mut errors, "rate", *rate);
                if tenor.count() == 0 {
                    errors.push(ValidationError::new("tenor", "Tenor must be positive"));
                }
            }
            Self::ZeroDeposit { tenor, rate, .. } => {
                check_finite(&mut errors, "rate", *rate);
                if tenor.count() == 0 {
                    errors.push(ValidationError::new("tenor", "Tenor must be positive"));
                }
            }
            Self::Cap(strip) | Self::Floor(strip) => {
                if !(strip.strike > 0.0 && strip.strike.is_finite()) {
                    errors.push(ValidationError::with_rule(
                        "strike",
                        "Strike must be positive",
                        "positive_strike",
                    ));
                }
                if !(strip.vol > 0.0 && strip.vol.is_finite()) {
                    errors.push(ValidationError::with_rule(
                        "vol",
                        "Volatility must be positive",
                        "positive_vol",
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pillar_curves::traits::ReadableCurve;

    fn base() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn tenor(s: &str) -> Tenor {
        s.parse().unwrap()
    }

    fn usd() -> CurveConfig {
        CurveConfig::new("USD", base())
            .with_instrument(InstrumentConfig::deposit(tenor("3M"), 0.0027))
            .with_instrument(InstrumentConfig::swap(tenor("2Y"), 0.0065))
    }

    #[test]
    fn test_kind_defaults() {
        let discount = usd();
        assert_eq!(discount.interpolation_method(), InterpolationMethod::LogLinear);
        assert_eq!(discount.seed_value(), Some(1.0));

        let zero = CurveConfig::new("Z", base()).with_kind(CurveKind::Zero);
        assert_eq!(zero.interpolation_method(), InterpolationMethod::Linear);
        assert_eq!(zero.seed_value(), None);

        let definition = discount.definition();
        assert_eq!(definition.base_value, Some(1.0));
        assert_eq!(definition.day_count, DayCountConvention::Act365Fixed);
    }

    #[test]
    fn test_curve_config_validation() {
        let mut config = usd();
        assert!(config.is_valid());

        config.name = String::new();
        config.solver.tolerance = 0.0;
        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "solver.tolerance"]);
    }

    #[test]
    fn test_solver_step() {
        let settings: SolverSettings = toml::from_str("step = 0.01").unwrap();
        assert_eq!(settings.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(BootstrapConfig::from(settings).step, Some(0.01));
        assert_eq!(BootstrapConfig::from(SolverSettings::default()).step, None);

        let bad = SolverSettings {
            step: Some(-1.0),
            ..SolverSettings::default()
        };
        assert_eq!(bad.validate()[0].field, "step");
    }

    #[test]
    fn test_instrument_must_fit_kind() {
        let config = usd().with_instrument(InstrumentConfig::cap(tenor("2Y"), 0.01, 0.4));
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "instruments[2].type");
        assert_eq!(errors[0].rule.as_deref(), Some("instrument_kind"));
    }

    #[test]
    fn test_surface_interpolation_rejected() {
        let config = usd().with_interpolation(InterpolationMethod::Bilinear);
        assert_eq!(config.validate()[0].field, "interpolation");
    }

    #[test]
    fn test_volatility_needs_discount_curve() {
        let config = CurveConfig::new("VOL", base())
            .with_kind(CurveKind::Volatility)
            .with_instrument(InstrumentConfig::cap(tenor("2Y"), 0.01, 0.4));
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "discount_curve");
        assert!(config.with_discount_curve("USD").is_valid());
    }

    #[test]
    fn test_instrument_validation() {
        let bad_dates = InstrumentConfig::Deposit {
            id: None,
            tenor: Some(tenor("3M")),
            start: Some(base()),
            end: None,
            rate: 0.01,
            day_count: None,
        };
        assert_eq!(bad_dates.validate()[0].field, "tenor");

        let fra = InstrumentConfig::Fra {
            id: None,
            start_months: 6,
            end_months: 3,
            rate: f64::NAN,
            day_count: None,
        };
        let fields: Vec<_> = fra.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["rate", "end_months"]);
    }

    #[test]
    fn test_build_instruments() {
        let swap = InstrumentConfig::swap(tenor("2Y"), 0.0065)
            .build(base(), None)
            .unwrap();
        assert_eq!(swap.id(), "SWP-2Y");
        assert_eq!(swap.maturity(), Date::from_ymd(2027, 1, 2).unwrap());

        let named = InstrumentConfig::Deposit {
            id: Some("USD 3M".into()),
            tenor: None,
            start: Some(base()),
            end: Some(Date::from_ymd(2025, 4, 2).unwrap()),
            rate: 0.01,
            day_count: Some(DayCountConvention::Act365Fixed),
        }
        .build(base(), None)
        .unwrap();
        assert_eq!(named.id(), "USD 3M");
    }

    #[test]
    fn test_cap_without_discount_curve() {
        let err = InstrumentConfig::cap(tenor("2Y"), 0.01, 0.4)
            .build(base(), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "discount_curve"));
    }

    #[test]
    fn test_bootstrapper_missing_reference() {
        let config = CurveConfig::new("VOL", base())
            .with_kind(CurveKind::Volatility)
            .with_discount_curve("USD")
            .with_instrument(InstrumentConfig::cap(tenor("2Y"), 0.01, 0.4));
        let err = config.bootstrapper(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Curve(CurveError::CurveNotFound { .. })));
    }

    #[test]
    fn test_bootstrapper_runs() {
        let output = usd().bootstrapper(&HashMap::new()).unwrap().run().unwrap();
        assert_eq!(output.curve.node_count(), 3);
        assert_eq!(output.curve.name(), "USD");
    }

    #[test]
    fn test_deserialize_tagged_instruments() {
        let json = r#"{
            "name": "USD",
            "base_date": "2025-01-02",
            "interpolation": "LogLinearInterpolation",
            "day_count": "ACT/360",
            "solver": { "max_iterations": 50 },
            "instruments": [
                { "type": "deposit", "tenor": "3M", "rate": 0.0027 },
                { "type": "fra", "start_months": 3, "end_months": 6, "rate": 0.003 },
                { "type": "swap", "tenor": "2Y", "rate": 0.0065, "frequency": "semi_annual" }
            ]
        }"#;
        let config: CurveConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.day_count, DayCountConvention::Act360);
        assert_eq!(config.solver.max_iterations, 50);
        assert_eq!(config.solver.tolerance, DEFAULT_TOLERANCE);
        assert!(config.extrapolation_permitted);
        assert_eq!(config.instruments.len(), 3);
        assert!(matches!(
            config.instruments[2],
            InstrumentConfig::Swap {
                frequency: Frequency::SemiAnnual,
                ..
            }
        ));
        assert!(config.is_valid());
    }
}
