//! Curves under construction and frozen curves.
//!
//! A curve is a base date, a day count measuring time from it, and a
//! strictly increasing sequence of dated nodes interpolated over that time
//! axis. While it is being bootstrapped the only mutation is on the last
//! node: [`CurveUnderConstruction::append_or_replace_last_node`]. Once every
//! node is solved the curve is frozen into an immutable [`FrozenCurve`]
//! that can be shared across threads and used as the base of other curves.
//!
//! A curve built over a base curve stores spreads; its value is the base
//! value plus the interpolated spread at the same time.

use std::sync::Arc;

use pillar_core::{Date, DayCount, DayCountConvention};
use pillar_math::interpolation::{GridInterpolator, InterpolationMethod, Interpolator, SpreadComposite};
use pillar_math::point::{DiscreteSpace, Point};
use pillar_math::MathResult;
use tracing::trace;

use crate::error::{CurveError, CurveResult};
use crate::traits::ReadableCurve;

/// Static description of a curve: everything except its nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDefinition {
    /// Curve name, used in logs and to reference the curve from others.
    pub name: String,
    /// Date at which time is zero.
    pub base_date: Date,
    /// Interpolation over the time axis. Must be one-dimensional.
    pub interpolation: InterpolationMethod,
    /// Convention measuring time from the base date.
    pub day_count: DayCountConvention,
    /// Whether values outside the node range are held flat.
    pub extrapolation_permitted: bool,
    /// Value of a node placed at the base date before bootstrapping.
    pub base_value: Option<f64>,
}

impl CurveDefinition {
    /// A curve with linear interpolation, ACT/365F time, flat extrapolation
    /// and no base-date node.
    #[must_use]
    pub fn new(name: impl Into<String>, base_date: Date) -> Self {
        Self {
            name: name.into(),
            base_date,
            interpolation: InterpolationMethod::Linear,
            day_count: DayCountConvention::Act365Fixed,
            extrapolation_permitted: true,
            base_value: None,
        }
    }

    /// A discount curve: log-linear on discount factors, seeded with
    /// DF = 1 at the base date.
    #[must_use]
    pub fn discount(name: impl Into<String>, base_date: Date) -> Self {
        Self::new(name, base_date)
            .with_interpolation(InterpolationMethod::LogLinear)
            .with_base_value(1.0)
    }

    /// Sets the interpolation method.
    #[must_use]
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = method;
        self
    }

    /// Sets the time axis day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Enables or disables flat extrapolation.
    #[must_use]
    pub fn with_extrapolation(mut self, permitted: bool) -> Self {
        self.extrapolation_permitted = permitted;
        self
    }

    /// Seeds a node at the base date.
    #[must_use]
    pub fn with_base_value(mut self, value: f64) -> Self {
        self.base_value = Some(value);
        self
    }

    /// Starts without a base-date node.
    #[must_use]
    pub fn without_base_value(mut self) -> Self {
        self.base_value = None;
        self
    }
}

/// Frozen base curve seen as a one-dimensional interpolator over time.
#[derive(Debug, Clone)]
struct BaseLayer(Arc<FrozenCurve>);

impl Interpolator for BaseLayer {
    fn value(&self, coordinates: &[f64]) -> MathResult<f64> {
        self.0.state.nodes.value(coordinates)
    }

    fn dimension(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone)]
enum Nodes {
    Outright(GridInterpolator),
    Spread(SpreadComposite<BaseLayer, GridInterpolator>),
}

impl Nodes {
    fn own(&self) -> &GridInterpolator {
        match self {
            Nodes::Outright(grid) => grid,
            Nodes::Spread(composite) => composite.spread(),
        }
    }

    fn own_mut(&mut self) -> &mut GridInterpolator {
        match self {
            Nodes::Outright(grid) => grid,
            Nodes::Spread(composite) => composite.spread_mut(),
        }
    }

    fn value(&self, coordinates: &[f64]) -> MathResult<f64> {
        match self {
            Nodes::Outright(grid) => grid.value(coordinates),
            Nodes::Spread(composite) => composite.value(coordinates),
        }
    }

    fn base_value(&self, coordinates: &[f64]) -> MathResult<f64> {
        match self {
            Nodes::Outright(_) => Ok(0.0),
            Nodes::Spread(composite) => composite.base().value(coordinates),
        }
    }
}

/// Shared state behind both curve types.
#[derive(Debug, Clone)]
struct CurveState {
    name: String,
    base_date: Date,
    day_count: DayCountConvention,
    dates: Vec<Date>,
    nodes: Nodes,
}

impl CurveState {
    fn build(definition: CurveDefinition, base: Option<Arc<FrozenCurve>>) -> CurveResult<Self> {
        let grid = GridInterpolator::new(
            DiscreteSpace::empty(1),
            definition.interpolation,
            definition.extrapolation_permitted,
        )?;

        let nodes = match base {
            None => Nodes::Outright(grid),
            Some(base) => {
                if base.base_date() != definition.base_date {
                    return Err(CurveError::ReferenceMismatch {
                        expected: definition.base_date,
                        got: base.base_date(),
                    });
                }
                if base.day_count() != definition.day_count {
                    return Err(CurveError::incompatible_base(
                        base.name(),
                        format!(
                            "time axis {} differs from {}",
                            base.day_count(),
                            definition.day_count
                        ),
                    ));
                }
                Nodes::Spread(SpreadComposite::new(BaseLayer(base), grid)?)
            }
        };

        let mut state = Self {
            name: definition.name,
            base_date: definition.base_date,
            day_count: definition.day_count,
            dates: Vec::new(),
            nodes,
        };
        if let Some(value) = definition.base_value {
            state.push(definition.base_date, value)?;
        }
        Ok(state)
    }

    fn time(&self, date: Date) -> f64 {
        self.day_count.year_fraction_f64(self.base_date, date)
    }

    fn push(&mut self, date: Date, value: f64) -> CurveResult<()> {
        let t = self.time(date);
        if let Some(&existing) = self.dates.last() {
            if t <= self.time(existing) {
                return Err(CurveError::CoincidentNodes {
                    date,
                    existing,
                    time: t,
                });
            }
        }
        self.nodes.own_mut().push(Point::xy(t, value))?;
        self.dates.push(date);
        Ok(())
    }

    fn last_node(&self) -> Option<(Date, f64)> {
        let date = *self.dates.last()?;
        let value = self.nodes.own().space().last()?.value();
        Some((date, value))
    }

    fn nodes(&self) -> Vec<(Date, f64)> {
        self.dates
            .iter()
            .zip(self.nodes.own().space().points())
            .map(|(date, point)| (*date, point.value()))
            .collect()
    }

    fn base_curve(&self) -> Option<&Arc<FrozenCurve>> {
        match &self.nodes {
            Nodes::Outright(_) => None,
            Nodes::Spread(composite) => Some(&composite.base().0),
        }
    }
}

/// A curve whose nodes are still being solved.
///
/// ```rust
/// use pillar_core::Date;
/// use pillar_curves::prelude::*;
///
/// let base = Date::from_ymd(2025, 1, 2).unwrap();
/// let mut curve = CurveUnderConstruction::new(CurveDefinition::discount("USD", base)).unwrap();
///
/// let one_year = base.add_years(1).unwrap();
/// curve.append_or_replace_last_node(one_year, 0.97).unwrap();
/// curve.append_or_replace_last_node(one_year, 0.96).unwrap();
///
/// assert_eq!(curve.node_count(), 2);
/// assert_eq!(curve.value(one_year).unwrap(), 0.96);
/// ```
#[derive(Debug, Clone)]
pub struct CurveUnderConstruction {
    state: CurveState,
}

impl CurveUnderConstruction {
    /// Creates an outright curve from its definition.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the interpolation is not one-dimensional.
    pub fn new(definition: CurveDefinition) -> CurveResult<Self> {
        Ok(Self {
            state: CurveState::build(definition, None)?,
        })
    }

    /// Creates a spread curve over a frozen base curve.
    ///
    /// # Errors
    ///
    /// `ReferenceMismatch` if the base dates differ, `IncompatibleBase` if
    /// the time axes differ.
    pub fn over(definition: CurveDefinition, base: Arc<FrozenCurve>) -> CurveResult<Self> {
        Ok(Self {
            state: CurveState::build(definition, Some(base))?,
        })
    }

    /// Number of nodes, including a seeded base-date node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.dates.len()
    }

    /// Nodes as `(date, value)` pairs in date order. For spread curves the
    /// values are the spreads, not the composite.
    #[must_use]
    pub fn nodes(&self) -> Vec<(Date, f64)> {
        self.state.nodes()
    }

    /// The most recent node.
    #[must_use]
    pub fn last_node(&self) -> Option<(Date, f64)> {
        self.state.last_node()
    }

    /// The curve this one is a spread over.
    #[must_use]
    pub fn base_curve(&self) -> Option<&Arc<FrozenCurve>> {
        self.state.base_curve()
    }

    /// Interpolation over the time axis.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.state.nodes.own().method()
    }

    /// Places a node at `date`.
    ///
    /// If `date` equals the last node's date its value is overwritten;
    /// otherwise a new node is appended. Nodes can never be inserted
    /// before the last one.
    ///
    /// # Errors
    ///
    /// `NodeOrder` if `date` precedes the base date or the last node.
    pub fn append_or_replace_last_node(&mut self, date: Date, value: f64) -> CurveResult<()> {
        if date < self.state.base_date {
            return Err(CurveError::NodeOrder {
                date,
                last: self.state.base_date,
            });
        }
        match self.state.last_node() {
            Some((last, _)) if date == last => self.set_last_value(value),
            Some((last, _)) if date < last => Err(CurveError::NodeOrder { date, last }),
            _ => {
                trace!(curve = %self.state.name, %date, value, "append node");
                self.state.push(date, value)
            }
        }
    }

    /// Overwrites the value of the last node.
    pub fn set_last_value(&mut self, value: f64) -> CurveResult<()> {
        self.state.nodes.own_mut().set_last_value(value)?;
        Ok(())
    }

    /// Removes the last node, returning it.
    pub fn remove_last_node(&mut self) -> Option<(Date, f64)> {
        let node = self.state.last_node()?;
        self.state.nodes.own_mut().pop();
        self.state.dates.pop();
        Some(node)
    }

    /// Ends construction.
    #[must_use]
    pub fn freeze(self) -> FrozenCurve {
        FrozenCurve { state: self.state }
    }
}

/// An immutable, fully bootstrapped curve.
///
/// Frozen curves are `Send + Sync` and are shared through `Arc` when other
/// curves are built on top of them.
#[derive(Debug, Clone)]
pub struct FrozenCurve {
    state: CurveState,
}

impl FrozenCurve {
    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.dates.len()
    }

    /// Nodes as `(date, value)` pairs in date order.
    #[must_use]
    pub fn nodes(&self) -> Vec<(Date, f64)> {
        self.state.nodes()
    }

    /// The curve this one is a spread over.
    #[must_use]
    pub fn base_curve(&self) -> Option<&Arc<FrozenCurve>> {
        self.state.base_curve()
    }

    /// Interpolation over the time axis.
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMethod {
        self.state.nodes.own().method()
    }

    /// Whether values outside the node range are held flat.
    #[must_use]
    pub fn extrapolation_permitted(&self) -> bool {
        self.state.nodes.own().allows_extrapolation()
    }
}

macro_rules! impl_readable {
    ($ty:ty) => {
        impl ReadableCurve for $ty {
            fn name(&self) -> &str {
                &self.state.name
            }

            fn base_date(&self) -> Date {
                self.state.base_date
            }

            fn day_count(&self) -> DayCountConvention {
                self.state.day_count
            }

            fn value_at_time(&self, t: f64) -> CurveResult<f64> {
                Ok(self.state.nodes.value(&[t])?)
            }

            fn base_value_at_time(&self, t: f64) -> CurveResult<f64> {
                Ok(self.state.nodes.base_value(&[t])?)
            }
        }
    };
}

impl_readable!(CurveUnderConstruction);
impl_readable!(FrozenCurve);
