//! Bracketing and evaluation over a discrete grid.

use tracing::trace;

use super::{InterpolationMethod, Interpolator};
use crate::error::{MathError, MathResult};
use crate::point::{DiscreteSpace, Point};

/// Where a query coordinate falls on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bracket {
    /// On a node, or clamped onto the edge node.
    Node(f64),
    /// Strictly between two adjacent nodes.
    Between(f64, f64),
}

/// An interpolation strategy bound to a point space.
///
/// The space is 1-D for curves, 2-D for surfaces and 3-D for cubes. For
/// N > 1 the points must form a full grid around every query, i.e. every
/// corner of the bracketing cell must exist.
///
/// Outside the node range the query is clamped to the edge on that axis
/// (flat extrapolation) when extrapolation is allowed; otherwise
/// `ExtrapolationNotAllowed` is returned.
///
/// ```rust
/// use pillar_math::interpolation::{GridInterpolator, InterpolationMethod, Interpolator};
/// use pillar_math::point::{DiscreteSpace, Point};
///
/// let space = DiscreteSpace::new(vec![Point::xy(1.0, 10.0), Point::xy(2.0, 20.0)], 2).unwrap();
/// let grid = GridInterpolator::new(space, InterpolationMethod::Linear, true).unwrap();
/// assert_eq!(grid.value(&[1.5]).unwrap(), 15.0);
/// assert_eq!(grid.value(&[9.0]).unwrap(), 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridInterpolator {
    space: DiscreteSpace,
    method: InterpolationMethod,
    allow_extrapolation: bool,
    axes: Vec<Vec<f64>>,
}

impl GridInterpolator {
    /// Binds `method` to `space`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the space's arity differs from the method's.
    pub fn new(
        space: DiscreteSpace,
        method: InterpolationMethod,
        allow_extrapolation: bool,
    ) -> MathResult<Self> {
        if space.dimension() != method.dimension() {
            return Err(MathError::DimensionMismatch {
                expected: method.dimension(),
                actual: space.dimension(),
            });
        }
        let axes = (0..space.dimension()).map(|k| space.axis_values(k)).collect();
        Ok(Self {
            space,
            method,
            allow_extrapolation,
            axes,
        })
    }

    /// The underlying points.
    #[must_use]
    pub fn space(&self) -> &DiscreteSpace {
        &self.space
    }

    /// The interpolation strategy.
    #[must_use]
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Whether queries outside the node range are clamped.
    #[must_use]
    pub fn allows_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    /// Appends a point past the last one.
    pub fn push(&mut self, point: Point) -> MathResult<()> {
        self.space.push(point)?;
        self.refresh_axes();
        Ok(())
    }

    /// Overwrites the last point's value. Axes are unchanged.
    pub fn set_last_value(&mut self, value: f64) -> MathResult<()> {
        self.space.set_last_value(value)
    }

    /// Removes the last point.
    pub fn pop(&mut self) -> Option<Point> {
        let popped = self.space.pop();
        if popped.is_some() {
            self.refresh_axes();
        }
        popped
    }

    /// Minimal bracketing set for `query`, first axis varying fastest.
    ///
    /// Axes where the query lands on a node (or is clamped to one)
    /// contribute a single coordinate, so the set has `2^k` points where
    /// `k` is the number of axes with a genuine bracket.
    pub fn bounds(&self, query: &[f64]) -> MathResult<Vec<Point>> {
        if query.len() != self.space.dimension() {
            return Err(MathError::DimensionMismatch {
                expected: self.space.dimension(),
                actual: query.len(),
            });
        }

        let brackets = query
            .iter()
            .zip(&self.axes)
            .map(|(&q, axis)| self.bracket(q, axis))
            .collect::<MathResult<Vec<_>>>()?;

        let open: Vec<usize> = brackets
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Bracket::Between(..)))
            .map(|(k, _)| k)
            .collect();

        let mut bounds = Vec::with_capacity(1 << open.len());
        let mut key = vec![0.0; brackets.len()];
        for corner in 0..(1usize << open.len()) {
            for (k, bracket) in brackets.iter().enumerate() {
                key[k] = match *bracket {
                    Bracket::Node(x) => x,
                    Bracket::Between(lo, hi) => {
                        let bit = open.iter().position(|&a| a == k).unwrap_or(0);
                        if corner >> bit & 1 == 0 {
                            lo
                        } else {
                            hi
                        }
                    }
                };
            }
            let point = self.space.find(&key).ok_or_else(|| {
                MathError::invalid_space(format!("grid has no node at {key:?}"))
            })?;
            bounds.push(point.clone());
        }

        Ok(bounds)
    }

    fn bracket(&self, q: f64, axis: &[f64]) -> MathResult<Bracket> {
        let (Some(&min), Some(&max)) = (axis.first(), axis.last()) else {
            return Err(MathError::invalid_space("space has no points"));
        };

        if q.is_nan() {
            return Err(MathError::invalid_input("query coordinate is NaN"));
        }
        if q < min || q > max {
            if !self.allow_extrapolation {
                return Err(MathError::ExtrapolationNotAllowed { x: q, min, max });
            }
            let edge = if q < min { min } else { max };
            trace!(query = q, edge, "flat extrapolation");
            return Ok(Bracket::Node(edge));
        }

        match axis.binary_search_by(|v| v.total_cmp(&q)) {
            Ok(i) => Ok(Bracket::Node(axis[i])),
            Err(i) => Ok(Bracket::Between(axis[i - 1], axis[i])),
        }
    }

    fn refresh_axes(&mut self) {
        self.axes = (0..self.space.dimension())
            .map(|k| self.space.axis_values(k))
            .collect();
    }
}

impl Interpolator for GridInterpolator {
    fn value(&self, coordinates: &[f64]) -> MathResult<f64> {
        let bounds = self.bounds(coordinates)?;
        self.method.value(coordinates, &bounds)
    }

    fn dimension(&self) -> usize {
        self.space.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn curve(method: InterpolationMethod, extrapolate: bool) -> GridInterpolator {
        let space = DiscreteSpace::new(
            vec![
                Point::xy(0.0, 1.0),
                Point::xy(0.5, 0.99),
                Point::xy(1.0, 0.97),
                Point::xy(2.0, 0.93),
            ],
            method.min_points(),
        )
        .unwrap();
        GridInterpolator::new(space, method, extrapolate).unwrap()
    }

    fn surface(extrapolate: bool) -> GridInterpolator {
        let mut points = Vec::new();
        for (i, x) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            for (j, y) in [10.0, 20.0].into_iter().enumerate() {
                points.push(Point::xyz(x, y, (i * 10 + j) as f64));
            }
        }
        let space = DiscreteSpace::new(points, 4).unwrap();
        GridInterpolator::new(space, InterpolationMethod::Bilinear, extrapolate).unwrap()
    }

    #[test]
    fn test_exact_nodes() {
        for method in [
            InterpolationMethod::Linear,
            InterpolationMethod::LogLinear,
            InterpolationMethod::LinearRate,
        ] {
            let grid = curve(method, false);
            for p in grid.space().points() {
                assert_eq!(grid.value(p.independent()).unwrap(), p.value());
            }
        }
    }

    #[test]
    fn test_linear_between_nodes() {
        let grid = curve(InterpolationMethod::Linear, false);
        assert_relative_eq!(grid.value(&[1.5]).unwrap(), 0.95, epsilon = 1e-12);
        assert_eq!(grid.bounds(&[1.5]).unwrap().len(), 2);
        assert_eq!(grid.bounds(&[1.0]).unwrap().len(), 1);
    }

    #[test]
    fn test_flat_extrapolation() {
        let grid = curve(InterpolationMethod::Linear, true);
        assert_eq!(grid.value(&[-1.0]).unwrap(), 1.0);
        assert_eq!(grid.value(&[10.0]).unwrap(), 0.93);
    }

    #[test]
    fn test_extrapolation_not_allowed() {
        let grid = curve(InterpolationMethod::Linear, false);
        let err = grid.value(&[2.5]).unwrap_err();
        assert_eq!(
            err,
            MathError::ExtrapolationNotAllowed {
                x: 2.5,
                min: 0.0,
                max: 2.0
            }
        );
    }

    #[test]
    fn test_single_node_is_constant() {
        let space = DiscreteSpace::new(vec![Point::xy(0.0, 1.0)], 1).unwrap();
        let grid = GridInterpolator::new(space, InterpolationMethod::LogLinear, true).unwrap();
        assert_eq!(grid.value(&[0.0]).unwrap(), 1.0);
        assert_eq!(grid.value(&[5.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_empty_grid() {
        let mut grid =
            GridInterpolator::new(DiscreteSpace::empty(1), InterpolationMethod::Linear, true).unwrap();
        assert!(matches!(grid.value(&[1.0]), Err(MathError::InvalidSpace { .. })));
        grid.push(Point::xy(1.0, 0.25)).unwrap();
        assert_eq!(grid.value(&[0.0]).unwrap(), 0.25);
    }

    #[test]
    fn test_push_and_pop_keep_axes() {
        let mut grid = curve(InterpolationMethod::Linear, false);
        assert!(grid.value(&[3.0]).is_err());
        grid.push(Point::xy(3.0, 0.9)).unwrap();
        assert_relative_eq!(grid.value(&[2.5]).unwrap(), 0.915, epsilon = 1e-12);
        grid.set_last_value(0.8).unwrap();
        assert_relative_eq!(grid.value(&[3.0]).unwrap(), 0.8);
        assert!(grid.pop().is_some());
        assert!(grid.value(&[2.5]).is_err());
    }

    #[test]
    fn test_surface_interior_and_edges() {
        let grid = surface(true);
        // Bilinear inside the (1..2, 10..20) cell: corners 0, 1, 10, 11.
        assert_relative_eq!(grid.value(&[1.5, 15.0]).unwrap(), 5.5, epsilon = 1e-12);
        // On the x = 2 column: degrades to linear in y.
        assert_eq!(grid.bounds(&[2.0, 12.0]).unwrap().len(), 2);
        assert_relative_eq!(grid.value(&[2.0, 12.0]).unwrap(), 10.2, epsilon = 1e-12);
        // Clamped in y, interpolated in x.
        assert_relative_eq!(grid.value(&[2.5, 50.0]).unwrap(), 16.0, epsilon = 1e-12);
        // Clamped in both.
        assert_eq!(grid.value(&[0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_surface_bounds_order() {
        let grid = surface(false);
        let keys: Vec<Vec<f64>> = grid
            .bounds(&[1.5, 15.0])
            .unwrap()
            .iter()
            .map(|p| p.independent().to_vec())
            .collect();
        assert_eq!(
            keys,
            vec![vec![1.0, 10.0], vec![2.0, 10.0], vec![1.0, 20.0], vec![2.0, 20.0]]
        );
    }

    #[test]
    fn test_incomplete_grid() {
        let space = DiscreteSpace::new(
            vec![
                Point::xyz(1.0, 10.0, 1.0),
                Point::xyz(2.0, 10.0, 2.0),
                Point::xyz(1.0, 20.0, 3.0),
                Point::xyz(3.0, 20.0, 4.0),
            ],
            4,
        )
        .unwrap();
        let grid = GridInterpolator::new(space, InterpolationMethod::Bilinear, false).unwrap();
        assert!(matches!(
            grid.value(&[1.5, 15.0]),
            Err(MathError::InvalidSpace { .. })
        ));
    }

    #[test]
    fn test_dimension_checks() {
        let grid = curve(InterpolationMethod::Linear, false);
        assert!(matches!(
            grid.value(&[1.0, 2.0]),
            Err(MathError::DimensionMismatch { .. })
        ));

        let space = DiscreteSpace::new(vec![Point::xy(0.0, 1.0), Point::xy(1.0, 2.0)], 2).unwrap();
        assert!(GridInterpolator::new(space, InterpolationMethod::Bilinear, false).is_err());
    }

    proptest! {
        #[test]
        fn prop_nodes_are_reproduced(
            values in prop::collection::vec(0.01f64..5.0, 2..12),
        ) {
            let points: Vec<Point> = values
                .iter()
                .enumerate()
                .map(|(i, v)| Point::xy(i as f64 * 0.25, *v))
                .collect();
            for method in [
                InterpolationMethod::Linear,
                InterpolationMethod::LogLinear,
                InterpolationMethod::LinearRate,
            ] {
                let space = DiscreteSpace::new(points.clone(), 2).unwrap();
                let grid = GridInterpolator::new(space, method, false).unwrap();
                for p in &points {
                    prop_assert_eq!(grid.value(p.independent()).unwrap(), p.value());
                }
            }
        }

        #[test]
        fn prop_linear_stays_within_neighbours(
            values in prop::collection::vec(-5.0f64..5.0, 2..12),
            t in 0.0f64..1.0,
        ) {
            let points: Vec<Point> = values
                .iter()
                .enumerate()
                .map(|(i, v)| Point::xy(i as f64, *v))
                .collect();
            let space = DiscreteSpace::new(points, 2).unwrap();
            let grid = GridInterpolator::new(space, InterpolationMethod::Linear, false).unwrap();
            let x = t * (values.len() - 1) as f64;
            let i = (x.floor() as usize).min(values.len() - 2);
            let lo = values[i].min(values[i + 1]);
            let hi = values[i].max(values[i + 1]);
            let v = grid.value(&[x]).unwrap();
            prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
        }
    }
}
