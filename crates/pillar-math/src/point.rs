//! Points and discrete point spaces.
//!
//! A [`Point`] is an ordered coordinate tuple whose last entry is the
//! dependent value; every earlier entry is an independent axis (time,
//! strike, tenor, ...). A [`DiscreteSpace`] is a set of points with the
//! same arity, unique by their independent coordinates and kept sorted
//! lexicographically on them.

use std::cmp::Ordering;

use crate::error::{MathError, MathResult};

/// An immutable N-dimensional point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    coordinates: Vec<f64>,
}

impl Point {
    /// Creates a point from its full coordinate tuple.
    ///
    /// Needs at least one coordinate (the value). Independent coordinates
    /// must be finite.
    pub fn new(coordinates: Vec<f64>) -> MathResult<Self> {
        let Some((_, independent)) = coordinates.split_last() else {
            return Err(MathError::invalid_input("a point needs at least one coordinate"));
        };
        if let Some(bad) = independent.iter().find(|c| !c.is_finite()) {
            return Err(MathError::invalid_input(format!(
                "independent coordinate {bad} is not finite"
            )));
        }
        Ok(Self { coordinates })
    }

    /// Creates a curve point `(x, value)`.
    #[must_use]
    pub fn xy(x: f64, value: f64) -> Self {
        Self {
            coordinates: vec![x, value],
        }
    }

    /// Creates a surface point `(x, y, value)`.
    #[must_use]
    pub fn xyz(x: f64, y: f64, value: f64) -> Self {
        Self {
            coordinates: vec![x, y, value],
        }
    }

    /// Full coordinate tuple, value last.
    #[must_use]
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Independent coordinates only.
    #[must_use]
    pub fn independent(&self) -> &[f64] {
        &self.coordinates[..self.coordinates.len() - 1]
    }

    /// Number of independent axes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.coordinates.len() - 1
    }

    /// The dependent value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.coordinates[self.coordinates.len() - 1]
    }

    /// Returns a copy of this point carrying a different value.
    #[must_use]
    pub fn with_value(&self, value: f64) -> Self {
        let mut coordinates = self.coordinates.clone();
        let last = coordinates.len() - 1;
        coordinates[last] = value;
        Self { coordinates }
    }
}

/// Lexicographic order over independent coordinates.
pub(crate) fn compare_keys(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// A sorted set of points sharing one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteSpace {
    points: Vec<Point>,
    dimension: usize,
}

impl DiscreteSpace {
    /// Builds a space from points in any order.
    ///
    /// # Errors
    ///
    /// - `InvalidSpace` if fewer than `min_points` points are given, or two
    ///   points share the same independent coordinates
    /// - `DimensionMismatch` if the points do not all have the same arity
    pub fn new(mut points: Vec<Point>, min_points: usize) -> MathResult<Self> {
        let required = min_points.max(1);
        if points.len() < required {
            return Err(MathError::insufficient_points(required, points.len()));
        }

        let dimension = points[0].dimension();
        if let Some(odd) = points.iter().find(|p| p.dimension() != dimension) {
            return Err(MathError::DimensionMismatch {
                expected: dimension,
                actual: odd.dimension(),
            });
        }

        points.sort_by(|a, b| compare_keys(a.independent(), b.independent()));

        if let Some(pair) = points
            .windows(2)
            .find(|w| compare_keys(w[0].independent(), w[1].independent()).is_eq())
        {
            return Err(MathError::invalid_space(format!(
                "duplicate point at {:?}",
                pair[0].independent()
            )));
        }

        Ok(Self { points, dimension })
    }

    /// An empty space of the given dimension, to be filled with [`push`].
    ///
    /// [`push`]: DiscreteSpace::push
    #[must_use]
    pub fn empty(dimension: usize) -> Self {
        Self {
            points: Vec::new(),
            dimension,
        }
    }

    /// Points in sorted order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of independent axes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the space holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last point in sort order.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    /// Looks up the point with exactly these independent coordinates.
    #[must_use]
    pub fn find(&self, independent: &[f64]) -> Option<&Point> {
        self.points
            .binary_search_by(|p| compare_keys(p.independent(), independent))
            .ok()
            .map(|i| &self.points[i])
    }

    /// Sorted distinct values taken along one axis.
    #[must_use]
    pub fn axis_values(&self, axis: usize) -> Vec<f64> {
        let mut values: Vec<f64> = self.points.iter().map(|p| p.independent()[axis]).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values
    }

    /// Appends a point that sorts strictly after every existing point.
    ///
    /// Earlier points can never be inserted once later ones exist.
    pub fn push(&mut self, point: Point) -> MathResult<()> {
        if point.dimension() != self.dimension {
            return Err(MathError::DimensionMismatch {
                expected: self.dimension,
                actual: point.dimension(),
            });
        }
        if let Some(last) = self.points.last() {
            if compare_keys(point.independent(), last.independent()).is_le() {
                return Err(MathError::invalid_space(format!(
                    "point {:?} does not sort after last point {:?}",
                    point.independent(),
                    last.independent()
                )));
            }
        }
        self.points.push(point);
        Ok(())
    }

    /// Overwrites the value of the last point.
    pub fn set_last_value(&mut self, value: f64) -> MathResult<()> {
        let last = self
            .points
            .last_mut()
            .ok_or_else(|| MathError::invalid_space("space has no points"))?;
        *last = last.with_value(value);
        Ok(())
    }

    /// Removes and returns the last point.
    pub fn pop(&mut self) -> Option<Point> {
        self.points.pop()
    }
}
