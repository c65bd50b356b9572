//! Brent's root-finding algorithm.

use tracing::trace;

use super::{ObjectiveFunction, SolverConfig, SolverResult};
use crate::error::{MathError, MathResult};

/// Bracket growth factor used by [`Brent::solve_with_step`].
const GOLDEN_RATIO: f64 = 1.618;

/// Brent's method with optional hard limits on the search domain.
///
/// The hard limits only constrain bracket expansion in
/// [`Brent::solve_with_step`]; for [`Brent::solve`] they validate the
/// supplied bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Brent {
    config: SolverConfig,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
}

/// Mutable bracket state: `b` is the best estimate, `a` the previous
/// estimate, `c` the contrapoint with `f(c)` opposite in sign to `f(b)`.
struct State {
    a: f64,
    fa: f64,
    b: f64,
    fb: f64,
    c: f64,
    fc: f64,
    evaluations: u32,
}

impl Brent {
    /// Creates a solver with the given configuration.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            lower_limit: None,
            upper_limit: None,
        }
    }

    /// Forbids trial values below `limit`.
    #[must_use]
    pub fn with_lower_limit(mut self, limit: f64) -> Self {
        self.lower_limit = Some(limit);
        self
    }

    /// Forbids trial values above `limit`.
    #[must_use]
    pub fn with_upper_limit(mut self, limit: f64) -> Self {
        self.upper_limit = Some(limit);
        self
    }

    /// The solver configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Finds a root inside `[lower, upper]`.
    ///
    /// An endpoint whose objective is already within tolerance is returned
    /// directly. A `guess` strictly inside the bracket is evaluated first
    /// and used to narrow it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `lower >= upper`, the bracket breaks a hard
    ///   limit, or `guess` lies outside the bracket
    /// - `NoBracket` if the objective has the same sign at both ends
    /// - `MaxIterationsExceeded` once the evaluation cap is reached
    /// - any error raised by the objective itself
    pub fn solve<O>(
        &self,
        objective: &mut O,
        guess: f64,
        lower: f64,
        upper: f64,
    ) -> Result<SolverResult, O::Error>
    where
        O: ObjectiveFunction + ?Sized,
    {
        self.check_bracket(guess, lower, upper)?;
        let tol = self.config.tolerance;

        let f_lower = objective.value(lower)?;
        if f_lower.abs() < tol {
            return Ok(done(lower, f_lower, 1));
        }
        let f_upper = objective.value(upper)?;
        if f_upper.abs() < tol {
            return Ok(done(upper, f_upper, 2));
        }
        if !(f_lower * f_upper < 0.0) {
            return Err(MathError::NoBracket {
                lower,
                upper,
                f_lower,
                f_upper,
            }
            .into());
        }

        let mut state = State {
            a: lower,
            fa: f_lower,
            b: upper,
            fb: f_upper,
            c: upper,
            fc: f_upper,
            evaluations: 2,
        };

        if guess > lower && guess < upper {
            let f_guess = objective.value(guess)?;
            state.evaluations += 1;
            if f_guess.abs() < tol {
                return Ok(done(guess, f_guess, state.evaluations));
            }
            if f_guess * f_lower < 0.0 {
                (state.b, state.fb) = (guess, f_guess);
            } else {
                (state.a, state.fa) = (guess, f_guess);
            }
            (state.c, state.fc) = (state.b, state.fb);
        }

        self.refine(objective, state)
    }

    /// Finds a root by growing a bracket outward from `guess`.
    ///
    /// The first step is `step` in the direction that should reduce the
    /// objective for an increasing function; the bracket then expands by
    /// the golden ratio on the side with the smaller residual until the
    /// sign changes. Hard limits clamp every trial value; once both ends
    /// sit on their limits without a sign change the search stops.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a non-positive step or a non-finite guess
    /// - `NoBracket` if the bracket reaches both hard limits without a
    ///   sign change
    /// - `MaxIterationsExceeded` once the evaluation cap is reached
    pub fn solve_with_step<O>(
        &self,
        objective: &mut O,
        guess: f64,
        step: f64,
    ) -> Result<SolverResult, O::Error>
    where
        O: ObjectiveFunction + ?Sized,
    {
        if !(step > 0.0) || !guess.is_finite() {
            return Err(MathError::invalid_input(format!(
                "step must be positive and guess finite, got step {step}, guess {guess}"
            ))
            .into());
        }
        let tol = self.config.tolerance;

        let f_guess = objective.value(guess)?;
        if f_guess.abs() <= tol {
            return Ok(done(guess, f_guess, 1));
        }

        // Step down from a positive residual first, or the other way when
        // a hard limit leaves no room.
        let down = f_guess > 0.0;
        let toward = |dir: bool| self.clamp(if dir { guess - step } else { guess + step });
        let mut first = toward(down);
        if first == guess {
            first = toward(!down);
        }
        let f_first = objective.value(first)?;
        let (mut lo, mut f_lo, mut hi, mut f_hi) = if first < guess {
            (first, f_first, guess, f_guess)
        } else {
            (guess, f_guess, first, f_first)
        };

        let mut evaluations = 2;
        let mut expand_low_next = true;
        while evaluations <= self.config.max_iterations {
            if f_lo * f_hi <= 0.0 {
                if f_lo == 0.0 {
                    return Ok(done(lo, f_lo, evaluations));
                }
                if f_hi == 0.0 {
                    return Ok(done(hi, f_hi, evaluations));
                }
                let state = State {
                    a: lo,
                    fa: f_lo,
                    b: hi,
                    fb: f_hi,
                    c: hi,
                    fc: f_hi,
                    evaluations,
                };
                return self.refine(objective, state);
            }

            let lo_pinned = self.lower_limit == Some(lo);
            let hi_pinned = self.upper_limit == Some(hi);
            if lo_pinned && hi_pinned {
                return Err(MathError::NoBracket {
                    lower: lo,
                    upper: hi,
                    f_lower: f_lo,
                    f_upper: f_hi,
                }
                .into());
            }

            let grow_low = if lo_pinned {
                false
            } else if hi_pinned {
                true
            } else {
                match f_lo.abs().partial_cmp(&f_hi.abs()) {
                    Some(std::cmp::Ordering::Less) => true,
                    Some(std::cmp::Ordering::Greater) => false,
                    _ => {
                        expand_low_next = !expand_low_next;
                        !expand_low_next
                    }
                }
            };

            if grow_low {
                lo = self.clamp(lo + GOLDEN_RATIO * (lo - hi));
                f_lo = objective.value(lo)?;
            } else {
                hi = self.clamp(hi + GOLDEN_RATIO * (hi - lo));
                f_hi = objective.value(hi)?;
            }
            evaluations += 1;
            trace!(lo, hi, f_lo, f_hi, evaluations, "expanding bracket");
        }

        let residual = f_lo.abs().min(f_hi.abs());
        Err(MathError::max_iterations(evaluations, residual).into())
    }

    fn check_bracket(&self, guess: f64, lower: f64, upper: f64) -> MathResult<()> {
        if !(lower < upper) {
            return Err(MathError::invalid_input(format!(
                "bracket lower bound ({lower}) must be below upper bound ({upper})"
            )));
        }
        if let Some(limit) = self.lower_limit.filter(|&l| lower < l) {
            return Err(MathError::invalid_input(format!(
                "bracket lower bound ({lower}) is below the hard limit ({limit})"
            )));
        }
        if let Some(limit) = self.upper_limit.filter(|&u| upper > u) {
            return Err(MathError::invalid_input(format!(
                "bracket upper bound ({upper}) is above the hard limit ({limit})"
            )));
        }
        if !(guess >= lower && guess <= upper) {
            return Err(MathError::invalid_input(format!(
                "guess ({guess}) is outside the bracket [{lower}, {upper}]"
            )));
        }
        Ok(())
    }

    fn clamp(&self, x: f64) -> f64 {
        match (self.lower_limit, self.upper_limit) {
            (Some(l), _) if x < l => l,
            (_, Some(u)) if x > u => u,
            _ => x,
        }
    }

    #[allow(clippy::many_single_char_names)]
    fn refine<O>(&self, objective: &mut O, mut s: State) -> Result<SolverResult, O::Error>
    where
        O: ObjectiveFunction + ?Sized,
    {
        let tol = self.config.tolerance;
        let mut d = 0.0_f64;
        let mut e = 0.0_f64;

        while s.evaluations < self.config.max_iterations {
            if (s.fb > 0.0 && s.fc > 0.0) || (s.fb < 0.0 && s.fc < 0.0) {
                s.c = s.a;
                s.fc = s.fa;
                d = s.b - s.a;
                e = d;
            }
            if s.fc.abs() < s.fb.abs() {
                s.a = s.b;
                s.b = s.c;
                s.c = s.a;
                s.fa = s.fb;
                s.fb = s.fc;
                s.fc = s.fa;
            }

            let tol1 = 2.0 * f64::EPSILON * s.b.abs() + 0.5 * tol;
            let xm = 0.5 * (s.c - s.b);
            if xm.abs() <= tol1 || s.fb.abs() < tol {
                return Ok(done(s.b, s.fb, s.evaluations));
            }

            if e.abs() >= tol1 && s.fa.abs() > s.fb.abs() {
                let r3 = s.fb / s.fa;
                let (mut p, mut q);
                if s.a == s.c {
                    p = 2.0 * xm * r3;
                    q = 1.0 - r3;
                } else {
                    let r1 = s.fa / s.fc;
                    let r2 = s.fb / s.fc;
                    p = r3 * (2.0 * xm * r1 * (r1 - r2) - (s.b - s.a) * (r2 - 1.0));
                    q = (r1 - 1.0) * (r2 - 1.0) * (r3 - 1.0);
                }
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * xm * q - (tol1 * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }

            s.a = s.b;
            s.fa = s.fb;
            s.b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
            s.fb = objective.value(s.b)?;
            s.evaluations += 1;

            if s.fb.is_nan() {
                return Err(MathError::invalid_input(format!(
                    "objective is undefined at {}",
                    s.b
                ))
                .into());
            }
            trace!(x = s.b, f = s.fb, evaluations = s.evaluations, "brent step");
        }

        Err(MathError::max_iterations(s.evaluations, s.fb.abs()).into())
    }
}

fn done(root: f64, residual: f64, iterations: u32) -> SolverResult {
    SolverResult {
        root,
        iterations,
        residual,
    }
}

/// Brent's method over a closure, bracketed by `[a, b]`.
///
/// ```rust
/// use pillar_math::solvers::{brent, SolverConfig};
///
/// let f = |x: f64| x * x * x - x - 2.0;
/// let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
/// assert!(f(result.root).abs() < 1e-10);
/// ```
pub fn brent<F>(mut f: F, a: f64, b: f64, config: &SolverConfig) -> MathResult<SolverResult>
where
    F: FnMut(f64) -> f64,
{
    Brent::new(*config).solve(&mut f, b, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sqrt_2() {
        let result = brent(|x| x * x - 2.0, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn test_cubic() {
        let f = |x: f64| x * x * x - x - 2.0;
        let result = brent(f, 1.0, 2.0, &SolverConfig::default()).unwrap();
        assert!(f(result.root).abs() < 1e-10);
        assert_relative_eq!(result.root, 1.521_379_706_804_568, epsilon = 1e-9);
    }

    #[test]
    fn test_sin() {
        let result = brent(f64::sin, 3.0, 4.0, &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.root, std::f64::consts::PI, epsilon = 1e-10);
    }

    #[test]
    fn test_no_bracket() {
        let err = brent(|x| x * x - 2.0, 2.0, 3.0, &SolverConfig::default()).unwrap_err();
        match err {
            MathError::NoBracket {
                lower,
                upper,
                f_lower,
                f_upper,
            } => {
                assert_eq!((lower, upper), (2.0, 3.0));
                assert_eq!((f_lower, f_upper), (2.0, 7.0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_endpoint_within_tolerance_is_returned() {
        let mut calls = 0;
        let mut f = |x: f64| {
            calls += 1;
            x - 1.0
        };
        let result = Brent::new(SolverConfig::default())
            .solve(&mut f, 1.5, 1.0, 2.0)
            .unwrap();
        assert_eq!(result.root, 1.0);
        assert_eq!(result.iterations, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_invalid_bracket_and_guess() {
        let solver = Brent::new(SolverConfig::default());
        let mut f = |x: f64| x;
        assert!(matches!(
            solver.solve(&mut f, 0.0, 1.0, -1.0),
            Err(MathError::InvalidInput { .. })
        ));
        assert!(matches!(
            solver.solve(&mut f, 5.0, -1.0, 1.0),
            Err(MathError::InvalidInput { .. })
        ));

        let limited = solver.with_lower_limit(0.0);
        assert!(limited.solve(&mut f, 0.5, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_guess_inside_bracket_is_evaluated() {
        let mut calls = 0;
        let mut f = |x: f64| {
            calls += 1;
            x.exp() - 2.0
        };
        let result = Brent::new(SolverConfig::default())
            .solve(&mut f, 0.7, -10.0, 10.0)
            .unwrap();
        assert_relative_eq!(result.root, 2.0_f64.ln(), epsilon = 1e-10);
        // Both endpoints, the guess, then the refinement steps.
        assert!(result.iterations > 3);
        assert_eq!(result.iterations, calls);
    }

    #[test]
    fn test_guess_on_root() {
        let mut f = |x: f64| x - 0.5;
        let result = Brent::new(SolverConfig::default())
            .solve(&mut f, 0.5, 0.0, 1.0)
            .unwrap();
        assert_eq!(result.root, 0.5);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let config = SolverConfig::new(1e-300, 5);
        let err = brent(|x| x.powi(3) - 0.3, 0.0, 1.0, &config).unwrap_err();
        assert!(matches!(err, MathError::MaxIterationsExceeded { iterations: 5, .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_solve_with_step() {
        let solver = Brent::new(SolverConfig::default());
        let mut f = |x: f64| x * x * x - 27.0;
        let result = solver.solve_with_step(&mut f, 0.5, 0.1).unwrap();
        assert_relative_eq!(result.root, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solve_with_step_decreasing() {
        let solver = Brent::new(SolverConfig::default());
        let mut f = |x: f64| 1.0 - x;
        let result = solver.solve_with_step(&mut f, -4.0, 0.5).unwrap();
        assert_relative_eq!(result.root, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solve_with_step_respects_limits() {
        let solver = Brent::new(SolverConfig::default().with_max_iterations(30)).with_upper_limit(2.0);
        let mut f = |x: f64| x - 5.0;
        let err = solver.solve_with_step(&mut f, 0.0, 0.1).unwrap_err();
        assert!(matches!(err, MathError::MaxIterationsExceeded { .. }));
    }

    #[test]
    fn test_solve_with_step_between_limits() {
        let solver = Brent::new(SolverConfig::default())
            .with_lower_limit(0.0)
            .with_upper_limit(2.0);

        // Guess on the lower limit: the first step goes up instead.
        let mut f = |x: f64| 1.5 - x;
        let result = solver.solve_with_step(&mut f, 0.0, 0.1).unwrap();
        assert_relative_eq!(result.root, 1.5, epsilon = 1e-9);

        let mut f = |x: f64| x - 5.0;
        let err = solver.solve_with_step(&mut f, 1.0, 0.1).unwrap_err();
        assert_eq!(
            err,
            MathError::NoBracket {
                lower: 0.0,
                upper: 2.0,
                f_lower: -5.0,
                f_upper: -3.0
            }
        );
    }

    #[derive(Debug)]
    enum PricingError {
        Math(MathError),
        Undefined,
    }

    impl From<MathError> for PricingError {
        fn from(e: MathError) -> Self {
            PricingError::Math(e)
        }
    }

    struct Fallible;

    impl ObjectiveFunction for Fallible {
        type Error = PricingError;

        fn value(&mut self, x: f64) -> Result<f64, PricingError> {
            if x < 0.0 {
                Err(PricingError::Undefined)
            } else {
                Ok(x - 0.25)
            }
        }
    }

    #[test]
    fn test_custom_objective_errors() {
        let solver = Brent::new(SolverConfig::default());
        let result = solver.solve(&mut Fallible, 0.5, 0.0, 1.0).unwrap();
        assert_relative_eq!(result.root, 0.25, epsilon = 1e-10);

        assert!(matches!(
            solver.solve(&mut Fallible, 0.5, -1.0, 1.0),
            Err(PricingError::Undefined)
        ));
        assert!(matches!(
            solver.solve(&mut Fallible, 2.0, 1.0, 3.0),
            Err(PricingError::Math(MathError::NoBracket { .. }))
        ));
    }

    proptest! {
        #[test]
        fn prop_converges_on_monotone_functions(
            root in -5.0f64..5.0,
            slope in 0.1f64..10.0,
            curvature in 0.0f64..1.0,
        ) {
            let f = |x: f64| slope * (x - root) + curvature * (x - root).powi(3);
            let result = brent(f, -10.0, 10.0, &SolverConfig::default()).unwrap();
            prop_assert!(result.iterations <= 100);
            prop_assert!((result.root - root).abs() < 1e-8);
        }
    }
}
