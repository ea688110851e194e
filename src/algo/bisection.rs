//! Bisection method.
//!
//! [Bisection](https://en.wikipedia.org/wiki/Bisection_method) repeatedly
//! halves an interval and keeps the half in which the residual changes its
//! sign. It is slow (one bit of precision per iteration) but it never leaves
//! the interval and needs nothing but residual evaluations.
//!
//! The interval is taken from the [domain](crate::Domain) of the system.
//!
//! **Important:** Only one-dimensional systems with bounded domain are
//! supported.
//!
//! # References
//!
//! \[1\] [Wikipedia](https://en.wikipedia.org/wiki/Bisection_method)

use std::marker::PhantomData;

use getset::{CopyGetters, Setters};
use log::debug;
use nalgebra::{
    convert, storage::StorageMut, try_convert, ComplexField, Dyn, IsContiguous, RealField, Vector,
};
use thiserror::Error;

use crate::core::{Domain, Problem, Solver, System, SystemError};

/// How the initial interval is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BracketMode {
    /// Residuals at both bounds are evaluated before the first step. They must
    /// have opposite signs, otherwise [`BisectionError::NoBracketingRoot`] is
    /// returned. The interval is narrowed towards the bound whose residual
    /// sign differs from the midpoint's, so both increasing and decreasing
    /// residuals are handled.
    ///
    /// A residual that cannot be evaluated at a bound (for example a square
    /// root of a negative value) fails the whole solve, even if the interval
    /// contains a root. Narrow the domain to where the residual is defined.
    SignChange,
    /// The bounds are never evaluated. A positive residual in the midpoint
    /// moves the upper bound, anything else moves the lower bound. This is
    /// only meaningful for residuals increasing over the interval; otherwise
    /// the iterates are arbitrary.
    Legacy,
}

/// Options for [`Bisection`] solver.
#[derive(Debug, Clone, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct BisectionOptions<P: Problem> {
    /// Treatment of the initial interval. Default: sign change (see
    /// [`BracketMode`]).
    mode: BracketMode,
    /// Residual magnitude under which a bound of the interval is accepted as
    /// a root during the bracket check. Default: `1e-6`.
    tolerance: P::Field,
    #[getset(skip)]
    _phantom: PhantomData<P::Field>,
}

impl<P: Problem> Default for BisectionOptions<P> {
    fn default() -> Self {
        Self {
            mode: BracketMode::SignChange,
            tolerance: convert(1e-6),
            _phantom: PhantomData,
        }
    }
}

/// Bisection solver. See [module](self) documentation for more details.
pub struct Bisection<P: Problem> {
    options: BisectionOptions<P>,
    state: Option<State<P::Field>>,
}

#[derive(Debug, Clone, Copy)]
enum State<T> {
    Bracket { lower: T, upper: T, lower_sign: bool },
    Root(T),
}

impl<P: Problem> Bisection<P> {
    /// Initializes bisection solver with default options.
    pub fn new(p: &P, dom: &Domain<P::Field>) -> Self {
        Self::with_options(p, dom, BisectionOptions::default())
    }

    /// Initializes bisection solver with given options.
    pub fn with_options(_p: &P, _dom: &Domain<P::Field>, options: BisectionOptions<P>) -> Self {
        Self {
            options,
            state: None,
        }
    }

    /// Resets the internal state of the solver.
    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Returns the current interval, if the solver is bracketing a root.
    pub fn bracket(&self) -> Option<(P::Field, P::Field)> {
        match self.state {
            Some(State::Bracket { lower, upper, .. }) => Some((lower, upper)),
            _ => None,
        }
    }
}

/// Error returned from [`Bisection`] solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BisectionError {
    /// System is not one-dimensional.
    #[error("system is not one-dimensional")]
    InvalidDimensionality,
    /// The domain of the system has an infinite bound.
    #[error("domain is not bounded")]
    UnboundedDomain,
    /// Residuals at the bounds of the interval have the same sign.
    #[error("residual has the same sign at {lower} and {upper}")]
    NoBracketingRoot {
        /// Lower bound of the interval.
        lower: f64,
        /// Upper bound of the interval.
        upper: f64,
    },
    /// Evaluation of the system failed.
    #[error("{0}")]
    System(#[from] SystemError),
}

impl<R: System> Solver<R> for Bisection<R> {
    const NAME: &'static str = "Bisection";

    type Error = BisectionError;

    fn solve_next<Sx, Srx>(
        &mut self,
        r: &R,
        dom: &Domain<R::Field>,
        x: &mut Vector<R::Field, Dyn, Sx>,
        rx: &mut Vector<R::Field, Dyn, Srx>,
    ) -> Result<(), Self::Error>
    where
        Sx: StorageMut<R::Field, Dyn> + IsContiguous,
        Srx: StorageMut<R::Field, Dyn>,
    {
        if dom.dim() != 1 || x.nrows() != 1 {
            return Err(BisectionError::InvalidDimensionality);
        }

        if !dom.is_bounded() {
            return Err(BisectionError::UnboundedDomain);
        }

        let BisectionOptions {
            mode, tolerance, ..
        } = self.options;

        let state = match self.state {
            Some(state) => state,
            None => init(r, dom, x, rx, mode, tolerance)?,
        };
        self.state = Some(state);

        let (mut lower, mut upper, lower_sign) = match state {
            State::Bracket {
                lower,
                upper,
                lower_sign,
            } => (lower, upper, lower_sign),
            State::Root(root) => {
                x[0] = root;
                eval_checked(r, x, rx)?;
                return Ok(());
            }
        };

        let mid = (lower + upper) * convert(0.5);
        x[0] = mid;
        let r_mid = eval_checked(r, x, rx)?;

        let move_lower = match mode {
            BracketMode::SignChange => is_positive(r_mid) == lower_sign,
            BracketMode::Legacy => !is_positive(r_mid),
        };

        if move_lower {
            lower = mid;
        } else {
            upper = mid;
        }

        debug!(
            "bisection: r({}) = {}, bracket = [{}, {}]",
            mid, r_mid, lower, upper
        );

        self.state = Some(State::Bracket {
            lower,
            upper,
            lower_sign,
        });

        Ok(())
    }
}

fn init<R, Sx, Srx>(
    r: &R,
    dom: &Domain<R::Field>,
    x: &mut Vector<R::Field, Dyn, Sx>,
    rx: &mut Vector<R::Field, Dyn, Srx>,
    mode: BracketMode,
    tolerance: R::Field,
) -> Result<State<R::Field>, BisectionError>
where
    R: System,
    Sx: StorageMut<R::Field, Dyn> + IsContiguous,
    Srx: StorageMut<R::Field, Dyn>,
{
    let lower = dom.lower()[0];
    let upper = dom.upper()[0];

    if mode == BracketMode::Legacy {
        return Ok(State::Bracket {
            lower,
            upper,
            lower_sign: false,
        });
    }

    x[0] = lower;
    let r_lower = eval_checked(r, x, rx)?;
    if is_root(r_lower, tolerance) {
        debug!("bisection: lower bound {} is a root", lower);
        return Ok(State::Root(lower));
    }

    x[0] = upper;
    let r_upper = eval_checked(r, x, rx)?;
    if is_root(r_upper, tolerance) {
        debug!("bisection: upper bound {} is a root", upper);
        return Ok(State::Root(upper));
    }

    let lower_sign = is_positive(r_lower);
    if lower_sign == is_positive(r_upper) {
        return Err(BisectionError::NoBracketingRoot {
            lower: try_convert(lower).unwrap_or(f64::NAN),
            upper: try_convert(upper).unwrap_or(f64::NAN),
        });
    }

    Ok(State::Bracket {
        lower,
        upper,
        lower_sign,
    })
}

fn eval_checked<R, Sx, Srx>(
    r: &R,
    x: &Vector<R::Field, Dyn, Sx>,
    rx: &mut Vector<R::Field, Dyn, Srx>,
) -> Result<R::Field, SystemError>
where
    R: System,
    Sx: StorageMut<R::Field, Dyn> + IsContiguous,
    Srx: StorageMut<R::Field, Dyn>,
{
    r.eval(x, rx)?;
    let value = rx[0];

    if value.is_finite() {
        Ok(value)
    } else {
        Err(SystemError::InvalidValue)
    }
}

fn is_positive<T: RealField + Copy>(value: T) -> bool {
    value > T::zero()
}

fn is_root<T: RealField + Copy>(value: T, tolerance: T) -> bool {
    value == T::zero() || value.abs() < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::*;

    use approx::assert_abs_diff_eq;
    use nalgebra::dvector;

    #[test]
    fn increasing_linear() {
        let r = Linear::new(2.0, -7.0);
        let dom = r.domain();
        let solver = Bisection::new(&r, &dom);

        let root = solve(&r, &dom, solver, 100, 1e-10).unwrap();
        assert_abs_diff_eq!(root, 3.5, epsilon = 1e-9);
    }

    #[test]
    fn decreasing_linear() {
        let r = Linear::new(-0.5, 12.0);
        let dom = r.domain();
        let solver = Bisection::new(&r, &dom);

        let root = solve(&r, &dom, solver, 100, 1e-10).unwrap();
        assert_abs_diff_eq!(root, 24.0, epsilon = 1e-9);
    }

    #[test]
    fn cubic() {
        let r = Cubic::new(27.0);
        let dom = r.domain();
        let solver = Bisection::new(&r, &dom);

        let root = solve(&r, &dom, solver, 200, 1e-10).unwrap();
        assert!(r.is_root(root, 1e-10));
        assert_abs_diff_eq!(root, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn root_in_bound() {
        let r = Linear::new(1.0, 1000.0);
        let dom = r.domain();
        let mut solver = Bisection::new(&r, &dom);

        let mut x = dvector![0.0];
        let mut rx = dvector![0.0];
        solver.solve_next(&r, &dom, &mut x, &mut rx).unwrap();

        assert_eq!(x[0], -1000.0);
        assert_eq!(rx[0], 0.0);
        assert_eq!(solver.bracket(), None);
    }

    #[test]
    fn no_bracketing_root() {
        let r = NoRoot::default();
        let dom = r.domain();
        let mut solver = Bisection::new(&r, &dom);

        let mut x = dvector![0.0];
        let mut rx = dvector![0.0];
        let result = solver.solve_next(&r, &dom, &mut x, &mut rx);

        assert_eq!(
            result,
            Err(BisectionError::NoBracketingRoot {
                lower: -1000.0,
                upper: 1000.0
            })
        );
    }

    #[test]
    fn bracket_halves_each_step() {
        let r = Linear::new(1.0, -1.0);
        let dom = r.domain();
        let mut solver = Bisection::new(&r, &dom);

        let mut x = dvector![0.0];
        let mut rx = dvector![0.0];

        solver.solve_next(&r, &dom, &mut x, &mut rx).unwrap();
        assert_eq!(x[0], 0.0);
        assert_eq!(solver.bracket(), Some((0.0, 1000.0)));

        solver.solve_next(&r, &dom, &mut x, &mut rx).unwrap();
        assert_eq!(x[0], 500.0);
        assert_eq!(solver.bracket(), Some((0.0, 500.0)));

        solver.reset();
        assert_eq!(solver.bracket(), None);
    }

    #[test]
    fn legacy_skips_bracket_check() {
        let r = NoRoot::default();
        let dom = r.domain();
        let mut options = BisectionOptions::default();
        options.set_mode(BracketMode::Legacy);
        let mut solver = Bisection::with_options(&r, &dom, options);

        let mut x = dvector![0.0];
        let mut rx = dvector![0.0];

        // Residual is positive everywhere, so the upper bound keeps moving
        // towards the lower one.
        for _ in 0..3 {
            solver.solve_next(&r, &dom, &mut x, &mut rx).unwrap();
        }

        assert_eq!(x[0], -750.0);
        assert_eq!(solver.bracket(), Some((-1000.0, -750.0)));
    }

    #[test]
    fn legacy_increasing_linear() {
        let r = Linear::new(4.0, -10.0);
        let dom = r.domain();
        let mut options = BisectionOptions::default();
        options.set_mode(BracketMode::Legacy);
        let solver = Bisection::with_options(&r, &dom, options);

        let root = solve(&r, &dom, solver, 100, 1e-10).unwrap();
        assert_abs_diff_eq!(root, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn non_finite_residual() {
        let r = Reciprocal::default();
        let dom = r.domain();
        let mut solver = Bisection::new(&r, &dom);

        let mut x = dvector![0.0];
        let mut rx = dvector![0.0];
        let result = solver.solve_next(&r, &dom, &mut x, &mut rx);

        assert_eq!(
            result,
            Err(BisectionError::System(SystemError::InvalidValue))
        );
    }

    #[test]
    fn unbounded_domain() {
        let r = Linear::new(1.0, 0.0);
        let dom = Domain::unconstrained(1);
        let mut solver = Bisection::new(&r, &dom);

        let mut x = dvector![0.0];
        let mut rx = dvector![0.0];
        let result = solver.solve_next(&r, &dom, &mut x, &mut rx);

        assert_eq!(result, Err(BisectionError::UnboundedDomain));
    }
}
