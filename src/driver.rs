//! High-level API for running a root finding process.
//!
//! The driver encapsulates all internal state and provides a simple API to
//! run the iterative process. The equation solving engine uses it with the
//! [`Bisection`] algorithm, which is also the default:
//!
//! ```rust
//! use formulary::SolverDriver;
//! # use formulary::nalgebra as na;
//! # use formulary::{Domain, Problem, System, SystemError};
//! # use na::{Dyn, IsContiguous};
//! #
//! # struct Shifted;
//! #
//! # impl Problem for Shifted {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::interval(-10.0, 10.0)
//! #     }
//! # }
//! #
//! # impl System for Shifted {
//! #     fn eval<Sx, Srx>(
//! #         &self,
//! #         x: &na::Vector<Self::Field, Dyn, Sx>,
//! #         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
//! #     ) -> Result<(), SystemError>
//! #     where
//! #         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
//! #         Srx: na::storage::StorageMut<Self::Field, Dyn>,
//! #     {
//! #         rx[0] = x[0] - 2.5;
//! #         Ok(())
//! #     }
//! # }
//!
//! let r = Shifted;
//! let mut solver = SolverDriver::new(&r);
//!
//! let (x, norm) = solver
//!     .find(|state| state.norm() < 1e-9 || state.iter() >= 100)
//!     .expect("solver encountered an error");
//!
//! assert!(norm < 1e-9);
//! assert!((x[0] - 2.5).abs() < 1e-9);
//! ```
//!
//! If you need more control over the iteration process, you can do the
//! iterations manually:
//!
//! ```rust
//! # use formulary::nalgebra as na;
//! # use formulary::{Domain, Problem, SolverDriver, System, SystemError};
//! # use na::{Dyn, IsContiguous};
//! #
//! # struct Shifted;
//! #
//! # impl Problem for Shifted {
//! #     type Field = f64;
//! #
//! #     fn domain(&self) -> Domain<Self::Field> {
//! #         Domain::interval(-10.0, 10.0)
//! #     }
//! # }
//! #
//! # impl System for Shifted {
//! #     fn eval<Sx, Srx>(
//! #         &self,
//! #         x: &na::Vector<Self::Field, Dyn, Sx>,
//! #         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
//! #     ) -> Result<(), SystemError>
//! #     where
//! #         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
//! #         Srx: na::storage::StorageMut<Self::Field, Dyn>,
//! #     {
//! #         rx[0] = x[0] - 2.5;
//! #         Ok(())
//! #     }
//! # }
//! #
//! # let r = Shifted;
//! let mut solver = SolverDriver::new(&r);
//!
//! for _ in 0..20 {
//!     let (x, norm) = solver.next().expect("no solver error");
//!     // ...
//! }
//! ```

use nalgebra::{convert, DimName, Dyn, OVector, U1};

use crate::{algo::Bisection, Domain, Problem, Solver, System};

struct Builder<'a, R: Problem, A> {
    r: &'a R,
    dom: Domain<R::Field>,
    algo: A,
    x0: OVector<R::Field, Dyn>,
}

impl<'a, R: Problem> Builder<'a, R, Bisection<R>> {
    fn new(r: &'a R) -> Self {
        let dom = r.domain();
        let algo = Bisection::new(r, &dom);

        let dim = Dyn(dom.dim());
        let x0 = OVector::from_element_generic(dim, U1::name(), convert(0.0));

        Self { r, dom, algo, x0 }
    }
}

impl<'a, R: Problem, A> Builder<'a, R, A> {
    fn with_algo<S2, FA>(self, factory: FA) -> Builder<'a, R, S2>
    where
        FA: FnOnce(&R, &Domain<R::Field>) -> S2,
    {
        let algo = factory(self.r, &self.dom);

        Builder {
            r: self.r,
            dom: self.dom,
            algo,
            x0: self.x0,
        }
    }

    fn build(mut self) -> Self {
        self.dom.project(&mut self.x0);
        self
    }
}

/// Builder for the [`SolverDriver`].
pub struct SolverBuilder<'a, R: Problem, A>(Builder<'a, R, A>);

impl<'a, R: Problem, A> SolverBuilder<'a, R, A> {
    /// Sets specific algorithm to be used.
    ///
    /// This builder method accepts a closure that takes the reference to the
    /// problem and its domain. You can pass the `new` constructor directly
    /// (e.g., `Bisection::new`) or a closure that sets custom options.
    pub fn with_algo<S2, FA>(self, factory: FA) -> SolverBuilder<'a, R, S2>
    where
        FA: FnOnce(&R, &Domain<R::Field>) -> S2,
    {
        SolverBuilder(self.0.with_algo(factory))
    }

    /// Builds the [`SolverDriver`].
    pub fn build(self) -> SolverDriver<'a, R, A> {
        let Builder { r, dom, algo, x0 } = self.0.build();
        let rx = x0.clone_owned();

        SolverDriver {
            r,
            dom,
            algo,
            x: x0,
            rx,
        }
    }
}

/// The driver for the process of solving a system of equations.
///
/// For default settings, use [`SolverDriver::new`]. For more flexibility, use
/// [`SolverDriver::builder`]. For the usage of the driver, see [module](self)
/// documentation.
pub struct SolverDriver<'a, R: Problem, A> {
    r: &'a R,
    dom: Domain<R::Field>,
    algo: A,
    x: OVector<R::Field, Dyn>,
    rx: OVector<R::Field, Dyn>,
}

impl<'a, R: Problem> SolverDriver<'a, R, Bisection<R>> {
    /// Returns the builder for specifying additional settings.
    pub fn builder(r: &'a R) -> SolverBuilder<'a, R, Bisection<R>> {
        SolverBuilder(Builder::new(r))
    }

    /// Initializes the driver with the default settings.
    pub fn new(r: &'a R) -> Self {
        SolverDriver::builder(r).build()
    }
}

impl<'a, R: Problem, A> SolverDriver<'a, R, A> {
    /// Returns reference to the current point.
    pub fn x(&self) -> &[R::Field] {
        self.x.as_slice()
    }

    /// Returns reference to the current residuals.
    pub fn rx(&self) -> &[R::Field] {
        self.rx.as_slice()
    }

    /// Returns norm of the residuals.
    pub fn norm(&self) -> R::Field {
        self.rx.norm()
    }

    /// Returns reference to the used algorithm.
    pub fn algo(&self) -> &A {
        &self.algo
    }
}

impl<'a, R: System, A: Solver<R>> SolverDriver<'a, R, A> {
    /// Does one iteration of the process, returning the current point and the
    /// norm of the residuals in case of no error.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(&[R::Field], R::Field), A::Error> {
        self.algo
            .solve_next(self.r, &self.dom, &mut self.x, &mut self.rx)?;
        Ok((self.x.as_slice(), self.rx.norm()))
    }

    /// Runs the iterative process until given stopping criterion is satisfied.
    ///
    /// The criterion is checked after each iteration, so at least one
    /// iteration is always performed.
    pub fn find<C>(&mut self, stop: C) -> Result<(&[R::Field], R::Field), A::Error>
    where
        C: Fn(SolverIterState<'_, R>) -> bool,
    {
        let mut iter = 0;

        loop {
            let norm = self.next()?.1;

            let state = SolverIterState {
                x: &self.x,
                rx: &self.rx,
                iter,
            };

            if stop(state) {
                return Ok((self.x.as_slice(), norm));
            }

            iter += 1;
        }
    }

    /// Returns the name of the used solver.
    pub fn name(&self) -> &str {
        A::NAME
    }
}

/// State of the current iteration.
pub struct SolverIterState<'a, R: Problem> {
    x: &'a OVector<R::Field, Dyn>,
    rx: &'a OVector<R::Field, Dyn>,
    iter: usize,
}

impl<'a, R: Problem> SolverIterState<'a, R> {
    /// Returns reference to the current point.
    pub fn x(&self) -> &[R::Field] {
        self.x.as_slice()
    }

    /// Returns reference to the current residuals.
    pub fn rx(&self) -> &[R::Field] {
        self.rx.as_slice()
    }

    /// Returns norm of the residuals.
    pub fn norm(&self) -> R::Field {
        self.rx.norm()
    }

    /// Returns the current iteration number, starting from zero.
    pub fn iter(&self) -> usize {
        self.iter
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        algo::{BisectionOptions, BracketMode},
        testing::{Linear, NoRoot},
    };

    use super::*;

    use std::cell::Cell;

    struct WithDomain(pub Domain<f64>);

    impl Problem for WithDomain {
        type Field = f64;

        fn domain(&self) -> Domain<Self::Field> {
            self.0.clone()
        }
    }

    #[test]
    fn solver_basic_use_case() {
        let r = Linear::new(3.0, -1.5);
        let mut solver = SolverDriver::new(&r);

        let tolerance = 1e-6;
        let (x, norm) = solver
            .find(|state| state.iter() >= 100 || state.norm() < tolerance)
            .unwrap();

        assert!(norm < tolerance);
        assert!((x[0] - 0.5).abs() < tolerance);
        assert_eq!(solver.name(), "Bisection");
    }

    #[test]
    fn solver_custom() {
        let r = Linear::new(3.0, -1.5);
        let mut solver = SolverDriver::builder(&r)
            .with_algo(|r, dom| {
                let mut options = BisectionOptions::default();
                options.set_mode(BracketMode::Legacy);
                Bisection::with_options(r, dom, options)
            })
            .build();

        let tolerance = 1e-6;
        let (_, norm) = solver
            .find(|state| state.iter() >= 100 || state.norm() < tolerance)
            .unwrap();

        assert!(norm < tolerance);
    }

    #[test]
    fn solver_stops_at_budget() {
        let r = Linear::new(1.0, -0.3);
        let mut solver = SolverDriver::new(&r);

        let calls = Cell::new(0);
        solver
            .find(|state| {
                calls.set(calls.get() + 1);
                state.iter() + 1 >= 5
            })
            .unwrap();

        assert_eq!(calls.get(), 5);
        assert_eq!(solver.algo().bracket().map(|(l, u)| u - l), Some(62.5));
    }

    #[test]
    fn solver_propagates_error() {
        let r = NoRoot::default();
        let mut solver = SolverDriver::new(&r);

        assert!(solver.find(|state| state.iter() >= 10).is_err());
    }

    #[test]
    fn solver_starts_in_domain() {
        let r = WithDomain(Domain::rect(vec![1.0, -3.0], vec![2.0, -2.0]));
        let solver = SolverDriver::new(&r);

        assert_eq!(solver.x(), &[1.0, -2.0]);
        assert_eq!(solver.rx(), &[1.0, -2.0]);
    }
}
