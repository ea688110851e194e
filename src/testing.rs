//! Testing systems and utilities useful for benchmarking, debugging and smoke
//! testing.
//!
//! The systems are one-dimensional residuals on the default search interval
//! `[-1000, 1000]` with known roots (or known lack of them). The equation
//! helpers build [`Equation`]s and input maps with minimal ceremony.

#![allow(unused)]

use std::{collections::HashMap, error::Error as StdError};

use nalgebra::{
    storage::{Storage, StorageMut},
    DVector, Dyn, IsContiguous, Vector,
};
use thiserror::Error;

use crate::{
    core::{Domain, Problem, Solver, System, SystemError},
    equation::{Equation, EquationDraft, EquationId, Variable},
};

/// Lower bound of the domains of testing systems.
pub const LOWER: f64 = -1000.0;
/// Upper bound of the domains of testing systems.
pub const UPPER: f64 = 1000.0;

/// Extension of the [`System`] trait that provides additional information that
/// is useful for testing solvers.
pub trait TestSystem: System<Field = f64> {
    /// A set of roots (if known and finite). This is mostly just for
    /// information, for example to know how close a solver got even if it
    /// failed. For testing if a given point is root, [`TestSystem::is_root`]
    /// should be used.
    fn roots(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Test if given point is a root of the system, given the tolerance `eps`.
    fn is_root(&self, x: f64, eps: f64) -> bool {
        let x = DVector::from_element(1, x);
        let mut rx = x.clone_owned();
        self.eval(&x, &mut rx).is_ok() && rx.norm() <= eps
    }
}

/// Linear residual `slope * x + intercept`.
#[derive(Debug, Clone, Copy)]
pub struct Linear {
    slope: f64,
    intercept: f64,
}

impl Linear {
    /// Initializes the system with given coefficients.
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }
}

impl Problem for Linear {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::interval(LOWER, UPPER)
    }
}

impl System for Linear {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = self.slope * x[0] + self.intercept;
        Ok(())
    }
}

impl TestSystem for Linear {
    fn roots(&self) -> Vec<f64> {
        vec![-self.intercept / self.slope]
    }
}

/// Cubic residual `x^3 - value`, the root is the cube root of `value`.
#[derive(Debug, Clone, Copy)]
pub struct Cubic {
    value: f64,
}

impl Cubic {
    /// Initializes the system with given value.
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Problem for Cubic {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::interval(LOWER, UPPER)
    }
}

impl System for Cubic {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = x[0].powi(3) - self.value;
        Ok(())
    }
}

impl TestSystem for Cubic {
    fn roots(&self) -> Vec<f64> {
        vec![self.value.cbrt()]
    }
}

/// Residual `x^2 + 1` which is positive everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoot;

impl Problem for NoRoot {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::interval(LOWER, UPPER)
    }
}

impl System for NoRoot {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = x[0] * x[0] + 1.0;
        Ok(())
    }
}

impl TestSystem for NoRoot {}

/// Residual `1 / x` which changes its sign over the domain but is infinite
/// in the midpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reciprocal;

impl Problem for Reciprocal {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::interval(LOWER, UPPER)
    }
}

impl System for Reciprocal {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        rx[0] = 1.0 / x[0];
        Ok(())
    }
}

impl TestSystem for Reciprocal {}

/// Solving error of the testing solver driver (see [`solve`]).
#[derive(Debug, Error)]
pub enum TestingError<E: StdError + 'static> {
    /// Error of the solver used.
    #[error("{0}")]
    Inner(#[from] E),
    /// Solver did not terminate.
    #[error("solver did not terminate")]
    Termination,
}

/// A simple solver driver that can be used in tests.
pub fn solve<R: TestSystem, S: Solver<R>>(
    r: &R,
    dom: &Domain<f64>,
    mut solver: S,
    max_iters: usize,
    tolerance: f64,
) -> Result<f64, TestingError<S::Error>>
where
    S::Error: StdError,
{
    let mut x = DVector::zeros(1);
    let mut rx = x.clone_owned();
    let mut iter = 0;

    loop {
        solver.solve_next(r, dom, &mut x, &mut rx)?;

        if rx.norm() <= tolerance {
            return Ok(x[0]);
        }

        if iter == max_iters {
            return Err(TestingError::Termination);
        } else {
            iter += 1;
        }
    }
}

/// Builds an equation with given formula and variable symbols.
pub fn equation(formula: &str, symbols: &[&str]) -> Equation {
    let draft = symbols
        .iter()
        .fold(EquationDraft::new("Test equation", formula), |draft, symbol| {
            draft.with_variable(Variable::new(*symbol))
        });

    Equation::new(EquationId::new(1), draft).expect("test equation is valid")
}

/// Builds a map of input values.
pub fn inputs(values: &[(&str, f64)]) -> HashMap<String, f64> {
    values
        .iter()
        .map(|(symbol, value)| (symbol.to_string(), *value))
        .collect()
}
