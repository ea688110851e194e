//! Compiled residual as a one-dimensional system.
//!
//! [`ResidualSystem`] binds the known values of a compiled `LHS-(RHS)`
//! expression and leaves the target symbol free. The result is a
//! [`System`] whose [domain](Domain) is the search interval, so any
//! [`Solver`](crate::Solver) for bounded one-dimensional systems can look for
//! the value of the target.

use std::collections::HashMap;

use nalgebra::{
    storage::{Storage, StorageMut},
    Dyn, IsContiguous, Vector,
};

use crate::{
    core::{Domain, Problem, System, SystemError},
    expr::{CompiledExpr, EvalError},
};

/// Residual of an equation with one free variable.
#[derive(Debug, Clone)]
pub struct ResidualSystem<'a> {
    expr: &'a CompiledExpr,
    target: usize,
    values: Vec<f64>,
    lower: f64,
    upper: f64,
}

impl<'a> ResidualSystem<'a> {
    /// Binds the values of all symbols of the expression except `target`.
    ///
    /// Fails with [`EvalError::Unbound`] if the target is not a symbol of the
    /// expression or a value of some other symbol is not given.
    pub fn new(
        expr: &'a CompiledExpr,
        target: &str,
        values: &HashMap<String, f64>,
        interval: (f64, f64),
    ) -> Result<Self, EvalError> {
        let target = expr
            .slot(target)
            .ok_or_else(|| EvalError::Unbound(target.to_owned()))?;

        let values = expr
            .symbols()
            .iter()
            .enumerate()
            .map(|(slot, symbol)| {
                if slot == target {
                    Ok(f64::NAN)
                } else {
                    values
                        .get(symbol)
                        .copied()
                        .ok_or_else(|| EvalError::Unbound(symbol.clone()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (lower, upper) = interval;

        Ok(Self {
            expr,
            target,
            values,
            lower,
            upper,
        })
    }

    /// Evaluates the residual for given value of the target.
    pub fn residual(&self, x: f64) -> Result<f64, EvalError> {
        self.expr.eval_with(|slot| {
            if slot == self.target {
                x
            } else {
                self.values[slot]
            }
        })
    }
}

impl Problem for ResidualSystem<'_> {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::interval(self.lower, self.upper)
    }
}

impl System for ResidualSystem<'_> {
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>,
    {
        if x.nrows() != 1 || rx.nrows() != 1 {
            return Err(SystemError::InvalidDimensionality);
        }

        rx[0] = self.residual(x[0])?;
        Ok(())
    }
}
