use nalgebra::{
    storage::{Storage, StorageMut},
    Dyn, IsContiguous, Vector,
};
use thiserror::Error;

use super::base::Problem;
use crate::expr::EvalError;

/// Error encountered while evaluating the system residuals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SystemError {
    /// The number of variables does not match the dimensionality of the
    /// system.
    #[error("invalid dimensionality")]
    InvalidDimensionality,
    /// An invalid value (NaN, positive or negative infinity) of a residual
    /// occurred.
    #[error("invalid value encountered")]
    InvalidValue,
    /// Evaluation of an underlying expression failed.
    #[error("{0}")]
    Evaluation(#[from] EvalError),
}

/// Definition of a system of equations.
///
/// ## Defining a system
///
/// A system is any type that implements [`System`] and [`Problem`] traits.
///
/// ```rust
/// use formulary::nalgebra as na;
/// use formulary::{Domain, Problem, System, SystemError};
/// use na::{Dyn, IsContiguous};
///
/// // Residual of x^2 = 2 on [0, 2].
/// struct SquareRootOfTwo;
///
/// impl Problem for SquareRootOfTwo {
///     type Field = f64;
///
///     fn domain(&self) -> Domain<Self::Field> {
///         Domain::interval(0.0, 2.0)
///     }
/// }
///
/// impl System for SquareRootOfTwo {
///     fn eval<Sx, Srx>(
///         &self,
///         x: &na::Vector<Self::Field, Dyn, Sx>,
///         rx: &mut na::Vector<Self::Field, Dyn, Srx>,
///     ) -> Result<(), SystemError>
///     where
///         Sx: na::storage::Storage<Self::Field, Dyn> + IsContiguous,
///         Srx: na::storage::StorageMut<Self::Field, Dyn>,
///     {
///         rx[0] = x[0] * x[0] - 2.0;
///         Ok(())
///     }
/// }
/// ```
pub trait System: Problem {
    /// Calculates the system residuals in given point.
    fn eval<Sx, Srx>(
        &self,
        x: &Vector<Self::Field, Dyn, Sx>,
        rx: &mut Vector<Self::Field, Dyn, Srx>,
    ) -> Result<(), SystemError>
    where
        Sx: Storage<Self::Field, Dyn> + IsContiguous,
        Srx: StorageMut<Self::Field, Dyn>;
}
