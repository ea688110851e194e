use nalgebra::{storage::StorageMut, Dyn, IsContiguous, Vector};

use super::{domain::Domain, system::System};

/// Interface of a solver.
///
/// A solver is an iterative algorithm which takes a point _x_ and computes the
/// next step in the solving process. Repeated calls to the next step should
/// eventually converge into a solution _x'_ in successful cases.
///
/// ## Implementing a solver
///
/// Here is an implementation of a "solver" which just evaluates the system at
/// the lower bounds of the domain.
///
/// ```rust
/// use formulary::nalgebra as na;
/// use formulary::{Domain, Solver, System, SystemError};
/// use na::{storage::StorageMut, Dyn, IsContiguous, Vector};
///
/// struct LowerBound;
///
/// impl<R: System> Solver<R> for LowerBound {
///     const NAME: &'static str = "Lower bound";
///     type Error = SystemError;
///
///     fn solve_next<Sx, Srx>(
///         &mut self,
///         r: &R,
///         dom: &Domain<R::Field>,
///         x: &mut Vector<R::Field, Dyn, Sx>,
///         rx: &mut Vector<R::Field, Dyn, Srx>,
///     ) -> Result<(), Self::Error>
///     where
///         Sx: StorageMut<R::Field, Dyn> + IsContiguous,
///         Srx: StorageMut<R::Field, Dyn>,
///     {
///         x.iter_mut()
///             .zip(dom.lower())
///             .for_each(|(xi, li)| *xi = *li);
///
///         // We must compute the residuals.
///         r.eval(x, rx)
///     }
/// }
/// ```
pub trait Solver<R: System> {
    /// Name of the solver.
    const NAME: &'static str;

    /// Error while computing the next step.
    type Error;

    /// Computes the next step in the solving process.
    ///
    /// The value of `x` is the current point. After the method returns, `x`
    /// should hold the variable values of the performed step and `rx` _must_
    /// contain residuals of that step as computed by [`System::eval`].
    fn solve_next<Sx, Srx>(
        &mut self,
        r: &R,
        dom: &Domain<R::Field>,
        x: &mut Vector<R::Field, Dyn, Sx>,
        rx: &mut Vector<R::Field, Dyn, Srx>,
    ) -> Result<(), Self::Error>
    where
        Sx: StorageMut<R::Field, Dyn> + IsContiguous,
        Srx: StorageMut<R::Field, Dyn>;
}
