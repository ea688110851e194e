use nalgebra::RealField;

use super::domain::Domain;

/// The base trait for [`System`](super::system::System).
pub trait Problem {
    /// Type of the field, usually f64.
    type Field: RealField + Copy;

    /// Get the domain (bound constraints) of the problem.
    ///
    /// Bracketing algorithms such as [`Bisection`](crate::algo::Bisection)
    /// take their search interval from the domain, so it should be bounded
    /// for them.
    fn domain(&self) -> Domain<Self::Field>;
}
