//! Core abstractions and types of the root finding layer.
//!
//! *Users* of the numeric layer implement the [`System`] trait, optionally
//! specifying the [domain](Domain). The equation solving engine does exactly
//! that for a compiled residual (see
//! [`ResidualSystem`](crate::residual::ResidualSystem)).
//!
//! Algorithm *developers* implement the [`Solver`] trait.

mod base;
mod domain;
mod solver;
mod system;

pub use base::*;
pub use domain::*;
pub use solver::*;
pub use system::*;
