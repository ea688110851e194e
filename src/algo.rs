//! The collection of implemented algorithms.

pub mod bisection;

pub use bisection::{Bisection, BisectionError, BisectionOptions, BracketMode};
