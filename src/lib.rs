#![allow(clippy::type_complexity)]
#![warn(missing_docs)]

//! # Formulary
//!
//! A pure Rust engine for storing equations and solving them for one unknown
//! variable given numeric values of the others.
//!
//! Equations are stored as formulas in a LaTeX-like markup (`E = mc^2`,
//! `\frac{1}{2}mv^2`, `a^2 + b^2 = c^2`). Solving an equation for a target
//! variable goes one of two ways:
//!
//! * If the formula is in the [closed-form catalog](catalog), the target is
//!   computed exactly by a hand-derived inverse.
//! * Otherwise, the formula is [normalized](markup) into a residual
//!   `LHS-(RHS)`, [compiled](expr) into an evaluable form and the target is
//!   searched for by [bisection](algo::bisection) on a bounded interval.
//!
//! ## Equations
//!
//! An equation is a formula together with its variables. The [`Repository`]
//! holds equations and comes [seeded](Repository::seeded) with several
//! well-known ones.
//!
//! ```rust
//! use formulary::equation::{EquationDraft, Variable};
//! use formulary::Repository;
//!
//! let mut repository = Repository::seeded();
//!
//! let kinetic = repository
//!     .add(
//!         EquationDraft::new("Kinetic Energy", "K = \\frac{1}{2}mv^2")
//!             .with_category("Physics")
//!             .with_tag("energy")
//!             .with_variable(Variable::new("K").with_unit("J"))
//!             .with_variable(Variable::new("m").with_unit("kg"))
//!             .with_variable(Variable::new("v").with_unit("m/s")),
//!     )
//!     .expect("valid equation");
//!
//! assert_eq!(kinetic.id().get(), 6);
//! ```
//!
//! ## Solving
//!
//! The free function [`solve`] uses the built-in catalog and default
//! [options](SolveOptions). For anything else, configure an
//! [`EquationSolver`].
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use formulary::{EquationId, EquationSolver, Repository, SolveOptions};
//!
//! let repository = Repository::seeded();
//! let einstein = repository.get(EquationId::new(1)).unwrap();
//!
//! let inputs = HashMap::from([
//!     ("m".to_string(), 2.0),
//!     ("c".to_string(), 299_792_458.0),
//! ]);
//! let energy = formulary::solve(einstein, &inputs, "E").expect("solved");
//! assert!((energy - 1.7975e17).abs() / energy < 1e-4);
//!
//! // Kinetic energy is not in the catalog, bisection is used. The search
//! // interval is restricted to non-negative speeds.
//! # use formulary::equation::{Equation, EquationDraft, Variable};
//! # let kinetic = Equation::new(
//! #     EquationId::new(6),
//! #     EquationDraft::new("Kinetic Energy", "K = \\frac{1}{2}mv^2")
//! #         .with_variable(Variable::new("K"))
//! #         .with_variable(Variable::new("m"))
//! #         .with_variable(Variable::new("v")),
//! # )
//! # .unwrap();
//! let mut options = SolveOptions::default();
//! options
//!     .set_interval((0.0, 1000.0))
//!     .set_max_iters(60)
//!     .set_tolerance(1e-9);
//!
//! let solver = EquationSolver::new().with_options(options);
//! let inputs = HashMap::from([("K".to_string(), 100.0), ("m".to_string(), 2.0)]);
//! let speed = solver.solve(&kinetic, &inputs, "v").expect("solved");
//!
//! assert!((speed - 10.0).abs() < 1e-6);
//! ```
//!
//! Every failure is a [`SolveError`]: invalid request, malformed formula,
//! unparsable expression, failed evaluation (division by zero, negative
//! radicand, non-finite value), no root in the search interval or unusable
//! options.
//!
//! ## Root finding
//!
//! The numeric layer is usable on its own. A [`System`] is a residual with a
//! [`Domain`], a [`Solver`] iterates towards its root and the
//! [`SolverDriver`] runs the process until a stopping criterion. See the
//! [`driver`] module for an example.
//!
//! ## Logging
//!
//! The library logs through the [`log`](https://docs.rs/log) facade. Catalog
//! hits and misses, normalized residuals and bisection steps are logged at
//! the `debug` level, failed and non-converged solves at the `warn` level.

pub mod algo;
pub mod catalog;
mod core;
pub mod driver;
pub mod equation;
pub mod expr;
pub mod markup;
pub mod repository;
pub mod residual;
pub mod solve;

pub use core::*;
pub use driver::SolverDriver;
pub use equation::{Equation, EquationId};
pub use repository::Repository;
pub use solve::{
    solve, validate, EquationSolver, ErrorKind, Method, Solution, SolveError, SolveOptions,
    SolveRequest, Status, ValidationError,
};

#[cfg(feature = "testing")]
pub mod testing;

#[cfg(not(feature = "testing"))]
pub(crate) mod testing;

pub use nalgebra;
