//! Solving stored equations for one unknown.
//!
//! [`EquationSolver`] validates the request, then tries the [closed-form
//! catalog](crate::catalog). If the catalog has no inverse for the equation
//! and the target, the formula is [normalized](crate::markup), [compiled](crate::expr)
//! and the target is searched for by [bisection](crate::algo::bisection) on
//! the configured interval.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use formulary::{EquationSolver, Method, SolveOptions};
//! use formulary::equation::{Equation, EquationDraft, EquationId, Variable};
//!
//! let draft = EquationDraft::new("Shifted", "y = x + 3")
//!     .with_variable(Variable::new("y"))
//!     .with_variable(Variable::new("x"));
//! let equation = Equation::new(EquationId::new(1), draft).unwrap();
//!
//! let mut options = SolveOptions::default();
//! options.set_max_iters(60).set_tolerance(1e-9);
//! let solver = EquationSolver::new().with_options(options);
//!
//! let inputs = HashMap::from([("y".to_string(), 10.0)]);
//! let solution = solver.solve_detailed(&equation, &inputs, "x").unwrap();
//!
//! assert!((solution.value - 7.0).abs() < 1e-9);
//! assert!(matches!(solution.method, Method::Bisection { .. }));
//! ```

use std::{cell::Cell, collections::HashMap, sync::OnceLock};

use getset::{CopyGetters, Setters};
use log::{debug, warn};
use thiserror::Error;

use crate::{
    algo::{Bisection, BisectionError, BisectionOptions, BracketMode},
    catalog::{ClosedFormCatalog, Known},
    core::SystemError,
    driver::SolverDriver,
    equation::{Equation, EquationId},
    expr::{compile, EvalError, ParseError},
    markup::{normalize, MarkupError},
    repository::Repository,
    residual::ResidualSystem,
};

/// Options for [`EquationSolver`].
#[derive(Debug, Clone, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct SolveOptions {
    /// Interval searched for the value of the target. Default: `(-1000,
    /// 1000)`.
    interval: (f64, f64),
    /// Maximum number of bisection steps. Default: `20`.
    max_iters: usize,
    /// Residual magnitude under which the target value is accepted. Default:
    /// `1e-6`.
    tolerance: f64,
    /// Treatment of the search interval. Default: sign change (see
    /// [`BracketMode`]).
    bracket_mode: BracketMode,
    /// Whether the closed-form catalog is consulted. Default: `true`.
    use_catalog: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            interval: (-1000.0, 1000.0),
            max_iters: 20,
            tolerance: 1e-6,
            bracket_mode: BracketMode::SignChange,
            use_catalog: true,
        }
    }
}

impl SolveOptions {
    fn validate(&self) -> Result<(), SolveError> {
        let (lower, upper) = self.interval;

        let reason = if !lower.is_finite() || !upper.is_finite() {
            "search interval is not finite"
        } else if lower >= upper {
            "search interval is empty"
        } else if self.max_iters == 0 {
            "iteration budget is zero"
        } else if !(self.tolerance > 0.0) {
            "tolerance is not positive"
        } else {
            return Ok(());
        };

        Err(SolveError::InvalidOptions { reason })
    }
}

/// Invalid solve request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The target is not a variable of the equation.
    #[error("`{0}` is not a variable of the equation")]
    UnknownTarget(String),
    /// Values of some non-target variables are not given (or are not
    /// finite).
    #[error("missing values of {}", .0.join(", "))]
    MissingInputs(Vec<String>),
    /// No equation with given identifier.
    #[error("no equation with id {0}")]
    UnknownEquation(EquationId),
}

/// Error returned from solving an equation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The request is invalid.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    /// The formula markup cannot be normalized.
    #[error("malformed equation: {0}")]
    MalformedEquation(#[from] MarkupError),
    /// The normalized formula cannot be parsed.
    #[error("cannot parse equation: {0}")]
    Parse(#[from] ParseError),
    /// Evaluation of a closed form or the residual failed.
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
    /// Residuals at the bounds of the search interval have the same sign.
    #[error("no root bracketed by [{lower}, {upper}]")]
    NoBracketingRoot {
        /// Lower bound of the interval.
        lower: f64,
        /// Upper bound of the interval.
        upper: f64,
    },
    /// The options are unusable.
    #[error("invalid options: {reason}")]
    InvalidOptions {
        /// What is wrong.
        reason: &'static str,
    },
}

/// Kind of [`SolveError`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SolveError::Validation`].
    Validation,
    /// See [`SolveError::MalformedEquation`].
    MalformedEquation,
    /// See [`SolveError::Parse`].
    Parse,
    /// See [`SolveError::Evaluation`].
    Evaluation,
    /// See [`SolveError::NoBracketingRoot`].
    NoBracketingRoot,
    /// See [`SolveError::InvalidOptions`].
    InvalidOptions,
}

impl SolveError {
    /// Kind of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::Validation(_) => ErrorKind::Validation,
            SolveError::MalformedEquation(_) => ErrorKind::MalformedEquation,
            SolveError::Parse(_) => ErrorKind::Parse,
            SolveError::Evaluation(_) => ErrorKind::Evaluation,
            SolveError::NoBracketingRoot { .. } => ErrorKind::NoBracketingRoot,
            SolveError::InvalidOptions { .. } => ErrorKind::InvalidOptions,
        }
    }
}

impl From<BisectionError> for SolveError {
    fn from(error: BisectionError) -> Self {
        match error {
            BisectionError::NoBracketingRoot { lower, upper } => {
                SolveError::NoBracketingRoot { lower, upper }
            }
            BisectionError::System(SystemError::Evaluation(error)) => {
                SolveError::Evaluation(error)
            }
            BisectionError::System(SystemError::InvalidValue) => {
                SolveError::Evaluation(EvalError::NonFinite)
            }
            BisectionError::InvalidDimensionality
            | BisectionError::System(SystemError::InvalidDimensionality) => {
                SolveError::InvalidOptions {
                    reason: "system is not one-dimensional",
                }
            }
            BisectionError::UnboundedDomain => SolveError::InvalidOptions {
                reason: "search interval is not finite",
            },
        }
    }
}

/// Whether the bisection reached the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Residual magnitude is under the tolerance.
    Converged,
    /// The iteration budget was spent, the value is the last midpoint.
    MaxIters,
}

/// How the solution was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// Exact inverse from the catalog.
    ClosedForm,
    /// Bisection on the residual.
    Bisection {
        /// Number of bisection steps done.
        iters: usize,
        /// Residual at the returned value.
        residual: f64,
        /// Whether the tolerance was reached.
        status: Status,
    },
}

/// The value of the target with details of the solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Value of the target.
    pub value: f64,
    /// How the value was obtained.
    pub method: Method,
}

/// Request to solve an equation for one of its variables.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    equation: &'a Equation,
    inputs: HashMap<String, f64>,
    target: String,
}

impl<'a> SolveRequest<'a> {
    /// Request with no inputs.
    pub fn new(equation: &'a Equation, target: impl Into<String>) -> Self {
        Self {
            equation,
            inputs: HashMap::new(),
            target: target.into(),
        }
    }

    /// Supplies the value of a variable.
    pub fn with_input(mut self, symbol: impl Into<String>, value: f64) -> Self {
        self.inputs.insert(symbol.into(), value);
        self
    }

    /// Supplies the values of variables.
    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.inputs
            .extend(inputs.into_iter().map(|(symbol, value)| (symbol.into(), value)));
        self
    }

    /// Supplies the default values of the variables that have one and have no
    /// finite value yet. The target is never filled.
    pub fn with_defaults(mut self) -> Self {
        for variable in self.equation.variables() {
            let symbol = variable.symbol();
            if symbol == self.target {
                continue;
            }

            if let Some(default) = variable.default_value() {
                let supplied = self.inputs.get(symbol).map_or(false, |v| v.is_finite());
                if !supplied {
                    self.inputs.insert(symbol.to_owned(), default);
                }
            }
        }
        self
    }

    /// The equation.
    pub fn equation(&self) -> &'a Equation {
        self.equation
    }

    /// Supplied values.
    pub fn inputs(&self) -> &HashMap<String, f64> {
        &self.inputs
    }

    /// Target symbol.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Checks that the target is a variable of the equation and that all other
/// variables have a finite value.
///
/// Zero counts as a value. Values of symbols that are not variables of the
/// equation are ignored.
pub fn validate(
    equation: &Equation,
    inputs: &HashMap<String, f64>,
    target: &str,
) -> Result<(), ValidationError> {
    if equation.variable(target).is_none() {
        return Err(ValidationError::UnknownTarget(target.to_owned()));
    }

    let missing = equation
        .symbols()
        .filter(|symbol| *symbol != target)
        .filter(|symbol| !inputs.get(*symbol).map_or(false, |v| v.is_finite()))
        .map(str::to_owned)
        .collect::<Vec<_>>();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingInputs(missing))
    }
}

/// Solver of stored equations.
///
/// The solver is immutable, so it can be shared between threads and reused
/// for any number of solves.
#[derive(Debug, Clone)]
pub struct EquationSolver {
    catalog: ClosedFormCatalog,
    options: SolveOptions,
}

impl Default for EquationSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationSolver {
    /// Solver with the built-in catalog and default options.
    pub fn new() -> Self {
        Self {
            catalog: ClosedFormCatalog::builtin(),
            options: SolveOptions::default(),
        }
    }

    /// Replaces the catalog.
    pub fn with_catalog(mut self, catalog: ClosedFormCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The catalog.
    pub fn catalog(&self) -> &ClosedFormCatalog {
        &self.catalog
    }

    /// The options.
    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Solves the equation for the target, returning just the value.
    pub fn solve(
        &self,
        equation: &Equation,
        inputs: &HashMap<String, f64>,
        target: &str,
    ) -> Result<f64, SolveError> {
        self.solve_detailed(equation, inputs, target)
            .map(|solution| solution.value)
    }

    /// Solves the request.
    pub fn solve_request(&self, request: &SolveRequest<'_>) -> Result<Solution, SolveError> {
        self.solve_detailed(request.equation, &request.inputs, &request.target)
    }

    /// Solves the equation for the target.
    pub fn solve_detailed(
        &self,
        equation: &Equation,
        inputs: &HashMap<String, f64>,
        target: &str,
    ) -> Result<Solution, SolveError> {
        self.try_solve(equation, inputs, target).map_err(|error| {
            warn!(
                "solving `{}` for {} failed: {}",
                equation.formula(),
                target,
                error
            );
            error
        })
    }

    /// Solves the equation with given identifier from the repository.
    pub fn solve_by_id(
        &self,
        repository: &Repository,
        id: EquationId,
        inputs: &HashMap<String, f64>,
        target: &str,
    ) -> Result<f64, SolveError> {
        match repository.get(id) {
            Some(equation) => self.solve(equation, inputs, target),
            None => {
                let error = SolveError::from(ValidationError::UnknownEquation(id));
                warn!("solving equation {} failed: {}", id, error);
                Err(error)
            }
        }
    }

    fn try_solve(
        &self,
        equation: &Equation,
        inputs: &HashMap<String, f64>,
        target: &str,
    ) -> Result<Solution, SolveError> {
        self.options.validate()?;
        validate(equation, inputs, target)?;

        if self.options.use_catalog {
            match self.catalog.lookup(equation, target) {
                Some(form) => {
                    debug!("catalog: `{}` solved for {}", equation.formula(), target);
                    let value = form(&Known::new(inputs))?;
                    return Ok(Solution {
                        value,
                        method: Method::ClosedForm,
                    });
                }
                None => debug!("catalog: no closed form of `{}` for {}", equation.formula(), target),
            }
        }

        self.bisect(equation, inputs, target)
    }

    fn bisect(
        &self,
        equation: &Equation,
        inputs: &HashMap<String, f64>,
        target: &str,
    ) -> Result<Solution, SolveError> {
        let SolveOptions {
            interval,
            max_iters,
            tolerance,
            bracket_mode,
            ..
        } = self.options;

        let symbols = equation.symbols().collect::<Vec<_>>();
        let residual = normalize(equation.formula(), &symbols)?;
        debug!("normalized `{}` into `{}`", equation.formula(), residual);

        let expr = compile(&residual, &symbols)?;
        let system = ResidualSystem::new(&expr, target, inputs, interval)?;

        let mut driver = SolverDriver::builder(&system)
            .with_algo(|r, dom| {
                let mut options = BisectionOptions::default();
                options.set_mode(bracket_mode).set_tolerance(tolerance);
                Bisection::with_options(r, dom, options)
            })
            .build();

        let iters = Cell::new(0);
        let (x, norm) = driver.find(|state| {
            iters.set(state.iter() + 1);
            state.norm() < tolerance || state.iter() + 1 >= max_iters
        })?;

        let value = x[0];
        let residual = driver.rx()[0];
        let iters = iters.get();

        let status = if norm < tolerance {
            Status::Converged
        } else {
            warn!(
                "bisection of `{}` for {} did not converge in {} iterations, residual = {}",
                equation.formula(),
                target,
                iters,
                residual
            );
            Status::MaxIters
        };

        Ok(Solution {
            value,
            method: Method::Bisection {
                iters,
                residual,
                status,
            },
        })
    }
}

/// Solves the equation for the target with the built-in catalog and default
/// options.
pub fn solve(
    equation: &Equation,
    inputs: &HashMap<String, f64>,
    target: &str,
) -> Result<f64, SolveError> {
    static SOLVER: OnceLock<EquationSolver> = OnceLock::new();

    SOLVER
        .get_or_init(EquationSolver::new)
        .solve(equation, inputs, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{equation, inputs};

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const C: f64 = 299_792_458.0;

    fn generic(max_iters: usize, tolerance: f64) -> EquationSolver {
        let mut options = SolveOptions::default();
        options
            .set_max_iters(max_iters)
            .set_tolerance(tolerance)
            .set_use_catalog(false);
        EquationSolver::new().with_options(options)
    }

    #[test]
    fn mass_energy_example() {
        let einstein = equation("E = mc^2", &["E", "m", "c"]);

        let e = solve(&einstein, &inputs(&[("m", 2.0), ("c", C)]), "E").unwrap();
        assert_relative_eq!(e, 1.7975e17, max_relative = 1e-4);

        let m = solve(&einstein, &inputs(&[("E", e), ("c", C)]), "m").unwrap();
        assert_relative_eq!(m, 2.0, max_relative = 1e-9);
    }

    #[test]
    fn catalog_round_trips() {
        let cases: [(&str, &[&str], &[f64]); 5] = [
            ("E = mc^2", &["E", "m", "c"], &[0.0, 3.5, C]),
            ("F = ma", &["F", "m", "a"], &[0.0, 12.5, 0.4]),
            ("a^2 + b^2 = c^2", &["c", "a", "b"], &[0.0, 7.0, 24.0]),
            ("V = IR", &["V", "I", "R"], &[0.0, 0.25, 480.0]),
            ("U = mgh", &["U", "m", "g", "h"], &[0.0, 70.0, 9.8, 12.0]),
        ];

        for (formula, symbols, values) in cases {
            let equation = equation(formula, symbols);

            // The first variable is computed from the others, then every
            // variable is recomputed from the rest.
            let mut known = inputs(
                &symbols[1..]
                    .iter()
                    .copied()
                    .zip(values[1..].iter().copied())
                    .collect::<Vec<_>>(),
            );
            let first = solve(&equation, &known, symbols[0]).unwrap();
            known.insert(symbols[0].to_owned(), first);

            for symbol in symbols {
                let mut rest = known.clone();
                let expected = rest.remove(*symbol).unwrap();

                let solution = EquationSolver::new()
                    .solve_detailed(&equation, &rest, symbol)
                    .unwrap();

                assert_eq!(solution.method, Method::ClosedForm, "{}", formula);
                assert_relative_eq!(solution.value, expected, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn pythagorean_triple() {
        let pythagorean = equation("a^2 + b^2 = c^2", &["a", "b", "c"]);

        assert_eq!(
            solve(&pythagorean, &inputs(&[("a", 3.0), ("b", 4.0)]), "c"),
            Ok(5.0)
        );
    }

    #[test]
    fn generic_path_dyadic_root() {
        let shifted = equation("y = x + 3", &["y", "x"]);
        let solution = EquationSolver::new()
            .solve_detailed(&shifted, &inputs(&[("y", 128.0)]), "x")
            .unwrap();

        assert_eq!(solution.value, 125.0);
        assert_eq!(
            solution.method,
            Method::Bisection {
                iters: 4,
                residual: 0.0,
                status: Status::Converged
            }
        );
    }

    #[test]
    fn generic_path_linear() {
        let linear = equation("2x - 1 = y", &["x", "y"]);
        let solution = generic(60, 1e-9)
            .solve_detailed(&linear, &inputs(&[("y", 6.0)]), "x")
            .unwrap();

        assert_abs_diff_eq!(solution.value, 3.5, epsilon = 1e-6);
        assert!(matches!(
            solution.method,
            Method::Bisection {
                status: Status::Converged,
                ..
            }
        ));
    }

    #[test]
    fn generic_path_matches_catalog() {
        let newton = equation("F = ma", &["F", "m", "a"]);
        let values = inputs(&[("F", 10.0), ("m", 4.0)]);

        let exact = EquationSolver::new().solve(&newton, &values, "a").unwrap();
        let approx = generic(60, 1e-9).solve(&newton, &values, "a").unwrap();

        assert_eq!(exact, 2.5);
        assert_abs_diff_eq!(approx, exact, epsilon = 1e-6);
    }

    #[test]
    fn budget_spent() {
        let identity = equation("y = x", &["y", "x"]);
        let solution = EquationSolver::new()
            .solve_detailed(&identity, &inputs(&[("y", 0.3)]), "x")
            .unwrap();

        assert_abs_diff_eq!(solution.value, 0.3, epsilon = 2e-3);
        match solution.method {
            Method::Bisection { iters, status, .. } => {
                assert_eq!(iters, 20);
                assert_eq!(status, Status::MaxIters);
            }
            Method::ClosedForm => panic!("closed form used"),
        }
    }

    #[test]
    fn markup_features_through_generic_path() {
        let kinematics = equation("v = v_0 + at", &["v", "v_0", "a", "t"]);
        let t = generic(60, 1e-9)
            .solve(
                &kinematics,
                &inputs(&[("v", 20.0), ("v_0", 4.0), ("a", 2.0)]),
                "t",
            )
            .unwrap();
        assert_abs_diff_eq!(t, 8.0, epsilon = 1e-6);

        let kinetic = equation("K = \\frac{1}{2}mv^2", &["K", "m", "v"]);
        let mut options = SolveOptions::default();
        options
            .set_interval((0.0, 1000.0))
            .set_max_iters(60)
            .set_tolerance(1e-9);
        let v = EquationSolver::new()
            .with_options(options)
            .solve(&kinetic, &inputs(&[("K", 100.0), ("m", 2.0)]), "v")
            .unwrap();
        assert_abs_diff_eq!(v, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn no_bracketing_root() {
        let kinetic = equation("K = \\frac{1}{2}mv^2", &["K", "m", "v"]);
        let result = solve(&kinetic, &inputs(&[("K", 100.0), ("m", 2.0)]), "v");

        assert_eq!(
            result,
            Err(SolveError::NoBracketingRoot {
                lower: -1000.0,
                upper: 1000.0
            })
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NoBracketingRoot);
    }

    #[test]
    fn legacy_bracket_mode() {
        let parabola = equation("y = x^2", &["y", "x"]);
        let mut options = SolveOptions::default();
        options.set_bracket_mode(BracketMode::Legacy);

        let solution = EquationSolver::new()
            .with_options(options)
            .solve_detailed(&parabola, &inputs(&[("y", -1.0)]), "x")
            .unwrap();

        assert!(matches!(
            solution.method,
            Method::Bisection {
                status: Status::MaxIters,
                ..
            }
        ));
    }

    #[test]
    fn hostile_formulas_fail_cleanly() {
        let solver = generic(20, 1e-6);
        let known = inputs(&[("y", 1.0)]);

        let mut formulas = [
            "", "=", "= =", "^", "_", "\\", "y = ^", "y = x_", "y = x^", "y = \\",
            "y = \\frac", "y = \\frac{x}", "y = \\sqrt[", "y = {", "y = }", "y = )(x",
            "y = x(", "y = (x))", "y = [x", "y = x]", "y = é", "y = 𝑥", "y = x\u{0}",
            "y = 1e", "y = x = 1", "y = x +", "y = \\sin{x}", "y = x_{}", "y = x / 0",
        ]
        .map(str::to_owned)
        .to_vec();

        formulas.extend([
            format!("y = {}x{}", "(".repeat(5000), ")".repeat(5000)),
            format!("y = {}x", "(".repeat(5000)),
            format!("y = {}x{}", "{".repeat(20_000), "}".repeat(20_000)),
            format!("y = {}x{}", "\\frac{1}{".repeat(1000), "}".repeat(1000)),
            format!("y = {}2", "x^".repeat(2000)),
            format!("y = {}x", "x+".repeat(5000)),
            format!("y = {}x{}", "\\sqrt{".repeat(1000), "}".repeat(1000)),
        ]);

        for formula in &formulas {
            let result = solver.solve(&equation(formula, &["y", "x"]), &known, "x");
            assert!(result.is_err(), "{:.40}", formula);
        }

        let deep = equation("y = (((((((((((((((((((((((x)))))))))))))))))))))))", &["y", "x"]);
        assert!(solver.solve(&deep, &known, "x").is_ok());

        let signs = equation(&format!("y = {}x", "-".repeat(10_000)), &["y", "x"]);
        let x = generic(60, 1e-9).solve(&signs, &known, "x").unwrap();
        assert_abs_diff_eq!(x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn nesting_errors_are_typed() {
        let known = inputs(&[("y", 1.0)]);

        let parens = equation(
            &format!("y = {}x{}", "(".repeat(5000), ")".repeat(5000)),
            &["y", "x"],
        );
        assert_eq!(
            solve(&parens, &known, "x"),
            Err(SolveError::Parse(ParseError::TooDeep))
        );

        let braces = equation(
            &format!("y = {}x{}", "{".repeat(20_000), "}".repeat(20_000)),
            &["y", "x"],
        );
        assert!(matches!(
            solve(&braces, &known, "x"),
            Err(SolveError::MalformedEquation(MarkupError::TooDeep { .. }))
        ));
    }

    #[test]
    fn residual_undefined_at_bound() {
        let root = equation("y = \\sqrt{x}", &["y", "x"]);
        let known = inputs(&[("y", 3.0)]);

        assert_eq!(
            generic(60, 1e-9).solve(&root, &known, "x"),
            Err(SolveError::Evaluation(EvalError::NegativeRadicand(-1000.0)))
        );

        let mut options = SolveOptions::default();
        options
            .set_interval((0.0, 1000.0))
            .set_max_iters(60)
            .set_tolerance(1e-9);
        let x = EquationSolver::new()
            .with_options(options)
            .solve(&root, &known, "x")
            .unwrap();

        assert_abs_diff_eq!(x, 9.0, epsilon = 1e-6);
    }

    #[test]
    fn symbols_with_digits() {
        let law = equation("F = m1 a", &["F", "m1", "a"]);
        let m1 = generic(60, 1e-9)
            .solve(&law, &inputs(&[("F", 10.0), ("a", 4.0)]), "m1")
            .unwrap();

        assert_abs_diff_eq!(m1, 2.5, epsilon = 1e-6);
    }

    #[test]
    fn malformed_equation() {
        let expression = equation("mc^2", &["m", "c"]);
        let result = solve(&expression, &inputs(&[("c", C)]), "m");

        assert_eq!(
            result,
            Err(SolveError::MalformedEquation(MarkupError::MissingEquality))
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::MalformedEquation);
    }

    #[test]
    fn parse_error() {
        let undeclared = equation("y = z + x", &["y", "x"]);
        let result = solve(&undeclared, &inputs(&[("y", 1.0)]), "x");

        assert_eq!(
            result,
            Err(SolveError::Parse(ParseError::UnknownSymbol("z".to_owned())))
        );
    }

    #[test]
    fn unknown_target() {
        let newton = equation("F = ma", &["F", "m", "a"]);
        let result = solve(&newton, &inputs(&[("F", 1.0), ("m", 1.0)]), "x");

        assert_eq!(
            result,
            Err(SolveError::Validation(ValidationError::UnknownTarget(
                "x".to_owned()
            )))
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn missing_inputs() {
        let potential = equation("U = mgh", &["U", "m", "g", "h"]);

        assert_eq!(
            solve(&potential, &inputs(&[("m", 0.0)]), "U"),
            Err(SolveError::Validation(ValidationError::MissingInputs(vec![
                "g".to_owned(),
                "h".to_owned()
            ])))
        );
        assert_eq!(
            solve(
                &potential,
                &inputs(&[("m", 1.0), ("g", f64::NAN), ("h", 1.0)]),
                "U"
            ),
            Err(SolveError::Validation(ValidationError::MissingInputs(vec![
                "g".to_owned()
            ])))
        );
    }

    #[test]
    fn zero_inputs_are_present() {
        let newton = equation("F = ma", &["F", "m", "a"]);

        assert_eq!(
            solve(&newton, &inputs(&[("F", 0.0), ("m", 2.0)]), "a"),
            Ok(0.0)
        );
        assert_eq!(
            solve(&newton, &inputs(&[("F", 1.0), ("m", 0.0)]), "a"),
            Err(SolveError::Evaluation(EvalError::DivisionByZero))
        );
    }

    #[test]
    fn extra_inputs_are_ignored() {
        let newton = equation("F = ma", &["F", "m", "a"]);

        assert_eq!(
            solve(
                &newton,
                &inputs(&[("F", 6.0), ("m", 2.0), ("a", 100.0), ("t", 1.0)]),
                "a"
            ),
            Ok(3.0)
        );
    }

    #[test]
    fn deterministic() {
        let linear = equation("2x - 1 = y", &["x", "y"]);
        let values = inputs(&[("y", 6.0)]);
        let solver = generic(40, 1e-12);

        let first = solver.solve_detailed(&linear, &values, "x").unwrap();
        let second = solver.solve_detailed(&linear, &values, "x").unwrap();

        assert_eq!(first.value.to_bits(), second.value.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_options() {
        let newton = equation("F = ma", &["F", "m", "a"]);
        let values = inputs(&[("F", 6.0), ("m", 2.0)]);

        let mut options = SolveOptions::default();
        options.set_max_iters(0);
        assert_eq!(
            EquationSolver::new()
                .with_options(options)
                .solve(&newton, &values, "a"),
            Err(SolveError::InvalidOptions {
                reason: "iteration budget is zero"
            })
        );

        let mut options = SolveOptions::default();
        options.set_interval((5.0, -5.0));
        assert_eq!(
            EquationSolver::new()
                .with_options(options)
                .solve(&newton, &values, "a")
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidOptions
        );
    }

    #[test]
    fn request_with_defaults() {
        let repository = Repository::seeded();
        let einstein = repository.get(EquationId::new(1)).unwrap();

        let request = SolveRequest::new(einstein, "E")
            .with_input("m", 2.0)
            .with_defaults();
        assert_eq!(request.inputs().get("c"), Some(&C));
        assert_eq!(request.target(), "E");

        let solution = EquationSolver::new().solve_request(&request).unwrap();
        assert_eq!(solution.value, 2.0 * C * C);

        // Supplied values and the target are left alone.
        let request = SolveRequest::new(einstein, "c")
            .with_inputs([("E", 18.0), ("m", 2.0)])
            .with_defaults();
        assert_eq!(request.inputs().get("c"), None);

        let request = SolveRequest::new(einstein, "m")
            .with_inputs([("E", 18.0), ("c", 3.0)])
            .with_defaults();
        assert_eq!(request.inputs().get("c"), Some(&3.0));
        assert_eq!(
            EquationSolver::new().solve_request(&request).unwrap().value,
            2.0
        );
    }

    #[test]
    fn by_id() {
        let repository = Repository::seeded();
        let solver = EquationSolver::new();

        assert_eq!(
            solver.solve_by_id(
                &repository,
                EquationId::new(4),
                &inputs(&[("V", 12.0), ("R", 4.0)]),
                "I"
            ),
            Ok(3.0)
        );
        assert_eq!(
            solver.solve_by_id(&repository, EquationId::new(99), &inputs(&[]), "I"),
            Err(SolveError::Validation(ValidationError::UnknownEquation(
                EquationId::new(99)
            )))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            SolveError::from(ValidationError::MissingInputs(vec![
                "g".to_owned(),
                "h".to_owned()
            ]))
            .to_string(),
            "invalid request: missing values of g, h"
        );
        assert_eq!(
            SolveError::NoBracketingRoot {
                lower: -1000.0,
                upper: 1000.0
            }
            .to_string(),
            "no root bracketed by [-1000, 1000]"
        );
    }
}
