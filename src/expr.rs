//! Compiler of plain arithmetic expressions.
//!
//! The input is the output of the [formula normalizer](crate::markup): infix
//! arithmetic with `+ - * /`, the functions `pow(base, exp)` and `sqrt(x)`,
//! parentheses, numeric literals, the constant `pi` (or `π`) and named
//! variables. The expression is parsed once into a tree in which variables are
//! resolved to slot indices, so it can be evaluated many times without
//! re-parsing.
//!
//! ```rust
//! use formulary::expr::compile;
//!
//! let expr = compile("F-(m*a)", &["F", "m", "a"]).unwrap();
//! let residual = expr.eval_with(|slot| [10.0, 2.0, 5.0][slot]).unwrap();
//!
//! assert_eq!(residual, 0.0);
//! ```

mod lexer;
mod parser;

use std::collections::HashMap;

use thiserror::Error;

use self::{lexer::tokenize, parser::Parser};

/// Error encountered while parsing an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A character sequence that is not part of the expression language.
    #[error("invalid token `{text}` at offset {offset}")]
    InvalidToken {
        /// Byte offset in the source.
        offset: usize,
        /// The offending text.
        text: String,
    },
    /// A valid token in a position where it is not allowed.
    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken {
        /// Byte offset in the source.
        offset: usize,
        /// The offending token text.
        found: String,
    },
    /// The expression ended where an operand was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// An opening parenthesis is never closed.
    #[error("parenthesis opened at offset {offset} is not closed")]
    UnclosedParen {
        /// Byte offset of the opening parenthesis.
        offset: usize,
    },
    /// A closing parenthesis without the opening one.
    #[error("unmatched closing parenthesis at offset {offset}")]
    UnmatchedParen {
        /// Byte offset of the closing parenthesis.
        offset: usize,
    },
    /// Call of a function that is not supported.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    /// Call of a supported function with wrong number of arguments.
    #[error("function `{name}` takes {expected} argument(s), {found} given")]
    Arity {
        /// Function name.
        name: String,
        /// Number of arguments the function takes.
        expected: usize,
        /// Number of arguments given.
        found: usize,
    },
    /// A name that is neither a permitted symbol nor a constant.
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),
    /// Parentheses or operations are nested too deeply.
    #[error("expression is nested too deeply")]
    TooDeep,
}

/// Error encountered while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Square root of a negative number.
    #[error("square root of negative number {0}")]
    NegativeRadicand(f64),
    /// An intermediate or final value is infinite or NaN.
    #[error("value is not finite")]
    NonFinite,
    /// No value was given for a symbol.
    #[error("no value for symbol `{0}`")]
    Unbound(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Num(f64),
    Var(usize),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Sqrt(Box<Expr>),
}

impl Expr {
    fn eval<F>(&self, value: &F) -> Result<f64, EvalError>
    where
        F: Fn(usize) -> Result<f64, EvalError>,
    {
        let result = match self {
            Expr::Num(num) => *num,
            Expr::Var(slot) => value(*slot)?,
            Expr::Neg(arg) => -arg.eval(value)?,
            Expr::Add(lhs, rhs) => lhs.eval(value)? + rhs.eval(value)?,
            Expr::Sub(lhs, rhs) => lhs.eval(value)? - rhs.eval(value)?,
            Expr::Mul(lhs, rhs) => lhs.eval(value)? * rhs.eval(value)?,
            Expr::Div(lhs, rhs) => checked_div(lhs.eval(value)?, rhs.eval(value)?)?,
            Expr::Pow(base, exp) => base.eval(value)?.powf(exp.eval(value)?),
            Expr::Sqrt(arg) => checked_sqrt(arg.eval(value)?)?,
        };

        finite(result)
    }
}

/// Passes finite values through, fails with [`EvalError::NonFinite`]
/// otherwise.
pub fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

/// Division failing on zero divisor or non-finite result.
pub fn checked_div(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    if rhs == 0.0 {
        Err(EvalError::DivisionByZero)
    } else {
        finite(lhs / rhs)
    }
}

/// Square root failing on negative radicand.
pub fn checked_sqrt(value: f64) -> Result<f64, EvalError> {
    if value < 0.0 {
        Err(EvalError::NegativeRadicand(value))
    } else {
        finite(value.sqrt())
    }
}

/// Expression compiled against an ordered list of symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    root: Expr,
    symbols: Vec<String>,
}

impl CompiledExpr {
    /// Symbols the expression was compiled against, in slot order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Slot index of given symbol.
    pub fn slot(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Evaluates the expression with values given per slot.
    pub fn eval_with<F>(&self, value: F) -> Result<f64, EvalError>
    where
        F: Fn(usize) -> f64,
    {
        self.root.eval(&|slot| finite(value(slot)))
    }

    /// Evaluates the expression with values given per symbol.
    ///
    /// Only the symbols that actually appear in the expression need a value.
    pub fn eval(&self, values: &HashMap<String, f64>) -> Result<f64, EvalError> {
        self.root.eval(&|slot| {
            let symbol = &self.symbols[slot];
            values
                .get(symbol)
                .copied()
                .ok_or_else(|| EvalError::Unbound(symbol.clone()))
                .and_then(finite)
        })
    }
}

/// Compiles the expression permitting given symbols as variables.
///
/// A permitted symbol named `pi` shadows the constant.
pub fn compile<S: AsRef<str>>(source: &str, symbols: &[S]) -> Result<CompiledExpr, ParseError> {
    let tokens = tokenize(source)?;
    let root = Parser::new(source, tokens, symbols).parse()?;

    Ok(CompiledExpr {
        root,
        symbols: symbols.iter().map(|s| s.as_ref().to_owned()).collect(),
    })
}
