//! Data model of stored equations.
//!
//! An [`Equation`] is a formula in markup together with the description of
//! its variables. New equations are described by an [`EquationDraft`] which
//! gets its identifier and timestamps when it is added to the
//! [repository](crate::repository::Repository).
//!
//! ```rust
//! use formulary::equation::{EquationDraft, Variable};
//!
//! let draft = EquationDraft::new("Newton's Second Law", "F = ma")
//!     .with_category("Physics")
//!     .with_tag("Mechanics")
//!     .with_variable(Variable::new("F").with_unit("N"))
//!     .with_variable(Variable::new("m").with_unit("kg"))
//!     .with_variable(Variable::new("a").with_unit("m/s²"));
//! ```

use std::{collections::BTreeSet, fmt};

use jiff::Timestamp;
use thiserror::Error;

/// Identifier of an equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EquationId(u64);

impl EquationId {
    /// Wraps the raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EquationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A variable of an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    symbol: String,
    description: Option<String>,
    unit: Option<String>,
    default: Option<f64>,
}

impl Variable {
    /// Variable with given symbol.
    ///
    /// The symbol is the name under which the variable appears in the formula
    /// and under which its value is supplied.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            description: None,
            unit: None,
            default: None,
        }
    }

    /// Sets human readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets unit label.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the value used when none is supplied (see
    /// [`SolveRequest::with_defaults`](crate::SolveRequest::with_defaults)).
    pub fn with_default(mut self, value: f64) -> Self {
        self.default = Some(value);
        self
    }

    /// Symbol of the variable.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Description of the variable.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Unit label of the variable.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Default value of the variable.
    pub fn default_value(&self) -> Option<f64> {
        self.default
    }
}

/// Description of an equation that is not stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationDraft {
    name: String,
    formula: String,
    description: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    variables: Vec<Variable>,
}

impl EquationDraft {
    /// Draft with given display name and formula markup.
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
            description: None,
            category: None,
            tags: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Sets human readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a variable.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Formula markup.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Variables in the declared order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

/// Error of invalid equation description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquationError {
    /// Two variables share the same symbol.
    #[error("duplicate variable `{0}`")]
    DuplicateVariable(String),
    /// A variable symbol is empty or contains whitespace.
    #[error("invalid variable symbol `{0}`")]
    InvalidSymbol(String),
}

/// A stored equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    id: EquationId,
    name: String,
    formula: String,
    description: Option<String>,
    category: Option<String>,
    tags: BTreeSet<String>,
    variables: Vec<Variable>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Equation {
    /// Creates the equation from the draft, timestamped now.
    pub fn new(id: EquationId, draft: EquationDraft) -> Result<Self, EquationError> {
        Self::with_timestamp(id, draft, Timestamp::now())
    }

    /// Creates the equation from the draft with given creation time.
    ///
    /// Tags are trimmed, lower-cased and deduplicated.
    pub fn with_timestamp(
        id: EquationId,
        draft: EquationDraft,
        timestamp: Timestamp,
    ) -> Result<Self, EquationError> {
        validate(&draft.variables)?;
        Ok(Self::assemble(id, draft, timestamp))
    }

    /// Creates the equation from a draft known to be valid.
    pub(crate) fn assemble(id: EquationId, draft: EquationDraft, timestamp: Timestamp) -> Self {
        let EquationDraft {
            name,
            formula,
            description,
            category,
            tags,
            variables,
        } = draft;

        let tags = tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        Self {
            id,
            name,
            formula,
            description,
            category,
            tags,
            variables,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Identifier of the equation.
    pub fn id(&self) -> EquationId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formula markup.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Human readable description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Category.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Lower-cased tags in alphabetical order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Whether the equation has given tag, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.trim().to_lowercase())
    }

    /// Variables in the declared order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Variable with given symbol.
    pub fn variable(&self, symbol: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.symbol() == symbol)
    }

    /// Symbols of the variables in the declared order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(Variable::symbol)
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Time of the last update.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

pub(crate) fn validate(variables: &[Variable]) -> Result<(), EquationError> {
    let mut symbols = BTreeSet::new();

    for variable in variables {
        let symbol = variable.symbol();
        if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
            return Err(EquationError::InvalidSymbol(symbol.to_owned()));
        }
        if !symbols.insert(symbol) {
            return Err(EquationError::DuplicateVariable(symbol.to_owned()));
        }
    }

    Ok(())
}
