//! Exact inverses of well-known formulas.
//!
//! The catalog maps a formula to hand-derived closed forms, one per variable.
//! When an equation matches an entry (the same formula up to whitespace and
//! the same set of variable symbols) and the entry has a closed form for the
//! target, the solve is exact and no root finding happens.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use formulary::catalog::{ClosedFormCatalog, Known};
//! use formulary::equation::{Equation, EquationDraft, EquationId, Variable};
//!
//! let draft = EquationDraft::new("Newton's Second Law", "F = ma")
//!     .with_variable(Variable::new("F"))
//!     .with_variable(Variable::new("m"))
//!     .with_variable(Variable::new("a"));
//! let equation = Equation::new(EquationId::new(1), draft).unwrap();
//!
//! let catalog = ClosedFormCatalog::builtin();
//! let form = catalog.lookup(&equation, "a").unwrap();
//!
//! let values = HashMap::from([("F".to_string(), 10.0), ("m".to_string(), 4.0)]);
//! assert_eq!(form(&Known::new(&values)), Ok(2.5));
//! ```

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use crate::{
    equation::Equation,
    expr::{checked_div, checked_sqrt, finite, EvalError},
};

/// Formula text with all whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FormulaKey(String);

impl FormulaKey {
    /// Key of given formula.
    pub fn new(formula: &str) -> Self {
        Self(formula.chars().filter(|c| !c.is_whitespace()).collect())
    }

    /// The whitespace-free formula.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FormulaKey {
    fn from(formula: &str) -> Self {
        Self::new(formula)
    }
}

/// Known values available to a closed form.
#[derive(Debug, Clone, Copy)]
pub struct Known<'a> {
    values: &'a HashMap<String, f64>,
}

impl<'a> Known<'a> {
    /// Wraps the values.
    pub fn new(values: &'a HashMap<String, f64>) -> Self {
        Self { values }
    }

    /// Value of given symbol.
    pub fn get(&self, symbol: &str) -> Result<f64, EvalError> {
        self.values
            .get(symbol)
            .copied()
            .ok_or_else(|| EvalError::Unbound(symbol.to_owned()))
            .and_then(finite)
    }
}

/// Closed form computing one variable from the others.
pub type ClosedForm = fn(&Known<'_>) -> Result<f64, EvalError>;

/// Catalog entry of one formula.
#[derive(Clone)]
pub struct CatalogEntry {
    key: FormulaKey,
    symbols: BTreeSet<String>,
    forms: HashMap<String, ClosedForm>,
}

impl CatalogEntry {
    /// Entry of given formula over given variable symbols, with no closed
    /// forms yet.
    pub fn new(formula: &str, symbols: &[&str]) -> Self {
        Self {
            key: FormulaKey::new(formula),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            forms: HashMap::new(),
        }
    }

    /// Adds the closed form for given target.
    pub fn with_form(mut self, target: &str, form: ClosedForm) -> Self {
        self.forms.insert(target.to_owned(), form);
        self
    }

    /// Key of the formula.
    pub fn key(&self) -> &FormulaKey {
        &self.key
    }

    /// Closed form for given target.
    pub fn form(&self, target: &str) -> Option<ClosedForm> {
        self.forms.get(target).copied()
    }

    fn matches_symbols<'s>(&self, symbols: impl Iterator<Item = &'s str>) -> bool {
        let symbols = symbols.collect::<BTreeSet<_>>();
        self.symbols.iter().map(String::as_str).eq(symbols)
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut targets = self.forms.keys().collect::<Vec<_>>();
        targets.sort();

        f.debug_struct("CatalogEntry")
            .field("key", &self.key)
            .field("symbols", &self.symbols)
            .field("targets", &targets)
            .finish()
    }
}

/// Table of formulas with known closed forms.
#[derive(Debug, Clone, Default)]
pub struct ClosedFormCatalog {
    entries: HashMap<FormulaKey, CatalogEntry>,
}

impl ClosedFormCatalog {
    /// Catalog with no entries, every solve goes through root finding.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog of the built-in formulas: `E = mc^2`, `F = ma`,
    /// `a^2 + b^2 = c^2`, `V = IR` and `U = mgh`.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();

        catalog.insert(
            CatalogEntry::new("E = mc^2", &["E", "m", "c"])
                .with_form("E", |k| finite(k.get("m")? * k.get("c")?.powi(2)))
                .with_form("m", |k| checked_div(k.get("E")?, k.get("c")?.powi(2)))
                .with_form("c", |k| checked_sqrt(checked_div(k.get("E")?, k.get("m")?)?)),
        );

        catalog.insert(
            CatalogEntry::new("F = ma", &["F", "m", "a"])
                .with_form("F", |k| finite(k.get("m")? * k.get("a")?))
                .with_form("m", |k| checked_div(k.get("F")?, k.get("a")?))
                .with_form("a", |k| checked_div(k.get("F")?, k.get("m")?)),
        );

        catalog.insert(
            CatalogEntry::new("a^2 + b^2 = c^2", &["a", "b", "c"])
                .with_form("c", |k| checked_sqrt(k.get("a")?.powi(2) + k.get("b")?.powi(2)))
                .with_form("a", |k| checked_sqrt(k.get("c")?.powi(2) - k.get("b")?.powi(2)))
                .with_form("b", |k| checked_sqrt(k.get("c")?.powi(2) - k.get("a")?.powi(2))),
        );

        catalog.insert(
            CatalogEntry::new("V = IR", &["V", "I", "R"])
                .with_form("V", |k| finite(k.get("I")? * k.get("R")?))
                .with_form("I", |k| checked_div(k.get("V")?, k.get("R")?))
                .with_form("R", |k| checked_div(k.get("V")?, k.get("I")?)),
        );

        catalog.insert(
            CatalogEntry::new("U = mgh", &["U", "m", "g", "h"])
                .with_form("U", |k| finite(k.get("m")? * k.get("g")? * k.get("h")?))
                .with_form("m", |k| checked_div(k.get("U")?, k.get("g")? * k.get("h")?))
                .with_form("g", |k| checked_div(k.get("U")?, k.get("m")? * k.get("h")?))
                .with_form("h", |k| checked_div(k.get("U")?, k.get("m")? * k.get("g")?)),
        );

        catalog
    }

    /// Adds the entry, replacing any entry of the same formula.
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry of given formula, regardless of symbols.
    pub fn entry(&self, formula: &str) -> Option<&CatalogEntry> {
        self.entries.get(&FormulaKey::new(formula))
    }

    /// Closed form solving the equation for the target, if the catalog has
    /// one.
    pub fn lookup(&self, equation: &Equation, target: &str) -> Option<ClosedForm> {
        self.entry(equation.formula())
            .filter(|entry| entry.matches_symbols(equation.symbols()))
            .and_then(|entry| entry.form(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{equation, inputs};

    use approx::assert_relative_eq;

    fn solve(formula: &str, symbols: &[&str], target: &str, values: &[(&str, f64)]) -> f64 {
        let catalog = ClosedFormCatalog::builtin();
        let equation = equation(formula, symbols);
        let values = inputs(values);
        let form = catalog.lookup(&equation, target).unwrap();
        form(&Known::new(&values)).unwrap()
    }

    #[test]
    fn formula_key_ignores_whitespace() {
        assert_eq!(FormulaKey::new("E = mc^2"), FormulaKey::new("E=mc^2"));
        assert_eq!(FormulaKey::new(" a^2 +\tb^2 = c^2 ").as_str(), "a^2+b^2=c^2");
        assert_ne!(FormulaKey::new("E = mc^2"), FormulaKey::new("e = mc^2"));
    }

    #[test]
    fn mass_energy() {
        let c = 299_792_458.0;
        let e = solve("E = mc^2", &["E", "m", "c"], "E", &[("m", 2.0), ("c", c)]);
        assert_relative_eq!(e, 1.797_510_357_473_646_6e17, max_relative = 1e-12);

        let m = solve("E=mc^2", &["E", "m", "c"], "m", &[("E", e), ("c", c)]);
        assert_relative_eq!(m, 2.0, max_relative = 1e-12);

        let c2 = solve("E = mc^2", &["E", "m", "c"], "c", &[("E", e), ("m", 2.0)]);
        assert_relative_eq!(c2, c, max_relative = 1e-12);
    }

    #[test]
    fn pythagorean() {
        let symbols = ["a", "b", "c"];
        let formula = "a^2 + b^2 = c^2";

        assert_eq!(solve(formula, &symbols, "c", &[("a", 3.0), ("b", 4.0)]), 5.0);
        assert_eq!(solve(formula, &symbols, "a", &[("b", 4.0), ("c", 5.0)]), 3.0);
        assert_eq!(solve(formula, &symbols, "b", &[("a", 3.0), ("c", 5.0)]), 4.0);
    }

    #[test]
    fn ohm_and_potential_energy() {
        assert_eq!(
            solve("V = IR", &["V", "I", "R"], "I", &[("V", 12.0), ("R", 4.0)]),
            3.0
        );

        let h = solve(
            "U = mgh",
            &["U", "m", "g", "h"],
            "h",
            &[("U", 98.0), ("m", 2.0), ("g", 9.8)],
        );
        assert_relative_eq!(h, 5.0, max_relative = 1e-12);
    }

    #[test]
    fn evaluation_errors() {
        let catalog = ClosedFormCatalog::builtin();

        let newton = equation("F = ma", &["F", "m", "a"]);
        let form = catalog.lookup(&newton, "a").unwrap();
        let values = inputs(&[("F", 1.0), ("m", 0.0)]);
        assert_eq!(form(&Known::new(&values)), Err(EvalError::DivisionByZero));

        let pythagorean = equation("a^2 + b^2 = c^2", &["a", "b", "c"]);
        let form = catalog.lookup(&pythagorean, "a").unwrap();
        let values = inputs(&[("b", 5.0), ("c", 3.0)]);
        assert_eq!(
            form(&Known::new(&values)),
            Err(EvalError::NegativeRadicand(-16.0))
        );
    }

    #[test]
    fn lookup_requires_same_symbols() {
        let catalog = ClosedFormCatalog::builtin();

        let renamed = equation("F = ma", &["F", "m", "a", "t"]);
        assert!(catalog.lookup(&renamed, "a").is_none());

        let unknown = equation("p = mv", &["p", "m", "v"]);
        assert!(catalog.lookup(&unknown, "p").is_none());

        let newton = equation("F = ma", &["a", "F", "m"]);
        assert!(catalog.lookup(&newton, "m").is_some());
        assert!(catalog.lookup(&newton, "x").is_none());
    }

    #[test]
    fn custom_entries() {
        let mut catalog = ClosedFormCatalog::empty();
        assert!(catalog.is_empty());

        catalog.insert(
            CatalogEntry::new("p = mv", &["p", "m", "v"])
                .with_form("p", |k| finite(k.get("m")? * k.get("v")?)),
        );

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entry("p=mv").map(|e| e.key().as_str()), Some("p=mv"));
        assert!(catalog
            .lookup(&equation("p = mv", &["p", "m", "v"]), "p")
            .is_some());
        assert!(catalog
            .lookup(&equation("p = mv", &["p", "m", "v"]), "v")
            .is_none());
    }
}
