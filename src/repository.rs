//! In-memory store of equations.
//!
//! [`Repository::seeded`] contains a handful of well-known equations from
//! physics and mathematics:
//!
//! ```rust
//! use formulary::repository::{Filter, Repository};
//!
//! let repository = Repository::seeded();
//! let mechanics = repository.list(&Filter::tag("mechanics"));
//!
//! assert_eq!(mechanics.len(), 2);
//! assert!(repository.categories().contains(&"Electronics"));
//! ```

use std::collections::BTreeSet;

use jiff::Timestamp;
use log::debug;

use crate::equation::{Equation, EquationDraft, EquationError, EquationId, Variable};

/// Selection of equations by tag and category.
///
/// Both comparisons ignore case. An empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    tag: Option<String>,
    category: Option<String>,
}

impl Filter {
    /// Selects all equations.
    pub fn all() -> Self {
        Self::default()
    }

    /// Selects equations with given tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::all().with_tag(tag)
    }

    /// Selects equations in given category.
    pub fn category(category: impl Into<String>) -> Self {
        Self::all().with_category(category)
    }

    /// Restricts the selection to given tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Restricts the selection to given category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether the equation passes the filter.
    pub fn matches(&self, equation: &Equation) -> bool {
        let tag = match &self.tag {
            Some(tag) => equation.has_tag(tag),
            None => true,
        };

        let category = match &self.category {
            Some(category) => equation
                .category()
                .map_or(false, |c| c.to_lowercase() == category.to_lowercase()),
            None => true,
        };

        tag && category
    }
}

/// Owned collection of equations in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    equations: Vec<Equation>,
}

impl Repository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository with the example equations.
    pub fn seeded() -> Self {
        let equations = seed()
            .into_iter()
            .zip(1..)
            .map(|(draft, id)| {
                // Days since 2023-01-01.
                let timestamp = Timestamp::constant(1_672_531_200 + (id as i64 - 1) * 86_400, 0);
                Equation::assemble(EquationId::new(id), draft, timestamp)
            })
            .collect();

        Self { equations }
    }

    /// Number of stored equations.
    pub fn len(&self) -> usize {
        self.equations.len()
    }

    /// Whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// Equation with given identifier.
    pub fn get(&self, id: EquationId) -> Option<&Equation> {
        self.equations.iter().find(|equation| equation.id() == id)
    }

    /// Equations passing the filter, in insertion order.
    pub fn list(&self, filter: &Filter) -> Vec<&Equation> {
        self.equations
            .iter()
            .filter(|equation| filter.matches(equation))
            .collect()
    }

    /// All tags used by the equations, sorted.
    pub fn tags(&self) -> Vec<&str> {
        self.equations
            .iter()
            .flat_map(Equation::tags)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// All categories used by the equations, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.equations
            .iter()
            .filter_map(Equation::category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Stores the equation under the next free identifier, timestamped now.
    pub fn add(&mut self, draft: EquationDraft) -> Result<&Equation, EquationError> {
        let id = self
            .equations
            .iter()
            .map(|equation| equation.id().get())
            .max()
            .unwrap_or(0)
            + 1;

        let equation = Equation::new(EquationId::new(id), draft)?;
        debug!("repository: added equation {} `{}`", id, equation.formula());

        self.equations.push(equation);
        Ok(&self.equations[self.equations.len() - 1])
    }
}

fn seed() -> Vec<EquationDraft> {
    vec![
        EquationDraft::new("Einstein's Mass-Energy Equivalence", "E = mc^2")
            .with_description("Describes the relationship between mass and energy.")
            .with_variable(Variable::new("E").with_description("Energy").with_unit("J"))
            .with_variable(Variable::new("m").with_description("Mass").with_unit("kg"))
            .with_variable(
                Variable::new("c")
                    .with_description("Speed of light")
                    .with_unit("m/s")
                    .with_default(299_792_458.0),
            )
            .with_tag("physics")
            .with_tag("relativity")
            .with_tag("energy")
            .with_category("Physics"),
        EquationDraft::new("Newton's Second Law", "F = ma")
            .with_description(
                "The rate of change of momentum is proportional to the force applied.",
            )
            .with_variable(Variable::new("F").with_description("Force").with_unit("N"))
            .with_variable(Variable::new("m").with_description("Mass").with_unit("kg"))
            .with_variable(
                Variable::new("a")
                    .with_description("Acceleration")
                    .with_unit("m/s²"),
            )
            .with_tag("physics")
            .with_tag("mechanics")
            .with_tag("motion")
            .with_category("Physics"),
        EquationDraft::new("Pythagorean Theorem", "a^2 + b^2 = c^2")
            .with_description(
                "In a right triangle, the square of the length of the hypotenuse equals \
                 the sum of squares of the other two sides.",
            )
            .with_variable(Variable::new("a").with_description("Side a").with_unit("units"))
            .with_variable(Variable::new("b").with_description("Side b").with_unit("units"))
            .with_variable(
                Variable::new("c")
                    .with_description("Hypotenuse")
                    .with_unit("units"),
            )
            .with_tag("mathematics")
            .with_tag("geometry")
            .with_tag("triangle")
            .with_category("Mathematics"),
        EquationDraft::new("Ohm's Law", "V = IR")
            .with_description(
                "The current through a conductor is directly proportional to the voltage \
                 and inversely proportional to the resistance.",
            )
            .with_variable(Variable::new("V").with_description("Voltage").with_unit("V"))
            .with_variable(Variable::new("I").with_description("Current").with_unit("A"))
            .with_variable(
                Variable::new("R")
                    .with_description("Resistance")
                    .with_unit("Ω"),
            )
            .with_tag("physics")
            .with_tag("electricity")
            .with_tag("circuits")
            .with_category("Electronics"),
        EquationDraft::new("Gravitational Potential Energy", "U = mgh")
            .with_description(
                "The energy possessed by an object due to its position in a \
                 gravitational field.",
            )
            .with_variable(
                Variable::new("U")
                    .with_description("Potential energy")
                    .with_unit("J"),
            )
            .with_variable(Variable::new("m").with_description("Mass").with_unit("kg"))
            .with_variable(
                Variable::new("g")
                    .with_description("Gravitational acceleration")
                    .with_unit("m/s²")
                    .with_default(9.8),
            )
            .with_variable(Variable::new("h").with_description("Height").with_unit("m"))
            .with_tag("physics")
            .with_tag("mechanics")
            .with_tag("energy")
            .with_tag("gravity")
            .with_category("Physics"),
    ]
}
