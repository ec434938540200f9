use crate::csp::{EngineConfig, IntVar, LinExpr, Session, eq, ge, sum};
use crate::error::PuzzleError;
use crate::extract::{Outcome, conclude, extract_named};
use num_rational::Rational64;
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};

/// Something to buy, at a fixed price per item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    /// Name used for the category variable.
    pub name: String,
    /// Price of one item.
    pub unit_cost: Rational64,
}

impl Category {
    /// A category called `name` at `unit_cost` per item.
    pub fn new(name: impl Into<String>, unit_cost: Rational64) -> Self {
        Self {
            name: name.into(),
            unit_cost,
        }
    }
}

/// Spend exactly `budget` on exactly `total_count` items, with at least
/// `min_each` from every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePuzzle {
    /// Exact amount to spend.
    pub budget: Rational64,
    /// Exact number of items to buy.
    pub total_count: i64,
    /// Lower bound on the count of every category.
    pub min_each: i64,
    /// The categories to buy from, in output order.
    pub categories: Vec<Category>,
}

/// 100 animals for 100 dollars: dogs at 15, cats at 1, mice at 25 cents.
impl Default for ResourcePuzzle {
    fn default() -> Self {
        Self {
            budget: Rational64::from_integer(100),
            total_count: 100,
            min_each: 1,
            categories: vec![
                Category::new("dogs", Rational64::from_integer(15)),
                Category::new("cats", Rational64::from_integer(1)),
                Category::new("mice", Rational64::new(1, 4)),
            ],
        }
    }
}

impl ResourcePuzzle {
    /// # Errors
    ///
    /// `InvalidCategory` for a missing, unnamed, repeated or negatively
    /// priced category; `InfeasibleBounds` if the minimums cannot fit in the
    /// total count.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.categories.is_empty() {
            return Err(PuzzleError::InvalidCategory("no categories given".to_string()));
        }
        let mut seen = FxHashSet::default();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(PuzzleError::InvalidCategory("empty name".to_string()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(PuzzleError::InvalidCategory(format!(
                    "`{}` is listed twice",
                    category.name
                )));
            }
            if category.unit_cost < Rational64::from_integer(0) {
                return Err(PuzzleError::InvalidCategory(format!(
                    "`{}` has negative cost {}",
                    category.name, category.unit_cost
                )));
            }
        }
        if self.min_each < 0 {
            return Err(PuzzleError::InfeasibleBounds(format!(
                "minimum {} is negative",
                self.min_each
            )));
        }
        let needed = i64::try_from(self.categories.len())
            .ok()
            .and_then(|len| self.min_each.checked_mul(len));
        if needed.is_none_or(|needed| needed > self.total_count) {
            return Err(PuzzleError::InfeasibleBounds(format!(
                "{} categories of at least {} exceed the total {}",
                self.categories.len(),
                self.min_each,
                self.total_count
            )));
        }
        Ok(())
    }

    /// Declares one count per category and asserts the count, cost and
    /// minimum constraints.
    ///
    /// # Errors
    ///
    /// Validation failures, then engine failures.
    pub fn encode(&self, session: &mut Session) -> Result<Vec<(String, IntVar)>, PuzzleError> {
        self.validate()?;
        let vars = self
            .categories
            .iter()
            .map(|c| {
                let var = session.declare_integer(&c.name, self.min_each, self.total_count)?;
                Ok((c.name.clone(), var))
            })
            .collect::<Result<Vec<_>, PuzzleError>>()?;

        session.assert(eq(sum(vars.iter().map(|&(_, v)| v)), self.total_count))?;
        let cost: LinExpr = self
            .categories
            .iter()
            .zip(&vars)
            .map(|(c, &(_, v))| v * c.unit_cost)
            .sum();
        session.assert(eq(cost, self.budget))?;
        for &(_, v) in &vars {
            session.assert(ge(v, self.min_each))?;
        }
        Ok(vars)
    }

    /// # Errors
    ///
    /// See [`ResourcePuzzle::encode`].
    pub fn solve(&self) -> Result<Outcome<Allocation>, PuzzleError> {
        self.solve_with(EngineConfig::default())
    }

    /// # Errors
    ///
    /// See [`ResourcePuzzle::encode`].
    pub fn solve_with(&self, config: EngineConfig) -> Result<Outcome<Allocation>, PuzzleError> {
        self.solve_in(&mut Session::new(config))
    }

    /// Solves in a caller-provided session, which must not already hold
    /// variables named after these categories. Use a fresh session per call.
    ///
    /// # Errors
    ///
    /// See [`ResourcePuzzle::encode`]; a reused session fails with
    /// `DuplicateVariable`.
    pub fn solve_in(&self, session: &mut Session) -> Result<Outcome<Allocation>, PuzzleError> {
        let vars = self.encode(session)?;
        log::debug!(
            "allocating {} items over {} categories",
            self.total_count,
            vars.len()
        );
        conclude(session, |s| extract_named(s, &vars).map(Allocation))
    }
}

/// Count per category, in the puzzle's category order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Allocation(Vec<(String, i64)>);

impl Allocation {
    /// Counts per category name, in category order.
    #[must_use]
    pub const fn new(counts: Vec<(String, i64)>) -> Self {
        Self(counts)
    }

    /// Count of the category called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }

    /// `(name, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// The counts alone, in category order.
    #[must_use]
    pub fn counts(&self) -> Vec<i64> {
        self.0.iter().map(|&(_, v)| v).collect()
    }

    /// True if this allocation meets every constraint of `puzzle` exactly.
    #[must_use]
    pub fn check(&self, puzzle: &ResourcePuzzle) -> bool {
        if self.0.len() != puzzle.categories.len()
            || self
                .0
                .iter()
                .zip(&puzzle.categories)
                .any(|((name, count), c)| *name != c.name || *count < puzzle.min_each)
        {
            return false;
        }
        let count: i64 = self.0.iter().map(|&(_, v)| v).sum();
        let cost: Rational64 = self
            .0
            .iter()
            .zip(&puzzle.categories)
            .map(|(&(_, v), c)| c.unit_cost * v)
            .sum();
        count == puzzle.total_count && cost == puzzle.budget
    }
}

impl Display for Allocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (name, count) in &self.0 {
            writeln!(f, "{name} = {count}")?;
        }
        Ok(())
    }
}
