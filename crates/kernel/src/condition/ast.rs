//! Condition expression tree.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::filter::BoolOperator;
use crate::models::Language;

/// Single-valued id columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdField {
    Household,
    Cuisine,
}

/// Multi-valued id projections of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetField {
    Meals,
    Tags,
    /// Ids of the ingredients used by the recipe.
    Ingredients,
}

/// Boolean filter expression over recipes.
///
/// Leaf id lists are sorted and deduplicated by the compiler, so two equal
/// filter selections always produce structurally equal trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Every term holds. An empty conjunction is true.
    And(Vec<Condition>),
    /// At least one term holds. An empty disjunction is false.
    Or(Vec<Condition>),
    Not(Box<Condition>),
    /// Field equals the id.
    Equals(IdField, Uuid),
    /// Field is one of the ids.
    In(IdField, Vec<Uuid>),
    /// The recipe was created no later than the instant.
    CreatedAtOrBefore(DateTime<Utc>),
    /// The set contains every id.
    ContainsAll(SetField, Vec<Uuid>),
    /// The set contains at least one id.
    ContainsAny(SetField, Vec<Uuid>),
    /// Full-text match of the recipe name.
    Matches { term: String, language: Language },
}

impl Condition {
    /// Combine terms with `operator`.
    ///
    /// Returns `None` for no terms and the term itself for a single term, so
    /// one-group and many-group selections go through the same path.
    pub fn combine(operator: BoolOperator, mut terms: Vec<Condition>) -> Option<Condition> {
        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(match operator {
                BoolOperator::And => Condition::And(terms),
                BoolOperator::Or => Condition::Or(terms),
            }),
        }
    }

    /// Set-membership term for a facet group: all items for `And`, any for `Or`.
    pub fn facet_group(field: SetField, operator: BoolOperator, items: Vec<Uuid>) -> Condition {
        match operator {
            BoolOperator::And => Condition::ContainsAll(field, items),
            BoolOperator::Or => Condition::ContainsAny(field, items),
        }
    }

    /// Wrap in a negation.
    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    /// The household this condition is scoped to, if its top level pins one.
    pub fn household(&self) -> Option<Uuid> {
        match self {
            Condition::Equals(IdField::Household, id) => Some(*id),
            Condition::And(terms) => terms.iter().find_map(Condition::household),
            _ => None,
        }
    }
}

/// Result ordering for recipe pages.
///
/// Both orderings end with `created_at DESC, id DESC`; the id tie-break keeps
/// offset pagination free of skips and duplicates when timestamps collide.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeOrder {
    /// Newest first.
    Newest,
    /// Highest text relevance first, then newest.
    Relevance { term: String, language: Language },
}

/// A compiled filter ready for a recipe store.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub condition: Condition,
    pub order: RecipeOrder,
    /// Snapshot bound baked into `condition`.
    pub snapshot_at: DateTime<Utc>,
}
