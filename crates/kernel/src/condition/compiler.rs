//! Filter selection to condition compiler.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ast::{CompiledQuery, Condition, IdField, RecipeOrder, SetField};
use crate::error::QueryError;
use crate::filter::FilterConditions;
use crate::models::{Household, Language};

/// Household scope a query is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryScope {
    /// Household every result must belong to. `None` until one is resolved.
    pub household_id: Option<Uuid>,
    /// Language of the household, selects the text-search configuration.
    pub language: Language,
}

impl QueryScope {
    pub fn new(household_id: Uuid, language: Language) -> Self {
        Self {
            household_id: Some(household_id),
            language,
        }
    }

    pub fn for_household(household: &Household) -> Self {
        Self::new(household.id, household.language)
    }
}

/// Compile a filter selection into a household-scoped condition bounded by
/// `snapshot_at`.
///
/// Term order is fixed: household, snapshot, search, include expression,
/// then exclusions for meals, tags, cuisines and ingredients. Empty groups
/// contribute nothing.
pub fn compile(
    conditions: &FilterConditions,
    scope: &QueryScope,
    snapshot_at: DateTime<Utc>,
) -> Result<CompiledQuery, QueryError> {
    let household_id = match scope.household_id {
        Some(id) if !id.is_nil() => id,
        _ => {
            return Err(QueryError::InvariantViolation(
                "recipe query compiled without a household scope".to_string(),
            ));
        }
    };

    let overlaps = conditions.overlapping_ids();
    if !overlaps.is_empty() {
        tracing::debug!(
            household = %household_id,
            overlaps = ?overlaps,
            "facet ids both included and excluded; exclusion wins"
        );
    }

    let mut terms = vec![
        Condition::Equals(IdField::Household, household_id),
        Condition::CreatedAtOrBefore(snapshot_at),
    ];

    let order = match conditions.search() {
        Some(term) => {
            terms.push(Condition::Matches {
                term: term.to_string(),
                language: scope.language,
            });
            RecipeOrder::Relevance {
                term: term.to_string(),
                language: scope.language,
            }
        }
        None => RecipeOrder::Newest,
    };

    if let Some(include) = include_expression(conditions) {
        terms.push(include);
    }

    let exclude = &conditions.exclude;
    if !exclude.meals.is_empty() {
        terms.push(Condition::ContainsAny(SetField::Meals, sorted(&exclude.meals)).negate());
    }
    if !exclude.tags.is_empty() {
        terms.push(Condition::ContainsAny(SetField::Tags, sorted(&exclude.tags)).negate());
    }
    if !exclude.cuisines.is_empty() {
        terms.push(Condition::In(IdField::Cuisine, sorted(&exclude.cuisines)).negate());
    }
    if !exclude.ingredients.is_empty() {
        terms.push(
            Condition::ContainsAny(SetField::Ingredients, sorted(&exclude.ingredients)).negate(),
        );
    }

    Ok(CompiledQuery {
        condition: Condition::And(terms),
        order,
        snapshot_at,
    })
}

/// One term per non-empty include group, combined with the include operator.
fn include_expression(conditions: &FilterConditions) -> Option<Condition> {
    let include = &conditions.include;
    let mut groups = Vec::with_capacity(4);

    if !include.meals.is_empty() {
        groups.push(Condition::facet_group(
            SetField::Meals,
            include.meals.operator,
            sorted(&include.meals.items),
        ));
    }
    if !include.tags.is_empty() {
        groups.push(Condition::facet_group(
            SetField::Tags,
            include.tags.operator,
            sorted(&include.tags.items),
        ));
    }
    if !include.cuisines.is_empty() {
        groups.push(Condition::In(
            IdField::Cuisine,
            sorted(&include.cuisines.items),
        ));
    }
    if !include.ingredients.is_empty() {
        groups.push(Condition::facet_group(
            SetField::Ingredients,
            include.ingredients.operator,
            sorted(&include.ingredients.items),
        ));
    }

    Condition::combine(conditions.include_operator, groups)
}

fn sorted(items: &std::collections::BTreeSet<Uuid>) -> Vec<Uuid> {
    items.iter().copied().collect()
}
