//! In-process evaluation of conditions against recipe records.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::ast::{Condition, IdField, SetField};
use crate::models::RecipeRecord;

impl Condition {
    /// Whether the recipe satisfies this condition.
    pub fn matches(&self, recipe: &RecipeRecord) -> bool {
        match self {
            Condition::And(terms) => terms.iter().all(|t| t.matches(recipe)),
            Condition::Or(terms) => terms.iter().any(|t| t.matches(recipe)),
            Condition::Not(inner) => !inner.matches(recipe),
            Condition::Equals(field, id) => id_value(recipe, *field) == Some(*id),
            Condition::In(field, ids) => {
                id_value(recipe, *field).is_some_and(|value| ids.contains(&value))
            }
            Condition::CreatedAtOrBefore(at) => recipe.created_at <= *at,
            Condition::ContainsAll(field, ids) => {
                let set = set_value(recipe, *field);
                ids.iter().all(|id| set.contains(id))
            }
            Condition::ContainsAny(field, ids) => {
                let set = set_value(recipe, *field);
                ids.iter().any(|id| set.contains(id))
            }
            Condition::Matches { term, .. } => relevance(&recipe.name, term).is_some(),
        }
    }
}

fn id_value(recipe: &RecipeRecord, field: IdField) -> Option<Uuid> {
    match field {
        IdField::Household => Some(recipe.household_id),
        IdField::Cuisine => recipe.cuisine_id,
    }
}

fn set_value(recipe: &RecipeRecord, field: SetField) -> &BTreeSet<Uuid> {
    match field {
        SetField::Meals => &recipe.meal_ids,
        SetField::Tags => &recipe.tag_ids,
        SetField::Ingredients => &recipe.ingredient_ids,
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Relevance of `name` for a search `term`.
///
/// Every word of the term must be a prefix of some word of the name;
/// otherwise there is no match. The score is the share of name words hit by
/// the term, in `(0, 1]`.
pub fn relevance(name: &str, term: &str) -> Option<f32> {
    let needles = words(term);
    if needles.is_empty() {
        return None;
    }
    let haystack = words(name);
    if haystack.is_empty() {
        return None;
    }

    let all_found = needles
        .iter()
        .all(|n| haystack.iter().any(|w| w.starts_with(n.as_str())));
    if !all_found {
        return None;
    }

    let hits = haystack
        .iter()
        .filter(|w| needles.iter().any(|n| w.starts_with(n.as_str())))
        .count();
    Some(hits as f32 / haystack.len() as f32)
}
