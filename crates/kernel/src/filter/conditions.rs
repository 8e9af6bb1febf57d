//! Filter condition model.
//!
//! The serialized shape matches the `conditions` document stored on meal
//! rules, so a saved rule and an ad-hoc filter deserialize into the same type.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::FacetKind;

/// Boolean combinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOperator {
    #[default]
    And,
    Or,
}

/// Include group for a multi-valued facet (meals, tags, ingredients).
///
/// `And` requires a recipe to carry every item, `Or` any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub operator: BoolOperator,
    #[serde(default)]
    pub items: BTreeSet<Uuid>,
}

impl FilterGroup {
    /// Group with the given operator and items.
    pub fn new(operator: BoolOperator, items: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            operator,
            items: items.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Include group for cuisines. A recipe has at most one cuisine, so only
/// membership is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuisineGroup {
    #[serde(default)]
    pub items: BTreeSet<Uuid>,
}

impl CuisineGroup {
    pub fn new(items: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Facets a recipe must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeSet {
    #[serde(default)]
    pub meals: FilterGroup,
    #[serde(default)]
    pub tags: FilterGroup,
    #[serde(default)]
    pub cuisines: CuisineGroup,
    #[serde(default)]
    pub ingredients: FilterGroup,
}

impl IncludeSet {
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
            && self.tags.is_empty()
            && self.cuisines.is_empty()
            && self.ingredients.is_empty()
    }

    fn items(&self, kind: FacetKind) -> &BTreeSet<Uuid> {
        match kind {
            FacetKind::Meal => &self.meals.items,
            FacetKind::Tag => &self.tags.items,
            FacetKind::Cuisine => &self.cuisines.items,
            FacetKind::Ingredient => &self.ingredients.items,
        }
    }
}

/// Facets that remove a recipe when any of them matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeSet {
    #[serde(default)]
    pub meals: BTreeSet<Uuid>,
    #[serde(default)]
    pub tags: BTreeSet<Uuid>,
    #[serde(default)]
    pub cuisines: BTreeSet<Uuid>,
    #[serde(default)]
    pub ingredients: BTreeSet<Uuid>,
}

impl ExcludeSet {
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
            && self.tags.is_empty()
            && self.cuisines.is_empty()
            && self.ingredients.is_empty()
    }

    fn items(&self, kind: FacetKind) -> &BTreeSet<Uuid> {
        match kind {
            FacetKind::Meal => &self.meals,
            FacetKind::Tag => &self.tags,
            FacetKind::Cuisine => &self.cuisines,
            FacetKind::Ingredient => &self.ingredients,
        }
    }
}

/// A user's current filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConditions {
    /// Free text matched against recipe names. Blank means no text filter.
    #[serde(default)]
    pub search_term: String,

    /// Combinator across the include groups.
    #[serde(default)]
    pub include_operator: BoolOperator,

    #[serde(default)]
    pub include: IncludeSet,

    #[serde(default)]
    pub exclude: ExcludeSet,
}

impl FilterConditions {
    /// Number of selected facet criteria, for "3 filters active" badges.
    ///
    /// The search term is not a criterion.
    pub fn active_criteria_count(&self) -> usize {
        self.include.meals.items.len()
            + self.include.tags.items.len()
            + self.include.cuisines.items.len()
            + self.include.ingredients.items.len()
            + self.exclude.meals.len()
            + self.exclude.tags.len()
            + self.exclude.cuisines.len()
            + self.exclude.ingredients.len()
    }

    /// Trimmed search term, or `None` when there is no text filter.
    pub fn search(&self) -> Option<&str> {
        let term = self.search_term.trim();
        (!term.is_empty()).then_some(term)
    }

    /// True when neither a search term nor any facet is selected.
    pub fn is_unfiltered(&self) -> bool {
        self.search().is_none() && self.include.is_empty() && self.exclude.is_empty()
    }

    /// Ids that are both included and excluded for the same facet kind.
    ///
    /// Such ids never match: the exclusion is applied after the inclusion.
    pub fn overlapping_ids(&self) -> Vec<(FacetKind, Uuid)> {
        FacetKind::ALL
            .iter()
            .flat_map(|kind| {
                self.include
                    .items(*kind)
                    .intersection(self.exclude.items(*kind))
                    .map(move |id| (*kind, *id))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::now_v7()).collect()
    }

    #[test]
    fn count_is_zero_for_default() {
        let conditions = FilterConditions::default();
        assert_eq!(conditions.active_criteria_count(), 0);
        assert!(conditions.is_unfiltered());
    }

    #[test]
    fn count_ignores_search_term() {
        let conditions = FilterConditions {
            search_term: "soup".to_string(),
            ..Default::default()
        };
        assert_eq!(conditions.active_criteria_count(), 0);
        assert!(!conditions.is_unfiltered());
    }

    #[test]
    fn count_sums_every_set() {
        let mut conditions = FilterConditions::default();
        conditions.include.meals = FilterGroup::new(BoolOperator::Or, ids(2));
        conditions.include.tags = FilterGroup::new(BoolOperator::And, ids(1));
        conditions.include.cuisines = CuisineGroup::new(ids(3));
        conditions.include.ingredients = FilterGroup::new(BoolOperator::And, ids(1));
        conditions.exclude.meals.extend(ids(1));
        conditions.exclude.tags.extend(ids(2));
        conditions.exclude.cuisines.extend(ids(1));
        conditions.exclude.ingredients.extend(ids(4));

        assert_eq!(conditions.active_criteria_count(), 15);
    }

    #[test]
    fn count_tracks_mutation() {
        let mut conditions = FilterConditions::default();
        let tag = Uuid::now_v7();
        conditions.include.tags.items.insert(tag);
        assert_eq!(conditions.active_criteria_count(), 1);

        // Sets ignore duplicates
        conditions.include.tags.items.insert(tag);
        assert_eq!(conditions.active_criteria_count(), 1);

        conditions.include.tags.items.remove(&tag);
        assert_eq!(conditions.active_criteria_count(), 0);
    }

    #[test]
    fn blank_search_is_no_search() {
        let conditions = FilterConditions {
            search_term: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(conditions.search(), None);

        let conditions = FilterConditions {
            search_term: "  leek soup ".to_string(),
            ..Default::default()
        };
        assert_eq!(conditions.search(), Some("leek soup"));
    }

    #[test]
    fn overlap_detection() {
        let italian = Uuid::now_v7();
        let mexican = Uuid::now_v7();
        let mut conditions = FilterConditions::default();
        conditions.include.cuisines = CuisineGroup::new([italian, mexican]);
        conditions.exclude.cuisines.insert(italian);

        assert_eq!(
            conditions.overlapping_ids(),
            vec![(FacetKind::Cuisine, italian)]
        );
    }

    #[test]
    fn deserializes_saved_rule_document() {
        let meal = Uuid::now_v7();
        let tag = Uuid::now_v7();
        let json = serde_json::json!({
            "include_operator": "or",
            "include": {
                "meals": {"operator": "and", "items": [meal]},
                "tags": {"operator": "or", "items": []},
                "cuisines": {"items": []},
                "ingredients": {"operator": "or", "items": []}
            },
            "exclude": {"meals": [], "tags": [tag], "cuisines": [], "ingredients": []}
        });

        let conditions: FilterConditions = serde_json::from_value(json).unwrap();
        assert_eq!(conditions.include_operator, BoolOperator::Or);
        assert!(conditions.include.meals.items.contains(&meal));
        assert!(conditions.exclude.tags.contains(&tag));
        assert_eq!(conditions.search_term, "");
        assert_eq!(conditions.active_criteria_count(), 2);
    }

    #[test]
    fn partial_document_uses_defaults() {
        let conditions: FilterConditions =
            serde_json::from_value(serde_json::json!({"search_term": "curry"})).unwrap();
        assert_eq!(conditions.include_operator, BoolOperator::And);
        assert!(conditions.include.is_empty());
        assert!(conditions.exclude.is_empty());
    }
}
