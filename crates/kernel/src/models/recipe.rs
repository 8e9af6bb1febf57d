//! Recipe models.
//!
//! - [`RecipeSummary`]: the card-sized projection returned by page queries
//! - [`RecipeRecord`]: the facet-bearing record conditions are evaluated against

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::facet::{Facet, FacetCatalog, FacetKind};

/// Recipe summary as listed in a result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub image_blur_hash: Option<String>,
    pub cooking_time_minutes: Option<i32>,
    pub author_username: Option<String>,
    pub ingredient_count: i64,
    pub step_count: i64,
    pub cuisine: Option<Facet>,
    #[serde(default)]
    pub tags: Vec<Facet>,
    #[serde(default)]
    pub meals: Vec<Facet>,
    /// Text-search relevance; only present when a search term was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// A recipe with the facet ids the condition compiler filters on.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub household_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub image_blur_hash: Option<String>,
    pub cooking_time_minutes: Option<i32>,
    pub author_username: Option<String>,
    pub cuisine_id: Option<Uuid>,
    pub meal_ids: BTreeSet<Uuid>,
    pub tag_ids: BTreeSet<Uuid>,
    pub ingredient_ids: BTreeSet<Uuid>,
    pub step_count: u32,
}

impl RecipeRecord {
    /// Minimal record: a name in a household, created at `created_at`.
    pub fn new(household_id: Uuid, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            household_id,
            name: name.into(),
            created_at,
            image_blur_hash: None,
            cooking_time_minutes: None,
            author_username: None,
            cuisine_id: None,
            meal_ids: BTreeSet::new(),
            tag_ids: BTreeSet::new(),
            ingredient_ids: BTreeSet::new(),
            step_count: 0,
        }
    }

    /// Project into a summary, resolving facet ids through the catalog.
    ///
    /// Ids missing from the catalog are skipped.
    pub fn summary(&self, catalog: &FacetCatalog, score: Option<f32>) -> RecipeSummary {
        let resolve = |kind: FacetKind, ids: &BTreeSet<Uuid>| -> Vec<Facet> {
            let mut facets: Vec<Facet> = ids
                .iter()
                .filter_map(|id| catalog.find(kind, *id).cloned())
                .collect();
            facets.sort_by(|a, b| a.name.cmp(&b.name));
            facets
        };

        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            image_blur_hash: self.image_blur_hash.clone(),
            cooking_time_minutes: self.cooking_time_minutes,
            author_username: self.author_username.clone(),
            ingredient_count: self.ingredient_ids.len() as i64,
            step_count: i64::from(self.step_count),
            cuisine: self
                .cuisine_id
                .and_then(|id| catalog.find(FacetKind::Cuisine, id).cloned()),
            tags: resolve(FacetKind::Tag, &self.tag_ids),
            meals: resolve(FacetKind::Meal, &self.meal_ids),
            score,
        }
    }
}
