//! In-process store.
//!
//! Holds households, facets, recipes and meal rules in memory and evaluates
//! compiled conditions directly against [`RecipeRecord`]s. Used by tests and
//! for serving without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{FacetSource, HouseholdStore, MealRuleStore, RecipeStore};
use crate::condition::{CompiledQuery, Condition, RecipeOrder, relevance};
use crate::error::QueryError;
use crate::models::{FacetCatalog, Household, MealRule, RecipeRecord, RecipeSummary};
use crate::query::sort_summaries;

#[derive(Default)]
struct MemoryData {
    households: HashMap<Uuid, Household>,
    catalogs: HashMap<Uuid, FacetCatalog>,
    recipes: Vec<RecipeRecord>,
    meal_rules: Vec<MealRule>,
}

/// Store keeping everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a household.
    pub fn insert_household(&self, household: Household) {
        self.data.write().households.insert(household.id, household);
    }

    /// Replace a household's facet catalog.
    pub fn set_catalog(&self, household_id: Uuid, catalog: FacetCatalog) {
        self.data.write().catalogs.insert(household_id, catalog);
    }

    /// Add a recipe.
    pub fn insert_recipe(&self, recipe: RecipeRecord) {
        self.data.write().recipes.push(recipe);
    }

    /// Add a meal rule.
    pub fn insert_meal_rule(&self, rule: MealRule) {
        self.data.write().meal_rules.push(rule);
    }

    /// Number of recipes across all households.
    pub fn recipe_count(&self) -> usize {
        self.data.read().recipes.len()
    }
}

#[async_trait]
impl HouseholdStore for MemoryStore {
    async fn find_household(&self, id: Uuid) -> Result<Option<Household>, QueryError> {
        Ok(self.data.read().households.get(&id).cloned())
    }
}

#[async_trait]
impl FacetSource for MemoryStore {
    async fn load_facets(&self, household_id: Uuid) -> Result<FacetCatalog, QueryError> {
        let mut catalog = self
            .data
            .read()
            .catalogs
            .get(&household_id)
            .cloned()
            .unwrap_or_default();
        catalog.sort();
        Ok(catalog)
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn fetch_page(
        &self,
        query: &CompiledQuery,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<RecipeSummary>, QueryError> {
        let data = self.data.read();
        let empty = FacetCatalog::default();
        let catalog = query
            .condition
            .household()
            .and_then(|id| data.catalogs.get(&id))
            .unwrap_or(&empty);

        let mut items: Vec<RecipeSummary> = data
            .recipes
            .iter()
            .filter(|recipe| query.condition.matches(recipe))
            .map(|recipe| {
                let score = match &query.order {
                    RecipeOrder::Relevance { term, .. } => relevance(&recipe.name, term),
                    RecipeOrder::Newest => None,
                };
                recipe.summary(catalog, score)
            })
            .collect();
        sort_summaries(&query.order, &mut items);

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(items
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, condition: &Condition) -> Result<u64, QueryError> {
        let data = self.data.read();
        Ok(data.recipes.iter().filter(|r| condition.matches(r)).count() as u64)
    }
}

#[async_trait]
impl MealRuleStore for MemoryStore {
    async fn list_meal_rules(&self, household_id: Uuid) -> Result<Vec<MealRule>, QueryError> {
        let mut rules: Vec<MealRule> = self
            .data
            .read()
            .meal_rules
            .iter()
            .filter(|rule| rule.household_id == household_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rules)
    }

    async fn find_meal_rule(
        &self,
        household_id: Uuid,
        id: Uuid,
    ) -> Result<Option<MealRule>, QueryError> {
        Ok(self
            .data
            .read()
            .meal_rules
            .iter()
            .find(|rule| rule.household_id == household_id && rule.id == id)
            .cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::condition::{QueryScope, compile};
    use crate::filter::{BoolOperator, FilterConditions, FilterGroup};
    use crate::models::{Facet, Language};
    use chrono::{Duration, Utc};

    fn household() -> Household {
        let now = Utc::now();
        Household {
            id: Uuid::now_v7(),
            name: "Home".to_string(),
            language: Language::En,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn fetch_page_filters_orders_and_slices() {
        let store = MemoryStore::new();
        let home = household();
        store.insert_household(home.clone());

        let quick = Facet::named(Uuid::now_v7(), "quick");
        store.set_catalog(
            home.id,
            FacetCatalog {
                tags: vec![quick.clone()],
                ..Default::default()
            },
        );

        let base = Utc::now() - Duration::hours(1);
        for i in 0..4 {
            let mut recipe = RecipeRecord::new(home.id, format!("r{i}"), base + Duration::minutes(i));
            if i % 2 == 0 {
                recipe.tag_ids.insert(quick.id);
            }
            store.insert_recipe(recipe);
        }
        // Another household's recipe never leaks in
        let mut foreign = RecipeRecord::new(Uuid::now_v7(), "foreign", base);
        foreign.tag_ids.insert(quick.id);
        store.insert_recipe(foreign);

        let mut conditions = FilterConditions::default();
        conditions.include.tags = FilterGroup::new(BoolOperator::And, [quick.id]);
        let query = compile(&conditions, &QueryScope::for_household(&home), Utc::now()).unwrap();

        let first = store.fetch_page(&query, 1, 0).await.unwrap();
        assert_eq!(first[0].name, "r2");
        assert_eq!(first[0].tags, vec![quick]);
        let second = store.fetch_page(&query, 1, 1).await.unwrap();
        assert_eq!(second[0].name, "r0");
        assert!(store.fetch_page(&query, 1, 2).await.unwrap().is_empty());
        assert_eq!(store.count(&query.condition).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn search_scores_results() {
        let store = MemoryStore::new();
        let home = household();
        store.insert_recipe(RecipeRecord::new(home.id, "Pasta", Utc::now()));
        store.insert_recipe(RecipeRecord::new(home.id, "Pasta al forno", Utc::now()));

        let conditions = FilterConditions {
            search_term: "pasta".to_string(),
            ..Default::default()
        };
        let query = compile(&conditions, &QueryScope::for_household(&home), Utc::now()).unwrap();
        let items = store.fetch_page(&query, 10, 0).await.unwrap();

        assert_eq!(items[0].name, "Pasta");
        assert_eq!(items[0].score, Some(1.0));
        assert!(items[1].score.unwrap() < 1.0);
    }

    #[tokio::test]
    async fn missing_catalog_is_empty() {
        let store = MemoryStore::new();
        let catalog = store.load_facets(Uuid::now_v7()).await.unwrap();
        assert!(catalog.is_empty());
    }
}
