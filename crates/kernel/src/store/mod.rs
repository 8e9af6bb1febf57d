//! Storage seams for households, facets, recipes and meal rules.
//!
//! All recipe data access goes through these traits, so the query engine and
//! routes run unchanged against PostgreSQL ([`PgStore`]) or an in-process
//! dataset ([`MemoryStore`]).

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::condition::{CompiledQuery, Condition};
use crate::error::QueryError;
use crate::models::{FacetCatalog, Household, MealRule, RecipeSummary};

/// Household lookup.
#[async_trait]
pub trait HouseholdStore: Send + Sync {
    /// Find a household by ID. Returns `None` if it doesn't exist.
    async fn find_household(&self, id: Uuid) -> Result<Option<Household>, QueryError>;
}

/// Source of the facets a household can filter by.
#[async_trait]
pub trait FacetSource: Send + Sync {
    /// Load every facet of a household, each list sorted by name.
    ///
    /// An empty catalog means no facets are defined yet.
    async fn load_facets(&self, household_id: Uuid) -> Result<FacetCatalog, QueryError>;
}

/// Recipe page and count evaluation.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Fetch at most `limit` recipes matching the query, skipping `offset`,
    /// in the query's order.
    async fn fetch_page(
        &self,
        query: &CompiledQuery,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<RecipeSummary>, QueryError>;

    /// Count every recipe matching the condition, ignoring pagination.
    async fn count(&self, condition: &Condition) -> Result<u64, QueryError>;
}

/// Saved meal rules.
#[async_trait]
pub trait MealRuleStore: Send + Sync {
    /// List a household's meal rules.
    async fn list_meal_rules(&self, household_id: Uuid) -> Result<Vec<MealRule>, QueryError>;

    /// Find a meal rule within a household.
    async fn find_meal_rule(
        &self,
        household_id: Uuid,
        id: Uuid,
    ) -> Result<Option<MealRule>, QueryError>;
}

/// A backend providing every store.
pub trait PantryStore: HouseholdStore + FacetSource + RecipeStore + MealRuleStore {}

impl<T> PantryStore for T where T: HouseholdStore + FacetSource + RecipeStore + MealRuleStore {}
