//! PostgreSQL implementation of the stores.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{FacetSource, HouseholdStore, MealRuleStore, RecipeStore};
use crate::condition::{CompiledQuery, Condition};
use crate::error::QueryError;
use crate::models::{FacetCatalog, Household, MealRule, RecipeSummary};
use crate::query::{RecipeQueryBuilder, sort_summaries};

/// Stores backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgStore {
    /// Create a store over a pool. Recipe queries are cut off after
    /// `query_timeout`.
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Begin a transaction with the statement timeout applied. `SET LOCAL`
    /// resets on commit or rollback.
    async fn begin_bounded(&self) -> Result<Transaction<'_, Postgres>, QueryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}ms'",
            self.query_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;
        Ok(tx)
    }
}

#[async_trait]
impl HouseholdStore for PgStore {
    async fn find_household(&self, id: Uuid) -> Result<Option<Household>, QueryError> {
        Ok(Household::find_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl FacetSource for PgStore {
    async fn load_facets(&self, household_id: Uuid) -> Result<FacetCatalog, QueryError> {
        Ok(FacetCatalog::load(&self.pool, household_id).await?)
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn fetch_page(
        &self,
        query: &CompiledQuery,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<RecipeSummary>, QueryError> {
        let sql = RecipeQueryBuilder::new(query).build(limit, offset);
        debug!(%sql, "recipe page query");

        let mut tx = self.begin_bounded().await?;
        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar(&format!("SELECT row_to_json(t) FROM ({sql}) t"))
                .fetch_all(&mut *tx)
                .await?;
        tx.commit().await?;

        let mut items = rows
            .into_iter()
            .map(serde_json::from_value::<RecipeSummary>)
            .collect::<Result<Vec<_>, _>>()?;
        // The wrapping SELECT does not promise to keep the inner order
        sort_summaries(&query.order, &mut items);

        Ok(items)
    }

    async fn count(&self, condition: &Condition) -> Result<u64, QueryError> {
        let sql = RecipeQueryBuilder::build_count(condition);
        debug!(%sql, "recipe count query");

        let mut tx = self.begin_bounded().await?;
        let total: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *tx).await?;
        tx.commit().await?;

        Ok(total.max(0) as u64)
    }
}

#[async_trait]
impl MealRuleStore for PgStore {
    async fn list_meal_rules(&self, household_id: Uuid) -> Result<Vec<MealRule>, QueryError> {
        Ok(MealRule::list_for_household(&self.pool, household_id).await?)
    }

    async fn find_meal_rule(
        &self,
        household_id: Uuid,
        id: Uuid,
    ) -> Result<Option<MealRule>, QueryError> {
        Ok(MealRule::find(&self.pool, household_id, id).await?)
    }
}
