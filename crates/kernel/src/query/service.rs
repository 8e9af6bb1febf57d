//! Recipe query service.
//!
//! Executes single pages for clients that carry the snapshot timestamp
//! themselves (HTTP). Stateful incremental loading lives in
//! [`crate::feed::RecipeFeed`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::types::{PageRequest, RecipePage};
use crate::condition::{QueryScope, compile};
use crate::config::{Config, DeviceClass};
use crate::error::QueryError;
use crate::filter::FilterConditions;
use crate::store::PantryStore;

/// Stateless recipe page execution.
pub struct RecipeQueryService {
    store: Arc<dyn PantryStore>,
    config: Config,
}

impl RecipeQueryService {
    pub fn new(store: Arc<dyn PantryStore>, config: &Config) -> Self {
        Self {
            store,
            config: config.clone(),
        }
    }

    /// Resolve the query scope of a household.
    pub async fn scope(&self, household_id: Uuid) -> Result<QueryScope, QueryError> {
        if household_id.is_nil() {
            return Err(QueryError::InvariantViolation(
                "recipe query requested for the nil household".to_string(),
            ));
        }
        let household = self
            .store
            .find_household(household_id)
            .await?
            .ok_or(QueryError::NotFound("household"))?;
        Ok(QueryScope::for_household(&household))
    }

    /// Execute one page of a household's recipes.
    pub async fn page(
        &self,
        household_id: Uuid,
        request: PageRequest,
    ) -> Result<RecipePage, QueryError> {
        let scope = self.scope(household_id).await?;
        self.run(
            &scope,
            &request.conditions,
            request.snapshot_at,
            request.page,
            self.config.page_size(request.device),
        )
        .await
    }

    /// Execute one page of the candidate recipes of a saved meal rule.
    pub async fn meal_rule_candidates(
        &self,
        household_id: Uuid,
        rule_id: Uuid,
        page: u32,
        snapshot_at: Option<DateTime<Utc>>,
        device: DeviceClass,
    ) -> Result<RecipePage, QueryError> {
        let scope = self.scope(household_id).await?;
        let rule = self
            .store
            .find_meal_rule(household_id, rule_id)
            .await?
            .ok_or(QueryError::NotFound("meal rule"))?;

        self.run(
            &scope,
            &rule.conditions,
            snapshot_at,
            page,
            self.config.page_size(device),
        )
        .await
    }

    async fn run(
        &self,
        scope: &QueryScope,
        conditions: &FilterConditions,
        snapshot_at: Option<DateTime<Utc>>,
        page: u32,
        per_page: u32,
    ) -> Result<RecipePage, QueryError> {
        let snapshot_at = snapshot_at.unwrap_or_else(Utc::now);
        let query = compile(conditions, scope, snapshot_at)?;
        let offset = u64::from(page) * u64::from(per_page);

        let (items, total) = tokio::join!(
            self.store.fetch_page(&query, per_page, offset),
            self.store.count(&query.condition),
        );
        let items = items?;
        let total = match total {
            Ok(total) => Some(total),
            Err(e) => {
                warn!(error = %e, "recipe count failed, returning page without total");
                None
            }
        };

        debug!(
            household = ?scope.household_id,
            page = page,
            returned = items.len(),
            total = ?total,
            "recipe page executed"
        );

        Ok(RecipePage::new(
            items,
            total,
            page,
            per_page,
            snapshot_at,
            conditions.active_criteria_count(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{Household, Language, RecipeRecord};
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn seeded(recipes: usize) -> (Arc<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let household = Household {
            id: Uuid::now_v7(),
            name: "Home".to_string(),
            language: Language::En,
            created_at: now,
            updated_at: now,
        };
        for i in 0..recipes {
            store.insert_recipe(RecipeRecord::new(
                household.id,
                format!("recipe {i}"),
                now - Duration::minutes(i as i64 + 1),
            ));
        }
        let id = household.id;
        store.insert_household(household);
        (store, id)
    }

    #[tokio::test]
    async fn pages_are_zero_indexed() {
        let (store, household) = seeded(12);
        let service = RecipeQueryService::new(store, &Config::local());

        let first = service
            .page(household, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(first.items.len(), 9);
        assert_eq!(first.total, Some(12));
        assert!(first.has_more);

        let second = service
            .page(
                household,
                PageRequest {
                    page: 1,
                    snapshot_at: Some(first.snapshot_at),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn oversized_page_is_capped() {
        let (store, household) = seeded(60);
        let mut config = Config::local();
        config.page_size_desktop = 500;
        let service = RecipeQueryService::new(store, &config);

        let page = service
            .page(household, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.per_page, crate::config::MAX_PAGE_SIZE);
        assert_eq!(page.items.len(), 50);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn unknown_household_is_not_found() {
        let (store, _) = seeded(0);
        let service = RecipeQueryService::new(store, &Config::local());

        let err = service
            .page(Uuid::now_v7(), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, QueryError::NotFound("household"));

        let err = service
            .page(Uuid::nil(), PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::InvariantViolation(_)));
    }
}
