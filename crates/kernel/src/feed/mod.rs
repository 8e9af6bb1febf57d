//! Incrementally loaded recipe results.
//!
//! A [`RecipeFeed`] owns one filter session at a time: the compiled query,
//! the snapshot it is bounded by, and the pages loaded so far. Changing the
//! conditions starts a new session. Responses dispatched by an earlier
//! session are recognized by their token and dropped.

mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub use state::{FeedState, PageOutcome};

use crate::condition::{CompiledQuery, QueryScope, compile};
use crate::error::QueryError;
use crate::filter::FilterConditions;
use crate::models::RecipeSummary;
use crate::store::RecipeStore;

struct Session {
    state: FeedState,
    query: CompiledQuery,
}

/// Clears the in-flight flag when a page load is dropped before its page
/// is applied, so the next call retries the same offset.
struct LoadingGuard<'a> {
    session: &'a Mutex<Session>,
    token: u64,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.lock();
        if session.state.token == self.token && session.state.loading {
            session.state.loading = false;
            debug!(token = self.token, "page load cancelled");
        }
    }
}

/// Paginated recipe results for one household.
pub struct RecipeFeed {
    store: Arc<dyn RecipeStore>,
    scope: QueryScope,
    page_size: u32,
    session: Mutex<Session>,
}

impl RecipeFeed {
    /// Create a feed and begin its first session.
    pub fn begin(
        store: Arc<dyn RecipeStore>,
        scope: QueryScope,
        page_size: u32,
        conditions: FilterConditions,
    ) -> Result<Self, QueryError> {
        let snapshot_at = Utc::now();
        let query = compile(&conditions, &scope, snapshot_at)?;
        debug!(household = ?scope.household_id, token = 1, "feed session started");

        Ok(Self {
            store,
            scope,
            page_size,
            session: Mutex::new(Session {
                state: FeedState::new(conditions, page_size, snapshot_at, 1),
                query,
            }),
        })
    }

    /// Start a new session: compile under a fresh snapshot, clear loaded
    /// recipes, total and error, and invalidate in-flight responses.
    ///
    /// On a compile error the current session is kept.
    pub fn begin_session(&self, conditions: FilterConditions) -> Result<(), QueryError> {
        let snapshot_at = Utc::now();
        let query = compile(&conditions, &self.scope, snapshot_at)?;

        let mut session = self.session.lock();
        let token = session.state.token + 1;
        session.state = FeedState::new(conditions, self.page_size, snapshot_at, token);
        session.query = query;
        drop(session);

        debug!(household = ?self.scope.household_id, token = token, "feed session started");
        Ok(())
    }

    /// React to edited conditions. The reset is complete when this returns.
    pub fn on_condition_changed(&self, conditions: FilterConditions) -> Result<(), QueryError> {
        self.begin_session(conditions)
    }

    /// Load the next page and refresh the total.
    ///
    /// The row fetch and the count run concurrently and are applied
    /// independently; either is dropped if the session changed meanwhile.
    /// Dropping the returned future before the page lands leaves the feed
    /// ready to retry the same offset.
    pub async fn load_next_page(&self) -> PageOutcome {
        let (token, query, offset) = {
            let mut session = self.session.lock();
            if session.state.loading {
                return PageOutcome::InFlight;
            }
            session.state.loading = true;
            (
                session.state.token,
                session.query.clone(),
                session.state.next_offset(),
            )
        };

        let guard = LoadingGuard {
            session: &self.session,
            token,
            armed: true,
        };

        let page = async {
            let result = self.store.fetch_page(&query, self.page_size, offset).await;
            let outcome = self.apply_page(token, result);
            guard.disarm();
            outcome
        };
        let count = async {
            let result = self.store.count(&query.condition).await;
            self.apply_count(token, result);
        };

        let (outcome, ()) = tokio::join!(page, count);
        outcome
    }

    fn apply_page(
        &self,
        token: u64,
        result: Result<Vec<RecipeSummary>, QueryError>,
    ) -> PageOutcome {
        let mut session = self.session.lock();
        let state = &mut session.state;
        if state.token != token {
            debug!(token = token, current = state.token, "dropping stale page");
            return PageOutcome::Stale;
        }
        state.loading = false;

        match result {
            Ok(items) => {
                let appended = items.len();
                if appended < self.page_size as usize {
                    state.exhausted = true;
                }
                state.recipes.extend(items);
                state.page_index += 1;
                state.error = None;
                debug!(
                    token = token,
                    page = state.page_index,
                    appended = appended,
                    loaded = state.recipes.len(),
                    "page applied"
                );
                PageOutcome::Loaded { appended }
            }
            Err(e) => {
                warn!(token = token, page = state.page_index, error = %e, "page fetch failed");
                state.error = Some(e.clone());
                PageOutcome::Failed(e)
            }
        }
    }

    fn apply_count(&self, token: u64, result: Result<u64, QueryError>) {
        let mut session = self.session.lock();
        let state = &mut session.state;
        if state.token != token {
            debug!(token = token, current = state.token, "dropping stale count");
            return;
        }

        match result {
            Ok(total) => state.total = Some(total),
            Err(e) => warn!(token = token, error = %e, "recipe count failed"),
        }
    }

    /// Recipes loaded so far.
    pub fn recipes(&self) -> Vec<RecipeSummary> {
        self.session.lock().state.recipes.clone()
    }

    /// Number of pages loaded in the current session.
    pub fn page_index(&self) -> u32 {
        self.session.lock().state.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total matches, if a count has completed for the current session.
    pub fn total(&self) -> Option<u64> {
        self.session.lock().state.total
    }

    /// Error of the last failed page fetch.
    pub fn error(&self) -> Option<QueryError> {
        self.session.lock().state.error.clone()
    }

    pub fn snapshot_at(&self) -> DateTime<Utc> {
        self.session.lock().state.snapshot_at
    }

    pub fn has_more(&self) -> bool {
        self.session.lock().state.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.session.lock().state.loading
    }

    pub fn conditions(&self) -> FilterConditions {
        self.session.lock().state.conditions.clone()
    }

    /// A copy of the current state.
    pub fn state(&self) -> FeedState {
        self.session.lock().state.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{Language, RecipeRecord};
    use crate::store::MemoryStore;
    use chrono::Duration;
    use uuid::Uuid;

    fn feed_with(recipes: usize, page_size: u32) -> (Arc<MemoryStore>, RecipeFeed) {
        let store = Arc::new(MemoryStore::new());
        let household = Uuid::now_v7();
        let now = Utc::now();
        for i in 0..recipes {
            store.insert_recipe(RecipeRecord::new(
                household,
                format!("recipe {i}"),
                now - Duration::minutes(i as i64 + 1),
            ));
        }
        let feed = RecipeFeed::begin(
            store.clone(),
            QueryScope::new(household, Language::En),
            page_size,
            FilterConditions::default(),
        )
        .unwrap();
        (store, feed)
    }

    #[tokio::test]
    async fn loads_pages_until_exhausted() {
        let (_, feed) = feed_with(7, 3);

        assert_eq!(feed.load_next_page().await, PageOutcome::Loaded { appended: 3 });
        assert_eq!(feed.total(), Some(7));
        assert!(feed.has_more());
        assert_eq!(feed.load_next_page().await, PageOutcome::Loaded { appended: 3 });
        assert_eq!(feed.load_next_page().await, PageOutcome::Loaded { appended: 1 });
        assert!(!feed.has_more());
        assert_eq!(feed.page_index(), 3);
        assert_eq!(feed.recipes().len(), 7);
    }

    #[tokio::test]
    async fn condition_change_resets_synchronously() {
        let (_, feed) = feed_with(4, 3);
        feed.load_next_page().await;
        let first_snapshot = feed.snapshot_at();
        let token = feed.state().token;

        let conditions = FilterConditions {
            search_term: "recipe 1".to_string(),
            ..Default::default()
        };
        feed.on_condition_changed(conditions.clone()).unwrap();

        let state = feed.state();
        assert_eq!(state.page_index, 0);
        assert!(state.recipes.is_empty());
        assert_eq!(state.total, None);
        assert!(state.error.is_none());
        assert_eq!(state.token, token + 1);
        assert!(state.snapshot_at >= first_snapshot);
        assert_eq!(feed.conditions(), conditions);
    }

    #[test]
    fn nil_household_is_rejected() {
        let result = RecipeFeed::begin(
            Arc::new(MemoryStore::new()),
            QueryScope::new(Uuid::nil(), Language::En),
            5,
            FilterConditions::default(),
        );
        assert!(matches!(result, Err(QueryError::InvariantViolation(_))));
    }
}
