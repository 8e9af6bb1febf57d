//! Feed state and page outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::QueryError;
use crate::filter::FilterConditions;
use crate::models::RecipeSummary;

/// Paginated state of one filter session.
#[derive(Debug, Clone, Serialize)]
pub struct FeedState {
    /// Selection the session was compiled from.
    pub conditions: FilterConditions,

    /// Pages loaded so far; the next fetch starts at `page_index * page_size`.
    pub page_index: u32,

    pub page_size: u32,

    /// Upper bound on `created_at` for every recipe of the session.
    pub snapshot_at: DateTime<Utc>,

    /// Recipes loaded so far, in result order. Only ever appended to.
    pub recipes: Vec<RecipeSummary>,

    /// Total matches, once a count has completed for this session.
    pub total: Option<u64>,

    /// Error of the last failed page fetch.
    #[serde(skip)]
    pub error: Option<QueryError>,

    /// Session token; bumped on every reset.
    pub token: u64,

    /// Whether a page fetch is in flight for this session.
    pub loading: bool,

    /// Set once a page came back short.
    pub exhausted: bool,
}

impl FeedState {
    pub(super) fn new(
        conditions: FilterConditions,
        page_size: u32,
        snapshot_at: DateTime<Utc>,
        token: u64,
    ) -> Self {
        Self {
            conditions,
            page_index: 0,
            page_size,
            snapshot_at,
            recipes: Vec::new(),
            total: None,
            error: None,
            token,
            loading: false,
            exhausted: false,
        }
    }

    /// Whether another page may exist.
    pub fn has_more(&self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.total {
            Some(total) => (self.recipes.len() as u64) < total,
            None => true,
        }
    }

    /// Offset of the next page.
    pub(super) fn next_offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }
}

/// Result of [`super::RecipeFeed::load_next_page`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The page was appended.
    Loaded { appended: usize },

    /// The session changed while the page was loading; the result was dropped.
    Stale,

    /// A page is already loading for this session.
    InFlight,

    /// The fetch failed. State is unchanged, so loading again retries the
    /// same offset.
    Failed(QueryError),
}
