//! Recipe query request and result types.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::RecipeOrder;
use crate::config::DeviceClass;
use crate::filter::FilterConditions;
use crate::models::RecipeSummary;

/// One page request against a household's recipes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub conditions: FilterConditions,

    /// Snapshot returned with the first page. Absent on a first page.
    #[serde(default)]
    pub snapshot_at: Option<DateTime<Utc>>,

    /// Zero-based page index.
    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub device: DeviceClass,
}

/// Result of a page request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePage {
    pub items: Vec<RecipeSummary>,

    /// Matches for the condition, ignoring pagination. `None` when the count
    /// could not be evaluated.
    pub total: Option<u64>,

    /// Zero-based page index.
    pub page: u32,

    pub per_page: u32,

    /// Snapshot to send back with the following pages.
    pub snapshot_at: DateTime<Utc>,

    /// Whether another page exists.
    pub has_more: bool,

    /// Number of selected facet criteria.
    pub active_criteria: usize,
}

impl RecipePage {
    /// Create a page with paging calculations.
    pub fn new(
        items: Vec<RecipeSummary>,
        total: Option<u64>,
        page: u32,
        per_page: u32,
        snapshot_at: DateTime<Utc>,
        active_criteria: usize,
    ) -> Self {
        let seen = u64::from(page) * u64::from(per_page) + items.len() as u64;
        let has_more = match total {
            Some(total) => seen < total,
            // Without a count, a full page suggests more
            None => items.len() as u32 == per_page && per_page > 0,
        };

        Self {
            items,
            total,
            page,
            per_page,
            snapshot_at,
            has_more,
            active_criteria,
        }
    }
}

/// Sort summaries in result order: score DESC (relevance only), then
/// `created_at` DESC, then id DESC.
pub fn sort_summaries(order: &RecipeOrder, items: &mut [RecipeSummary]) {
    items.sort_by(|a, b| {
        let by_score = match order {
            RecipeOrder::Relevance { .. } => b
                .score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0)),
            RecipeOrder::Newest => Ordering::Equal,
        };
        by_score
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}
