//! Facet catalog loading with an in-process cache.
//!
//! Facets change rarely compared to how often filter panels are opened, so
//! each household's catalog is kept in a Moka cache for the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

use crate::error::QueryError;
use crate::models::FacetCatalog;
use crate::store::FacetSource;

/// Maximum number of cached household catalogs.
const MAX_CACHED_HOUSEHOLDS: u64 = 10_000;

/// Cached facet catalog access.
#[derive(Clone)]
pub struct FacetService {
    inner: Arc<FacetServiceInner>,
}

struct FacetServiceInner {
    source: Arc<dyn FacetSource>,
    cache: Cache<Uuid, Arc<FacetCatalog>>,
}

impl FacetService {
    /// Create a service over a facet source. Catalogs expire after `ttl`.
    pub fn new(source: Arc<dyn FacetSource>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CACHED_HOUSEHOLDS)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(FacetServiceInner { source, cache }),
        }
    }

    /// The facet catalog of a household, each list sorted by name.
    ///
    /// Load failures are not cached.
    pub async fn facets(&self, household_id: Uuid) -> Result<Arc<FacetCatalog>, QueryError> {
        if let Some(catalog) = self.inner.cache.get(&household_id).await {
            debug!(household = %household_id, "facet catalog cache hit");
            return Ok(catalog);
        }

        let mut catalog = self.inner.source.load_facets(household_id).await?;
        catalog.sort();
        let catalog = Arc::new(catalog);
        self.inner
            .cache
            .insert(household_id, Arc::clone(&catalog))
            .await;

        debug!(household = %household_id, empty = catalog.is_empty(), "facet catalog loaded");
        Ok(catalog)
    }

    /// Drop a household's cached catalog so the next read reloads it.
    pub async fn invalidate(&self, household_id: Uuid) {
        self.inner.cache.invalidate(&household_id).await;
        debug!(household = %household_id, "facet catalog invalidated");
    }
}
