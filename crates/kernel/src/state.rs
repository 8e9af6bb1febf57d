//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::catalog::FacetService;
use crate::config::Config;
use crate::db;
use crate::error::QueryError;
use crate::models::FacetCatalog;
use crate::query::RecipeQueryService;
use crate::store::{FacetSource, PantryStore, PgStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool, absent when running over another store.
    db: Option<PgPool>,

    /// Backing store for households, recipes and meal rules.
    store: Arc<dyn PantryStore>,

    /// Cached facet catalogs.
    facets: FacetService,

    /// Stateless recipe page execution.
    recipes: RecipeQueryService,

    config: Config,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and build the services.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations applied");

        let store = Arc::new(PgStore::new(pool.clone(), config.query_timeout));
        Ok(Self::build(Some(pool), store, config.clone()))
    }

    /// Build state over any store, e.g. [`crate::store::MemoryStore`].
    pub fn from_store<S>(store: Arc<S>, config: Config) -> Self
    where
        S: PantryStore + 'static,
    {
        Self::build(None, store, config)
    }

    fn build(db: Option<PgPool>, store: Arc<dyn PantryStore>, config: Config) -> Self {
        let source = Arc::new(StoreFacets(Arc::clone(&store)));
        let facets = FacetService::new(source, config.facet_cache_ttl);
        let recipes = RecipeQueryService::new(Arc::clone(&store), &config);

        Self {
            inner: Arc::new(AppStateInner {
                db,
                store,
                facets,
                recipes,
                config,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn PantryStore> {
        &self.inner.store
    }

    pub fn facets(&self) -> &FacetService {
        &self.inner.facets
    }

    pub fn recipes(&self) -> &RecipeQueryService {
        &self.inner.recipes
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Check if PostgreSQL is reachable. Always true without a pool.
    pub async fn postgres_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => true,
        }
    }
}

/// A whole store seen as its facet source.
struct StoreFacets(Arc<dyn PantryStore>);

#[async_trait]
impl FacetSource for StoreFacets {
    async fn load_facets(
        &self,
        household_id: Uuid,
    ) -> std::result::Result<FacetCatalog, QueryError> {
        self.0.load_facets(household_id).await
    }
}
