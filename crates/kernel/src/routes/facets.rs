//! Facet catalog endpoint.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::FacetCatalog;
use crate::state::AppState;

/// Create the facet router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/household/{household_id}/facets", get(list_facets))
}

/// Every facet the household can filter by, each list sorted by name.
async fn list_facets(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
) -> AppResult<Json<FacetCatalog>> {
    if state.store().find_household(household_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let catalog = state.facets().facets(household_id).await?;
    Ok(Json(FacetCatalog::clone(&catalog)))
}
