//! Recipe query endpoint.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::post;
use uuid::Uuid;

use crate::error::AppResult;
use crate::query::{PageRequest, RecipePage};
use crate::state::AppState;

/// Create the recipe query router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/household/{household_id}/recipes/query",
        post(query_recipes),
    )
}

/// Execute one page of a filter selection.
///
/// The first request omits `snapshot_at`; later pages send back the one
/// returned with the first page so results stay stable.
async fn query_recipes(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
    Json(request): Json<PageRequest>,
) -> AppResult<Json<RecipePage>> {
    let page = state.recipes().page(household_id, request).await?;
    Ok(Json(page))
}
