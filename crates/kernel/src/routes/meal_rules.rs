//! Meal rule endpoints.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DeviceClass;
use crate::error::{AppError, AppResult};
use crate::models::MealRule;
use crate::query::RecipePage;
use crate::state::AppState;

/// Create the meal rule router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/household/{household_id}/meal-rules",
            get(list_meal_rules),
        )
        .route(
            "/api/household/{household_id}/meal-rules/{rule_id}/recipes",
            get(meal_rule_recipes),
        )
}

#[derive(Serialize)]
struct MealRuleResponse {
    #[serde(flatten)]
    rule: MealRule,
    active_criteria: usize,
}

#[derive(Debug, Deserialize)]
struct CandidatesParams {
    #[serde(default)]
    page: u32,
    snapshot_at: Option<DateTime<Utc>>,
    #[serde(default)]
    device: DeviceClass,
}

async fn list_meal_rules(
    State(state): State<AppState>,
    Path(household_id): Path<Uuid>,
) -> AppResult<Json<Vec<MealRuleResponse>>> {
    if state.store().find_household(household_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let rules = state.store().list_meal_rules(household_id).await?;
    Ok(Json(
        rules
            .into_iter()
            .map(|rule| MealRuleResponse {
                active_criteria: rule.conditions.active_criteria_count(),
                rule,
            })
            .collect(),
    ))
}

/// One page of recipes matching a saved meal rule.
async fn meal_rule_recipes(
    State(state): State<AppState>,
    Path((household_id, rule_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<CandidatesParams>,
) -> AppResult<Json<RecipePage>> {
    let page = state
        .recipes()
        .meal_rule_candidates(
            household_id,
            rule_id,
            params.page,
            params.snapshot_at,
            params.device,
        )
        .await?;
    Ok(Json(page))
}
