#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP route integration tests.
//!
//! Runs the router over the in-memory kitchen with `tower::ServiceExt`.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use pantry_kernel::config::Config;
use pantry_kernel::filter::{BoolOperator, FilterConditions, FilterGroup};
use pantry_kernel::models::MealRule;
use pantry_kernel::routes;
use pantry_kernel::state::AppState;
use pantry_test_utils::{Kitchen, kitchen};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn app(kitchen: &Kitchen) -> Router {
    routes::app(AppState::from_store(kitchen.store.clone(), Config::local()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_healthy_without_database() {
    let kitchen = kitchen();
    let (status, body) = send(app(&kitchen), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn facets_are_sorted_by_name() {
    let kitchen = kitchen();
    let uri = format!("/api/household/{}/facets", kitchen.household.id);
    let (status, body) = send(app(&kitchen), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    let tags: Vec<&str> = body["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["quick", "vegan"]);
    assert_eq!(body["meals"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn facets_of_unknown_household_are_not_found() {
    let kitchen = kitchen();
    let uri = format!("/api/household/{}/facets", Uuid::now_v7());
    let (status, _) = send(app(&kitchen), get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_pages_with_snapshot() {
    let kitchen = kitchen();
    let uri = format!("/api/household/{}/recipes/query", kitchen.household.id);

    let (status, first) = send(
        app(&kitchen),
        post_json(&uri, &json!({ "device": "mobile" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().unwrap().len(), 5);
    assert_eq!(first["total"], 12);
    assert_eq!(first["per_page"], 5);
    assert_eq!(first["has_more"], true);

    let (status, second) = send(
        app(&kitchen),
        post_json(
            &uri,
            &json!({
                "device": "mobile",
                "page": 2,
                "snapshot_at": first["snapshot_at"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["items"].as_array().unwrap().len(), 2);
    assert_eq!(second["has_more"], false);
    assert_eq!(second["snapshot_at"], first["snapshot_at"]);
}

#[tokio::test]
async fn query_applies_conditions() {
    let kitchen = kitchen();
    let uri = format!("/api/household/{}/recipes/query", kitchen.household.id);
    let body = json!({
        "conditions": {
            "include_operator": "and",
            "include": {
                "tags": { "operator": "and", "items": [kitchen.quick.id] },
                "meals": { "operator": "or", "items": [kitchen.breakfast.id] }
            }
        }
    });

    let (status, page) = send(app(&kitchen), post_json(&uri, &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["active_criteria"], 2);
    let first = &page["items"][0];
    assert_eq!(first["name"], "Scrambled Eggs");
    assert_eq!(first["meals"][0]["name"], "breakfast");
    assert_eq!(first["ingredient_count"], 1);
}

#[tokio::test]
async fn query_rejects_malformed_body() {
    let kitchen = kitchen();
    let uri = format!("/api/household/{}/recipes/query", kitchen.household.id);
    let body = json!({ "conditions": { "include_operator": "xor" } });

    let (status, _) = send(app(&kitchen), post_json(&uri, &body)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn meal_rule_candidates_use_saved_conditions() {
    let kitchen = kitchen();
    let mut conditions = FilterConditions::default();
    conditions.include.meals = FilterGroup::new(BoolOperator::And, [kitchen.dinner.id]);
    conditions.exclude.tags = [kitchen.vegan.id].into();

    let rule = MealRule {
        id: Uuid::now_v7(),
        household_id: kitchen.household.id,
        name: "Weeknight dinner".to_string(),
        conditions,
        created_at: Utc::now(),
    };
    kitchen.store.insert_meal_rule(rule.clone());

    let list_uri = format!("/api/household/{}/meal-rules", kitchen.household.id);
    let (status, rules) = send(app(&kitchen), get(&list_uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rules[0]["name"], "Weeknight dinner");
    assert_eq!(rules[0]["active_criteria"], 2);

    let uri = format!(
        "/api/household/{}/meal-rules/{}/recipes?page=0",
        kitchen.household.id, rule.id
    );
    let (status, page) = send(app(&kitchen), get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 5);

    let missing = format!(
        "/api/household/{}/meal-rules/{}/recipes",
        kitchen.household.id,
        Uuid::now_v7()
    );
    let (status, _) = send(app(&kitchen), get(&missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
