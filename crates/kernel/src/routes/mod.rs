//! HTTP route handlers.

pub mod facets;
pub mod health;
pub mod meal_rules;
pub mod recipes;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Headroom on top of the query timeout before a request is abandoned.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Build the application router with request tracing and a request timeout.
pub fn app(state: AppState) -> Router {
    let request_timeout = state.config().query_timeout + REQUEST_TIMEOUT_MARGIN;

    Router::new()
        .merge(health::router())
        .merge(facets::router())
        .merge(recipes::router())
        .merge(meal_rules::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
