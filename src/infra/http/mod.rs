pub mod api;
mod middleware;

pub use api::{ApiState, StoreHealth, build_api_router};
pub use middleware::RequestContext;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware, routing::get};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

async fn db_health(State(state): State<ApiState>) -> Response {
    db_health_response(state.health.check().await)
}

/// Full application router: listing API, health probe and response logging.
pub fn build_router(state: ApiState) -> Router {
    let health = Router::new()
        .route("/_health/db", get(db_health))
        .with_state(state.clone());

    build_api_router(state)
        .merge(health)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
