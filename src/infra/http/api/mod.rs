pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::{ApiState, StoreHealth};

use axum::{
    Router,
    routing::{get, post},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/listings",
            get(handlers::search_listings).post(handlers::create_listing),
        )
        .route("/api/listings/mine", get(handlers::search_my_listings))
        .route(
            "/api/listings/{id}",
            get(handlers::get_listing)
                .patch(handlers::update_listing)
                .delete(handlers::delete_listing),
        )
        .route(
            "/api/listings/{id}/similar",
            get(handlers::similar_listings),
        )
        .route(
            "/api/listings/{id}/status",
            post(handlers::update_listing_status),
        )
        .with_state(state)
}
