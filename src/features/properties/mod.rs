pub mod handlers;
pub mod models;
pub mod repository;
pub mod schemas;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/dashboard/properties",
            get(handlers::get_dashboard_properties_handler),
        )
        .route(
            "/api/v1/properties",
            get(handlers::get_many_properties_handler),
        )
        .route(
            "/api/v1/properties/{property_id}",
            get(handlers::get_one_property_handler),
        )
        .route(
            "/api/v1/properties/{property_id}/status",
            patch(handlers::update_property_status_handler),
        )
        .route(
            "/api/v1/properties/{property_id}/photos",
            post(handlers::add_property_photos_handler),
        )
}
