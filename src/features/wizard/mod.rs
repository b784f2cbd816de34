pub mod availability;
pub mod controller;
pub mod handlers;
pub mod photos;
pub mod pricing;
pub mod schemas;
pub mod sessions;
pub mod submission;
pub mod units;
pub mod validation;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::utilities::app_state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/wizards", post(handlers::create_wizard_handler))
        .route(
            "/api/v1/wizards/{wizard_id}",
            get(handlers::get_wizard_handler).delete(handlers::discard_wizard_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/form",
            patch(handlers::update_form_handler),
        )
        // Navigation
        .route(
            "/api/v1/wizards/{wizard_id}/next",
            post(handlers::next_step_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/previous",
            post(handlers::previous_step_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/goto",
            post(handlers::go_to_step_handler),
        )
        // Dimensions & pricing inputs
        .route(
            "/api/v1/wizards/{wizard_id}/units/toggle",
            post(handlers::toggle_units_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/dimensions/{field}",
            put(handlers::input_dimension_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/dimensions/{field}/blur",
            post(handlers::blur_dimension_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/pricing/{field}",
            put(handlers::input_pricing_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/pricing/{field}/blur",
            post(handlers::blur_pricing_handler),
        )
        // Photos
        .route(
            "/api/v1/wizards/{wizard_id}/photos",
            post(handlers::upload_photos_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/photos/cover",
            put(handlers::set_cover_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/photos/order",
            put(handlers::reorder_photos_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/photos/{image_id}",
            delete(handlers::remove_photo_handler),
        )
        // Availability
        .route(
            "/api/v1/wizards/{wizard_id}/availability",
            post(handlers::apply_availability_handler).delete(handlers::reset_availability_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/availability/default",
            put(handlers::default_availability_handler),
        )
        .route(
            "/api/v1/wizards/{wizard_id}/submit",
            post(handlers::submit_wizard_handler),
        )
}
