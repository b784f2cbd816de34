pub mod features;
pub mod services;
pub mod utilities;

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, warn};

use crate::{features::wizard::photos::MAX_FILE_SIZE, utilities::app_state::AppState};

/// Largest multipart body accepted: a batch of ten photos plus form overhead.
pub const MAX_BODY_SIZE: usize = 10 * MAX_FILE_SIZE + 1024 * 1024;

fn cors_layer(frontend_endpoint: &str) -> CorsLayer {
    let origin = match frontend_endpoint.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            warn!("invalid FRONTEND_ENDPOINT {}: {}", frontend_endpoint, e);
            AllowOrigin::list(Vec::new())
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_endpoint);

    Router::new()
        .merge(features::wizard::routes())
        .merge(features::properties::routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
