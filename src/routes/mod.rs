mod activity;
mod checkout;
mod health;
mod toggle;
mod user;

use crate::{AppState, dto::ErrorBody};
use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
};
use std::time::Duration;
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

const MAX_BODY_BYTES: usize = 64 * 1024;

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorBody {
                error: "Request timed out".into(),
            }),
        );
    }
    error!("Unhandled middleware error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error".into(),
        }),
    )
}

/// Build the full service: routes, state and middleware.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public routes (no auth required)
        .route("/health", get(health::health_check))
        .route("/auth/signup", post(user::signup))
        .route("/auth/login", post(user::login))
        .route("/checkout", post(checkout::create_checkout))
        // Public reads on public tables, auth for writes and private tables
        .route(
            "/tables/{table}/rows",
            get(toggle::list_rows)
                .post(toggle::create_row)
                .delete(toggle::delete_rows),
        )
        .route("/tables/{table}/count", get(toggle::count_rows))
        // Protected routes (auth required)
        .route("/users/me", get(user::get_current_user))
        .route(
            "/activities",
            post(activity::record_activity).get(activity::list_activities),
        )
        // Add state and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(cors)
}
