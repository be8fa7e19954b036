use crate::{
    AppState,
    dto::{CheckoutRequest, CheckoutResponse},
    errors::ApiError,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, warn};
use validator::Validate;

/// POST /checkout
/// Body: { "priceId": "..." | "lineItems": [...], "successUrl": "...", "cancelUrl": "..." }
/// Response: { "sessionId": "...", "url": "..." }
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    if state.checkout_limiter.check().is_err() {
        warn!("Checkout rate limit exceeded");
        return Err(ApiError::RateLimited);
    }

    let Json(payload) = payload.map_err(|e| ApiError::ValidationError(e.body_text()))?;
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let session = state.payments.create_session(&payload).await?;

    info!("Checkout session issued: {}", session.session_id);

    Ok(Json(session))
}
