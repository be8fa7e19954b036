use crate::{
    AppState,
    auth::require_user,
    errors::ApiError,
    models::{ActivityRecord, NewActivity},
    remote::RemoteStore,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct FeedParams {
    #[validate(range(min = 1, max = 200))]
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

fn default_feed_limit() -> usize {
    50
}

/// POST /activities
/// Headers: Authorization: Bearer <token>
/// Body: { "kind": "like", "targetType": "topic", "targetId": "..." }
pub async fn record_activity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewActivity>,
) -> Result<(StatusCode, Json<ActivityRecord>), ApiError> {
    let user_id = require_user(&headers, &state.jwt_secret)?;
    if payload.target_id.trim().is_empty() {
        return Err(ApiError::ValidationError("targetId is required".into()));
    }

    let record = state.store.record_activity(user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /activities?limit=50
/// Headers: Authorization: Bearer <token>
///
/// The caller's own feed, newest first.
pub async fn list_activities(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    params
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;
    let user_id = require_user(&headers, &state.jwt_secret)?;

    let mut feed = state.store.activities_for(user_id);
    feed.truncate(params.limit);
    Ok(Json(feed))
}
