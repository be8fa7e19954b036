use crate::{
    AppState,
    auth::{optional_user, require_user},
    dto::{CountResponse, CreateToggleRequest, DeletedResponse, ToggleQuery},
    errors::ApiError,
    models::{NewToggle, Table, Target, ToggleRecord},
    remote::{RemoteStore, ToggleFilter},
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use axum_extra::extract::Query;
use tracing::info;
use validator::Validate;

const MAX_ROWS: usize = 1000;

fn parse_table(raw: &str) -> Result<Table, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// Reads on private tables are limited to the caller's own rows.
fn read_filter(
    state: &AppState,
    headers: &HeaderMap,
    table: Table,
    query: ToggleQuery,
) -> Result<ToggleFilter, ApiError> {
    let caller = optional_user(headers, &state.jwt_secret)?;
    let mut filter = ToggleFilter::from(query);

    if table.is_private() {
        filter.user_id = Some(caller.ok_or(ApiError::Unauthorized)?);
    }
    filter.limit = Some(filter.limit.unwrap_or(MAX_ROWS).min(MAX_ROWS));
    Ok(filter)
}

/// GET /tables/{table}/rows?user_id=&target_type=&target_id=&target_ids=a&target_ids=b&search=&order=&offset=&limit=
///
/// At most 1000 rows per request; page with `offset`.
pub async fn list_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ToggleQuery>,
) -> Result<Json<Vec<ToggleRecord>>, ApiError> {
    let table = parse_table(&table)?;
    let filter = read_filter(&state, &headers, table, query)?;

    let rows = state.store.select(table, &filter).await?;
    Ok(Json(rows))
}

/// GET /tables/{table}/count (same query as rows)
pub async fn count_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ToggleQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let table = parse_table(&table)?;
    let filter = read_filter(&state, &headers, table, query)?;

    let count = state.store.count(table, &filter).await?;
    Ok(Json(CountResponse { count }))
}

/// POST /tables/{table}/rows
/// Headers: Authorization: Bearer <token>
/// Body: { "targetType": "topic", "targetId": "..." }
pub async fn create_row(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateToggleRequest>,
) -> Result<(StatusCode, Json<ToggleRecord>), ApiError> {
    let table = parse_table(&table)?;
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;
    let user_id = require_user(&headers, &state.jwt_secret)?;

    let row = NewToggle {
        user_id,
        target: Target::new(payload.target_type, payload.target_id),
    };
    let record = state.store.insert(table, row).await?;

    info!("{} row created: {} by user {}", table, record.target(), user_id);

    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /tables/{table}/rows?target_type=&target_id=
/// Headers: Authorization: Bearer <token>
///
/// Only ever deletes the caller's own rows.
pub async fn delete_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ToggleQuery>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let table = parse_table(&table)?;
    let user_id = require_user(&headers, &state.jwt_secret)?;

    let mut filter = ToggleFilter::from(query);
    if filter.target_type.is_none() || (filter.target_id.is_none() && filter.target_ids.is_none())
    {
        return Err(ApiError::ValidationError(
            "target_type and target_id (or target_ids) are required".into(),
        ));
    }
    filter.user_id = Some(user_id);

    let deleted = state.store.delete(table, &filter).await?;

    info!("{} {} rows deleted by user {}", deleted, table, user_id);

    Ok(Json(DeletedResponse { deleted }))
}
