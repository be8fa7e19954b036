use crate::{
    AppState,
    auth::{create_token, require_user},
    dto::{AuthResponse, LoginRequest, SignupRequest, UserResponse},
    errors::ApiError,
    models::User,
};
use axum::{Json, extract::State, http::HeaderMap};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// POST /auth/signup
/// Body: { "email": "...", "username": "...", "password": "..." }
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let user_id = Uuid::new_v4();

    // Claim the email before the (slow) hash so concurrent signups can't
    // both win.
    match state.email_index.entry(email.clone()) {
        Entry::Occupied(_) => return Err(ApiError::UserAlreadyExists),
        Entry::Vacant(slot) => {
            slot.insert(user_id);
        }
    }

    let hashed_password = match hash(&payload.password, DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(e) => {
            state.email_index.remove(&email);
            return Err(ApiError::InternalError(format!(
                "Password hashing failed: {}",
                e
            )));
        }
    };

    let user = User {
        id: user_id,
        email,
        username: payload.username,
        hashed_password,
        created_at: Utc::now().timestamp(),
    };

    let token = create_token(&user.id, &user.email, &state.jwt_secret)?;
    state.users.insert(user.id, user.clone());

    info!("New user registered: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /auth/login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let user = state
        .email_index
        .get(&email)
        .and_then(|user_id| state.users.get(&*user_id).map(|u| u.clone()))
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = verify(&payload.password, &user.hashed_password)
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))?;

    if !valid {
        warn!("Failed login for {}", email);
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(&user.id, &user.email, &state.jwt_secret)?;

    info!("User logged in: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /users/me
/// Headers: Authorization: Bearer <token>
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = require_user(&headers, &state.jwt_secret)?;

    let user = state.users.get(&user_id).ok_or(ApiError::NotFound)?;

    Ok(Json(user.clone().into()))
}
