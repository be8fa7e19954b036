use crate::errors::ApiError;
use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub email: String,
    pub exp: usize,
}

pub fn create_token(user_id: &Uuid, email: &str, secret: &str) -> Result<String, ApiError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| ApiError::InternalError("Failed to calculate expiration".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::InternalError(format!("Token Creation failed: {}", e)))
}

pub fn validate_token(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    // Check for "Bearer " prefix
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

/// The caller's user id; 401 without a valid bearer token.
pub fn require_user(headers: &HeaderMap, secret: &str) -> Result<Uuid, ApiError> {
    let claims = validate_token(headers, secret)?;
    Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)
}

/// The caller's user id when a bearer token is present. A token that is
/// present but invalid is still a 401.
pub fn optional_user(headers: &HeaderMap, secret: &str) -> Result<Option<Uuid>, ApiError> {
    if headers.contains_key(header::AUTHORIZATION) {
        require_user(headers, secret).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn token_round_trips_user_id() {
        let user = Uuid::new_v4();
        let token = create_token(&user, "a@example.com", "secret").unwrap();

        assert_eq!(require_user(&bearer(&token), "secret").unwrap(), user);
    }

    #[test]
    fn wrong_secret_or_scheme_is_unauthorized() {
        let token = create_token(&Uuid::new_v4(), "a@example.com", "secret").unwrap();
        assert!(matches!(
            require_user(&bearer(&token), "other"),
            Err(ApiError::Unauthorized)
        ));

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            validate_token(&basic, "secret"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn optional_user_distinguishes_absent_from_invalid() {
        assert_eq!(optional_user(&HeaderMap::new(), "secret").unwrap(), None);
        assert!(optional_user(&bearer("garbage"), "secret").is_err());
    }
}
