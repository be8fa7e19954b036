use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::{RemoteError, RemoteStore, ToggleFilter};
use crate::dto::{
    AuthResponse, CountResponse, CreateToggleRequest, DeletedResponse, ErrorBody, LoginRequest,
    SignupRequest, ToggleQuery,
};
use crate::models::{ActivityRecord, NewActivity, NewToggle, Table, ToggleRecord};
use crate::session::SessionProvider;

/// Client for the service's REST surface.
///
/// Rows are decoded straight into typed records; anything that does not fit
/// the expected shape is a [`RemoteError::Decode`].
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn rows_url(&self, table: Table) -> String {
        self.url(&format!("/tables/{}/rows", table))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, RemoteError> {
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RemoteError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }
}

/// An explicitly empty `target_ids` list can match nothing.
fn matches_nothing(filter: &ToggleFilter) -> bool {
    filter.target_ids.as_ref().is_some_and(|ids| ids.is_empty())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()));
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    debug!("remote request failed with {}: {}", status, message);

    Err(match status {
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        StatusCode::CONFLICT => RemoteError::Conflict,
        _ => RemoteError::Rejected {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn select(
        &self,
        table: Table,
        filter: &ToggleFilter,
    ) -> Result<Vec<ToggleRecord>, RemoteError> {
        if matches_nothing(filter) {
            return Ok(Vec::new());
        }
        let request = self
            .client
            .get(self.rows_url(table))
            .query(&ToggleQuery::from(filter).to_pairs());
        let response = self.authorized(request).send().await?;
        decode(response).await
    }

    async fn insert(&self, table: Table, row: NewToggle) -> Result<ToggleRecord, RemoteError> {
        // The service takes the owner from the bearer token.
        if self.session.current_user() != Some(row.user_id) {
            return Err(RemoteError::Unauthorized);
        }
        let request = self
            .client
            .post(self.rows_url(table))
            .json(&CreateToggleRequest::from(row.target));
        let response = self.authorized(request).send().await?;
        decode(response).await
    }

    async fn delete(&self, table: Table, filter: &ToggleFilter) -> Result<usize, RemoteError> {
        if matches_nothing(filter) {
            return Ok(0);
        }
        let request = self
            .client
            .delete(self.rows_url(table))
            .query(&ToggleQuery::from(filter).to_pairs());
        let response = self.authorized(request).send().await?;
        let body: DeletedResponse = decode(response).await?;
        Ok(body.deleted)
    }

    async fn count(&self, table: Table, filter: &ToggleFilter) -> Result<u64, RemoteError> {
        if matches_nothing(filter) {
            return Ok(0);
        }
        let request = self
            .client
            .get(self.url(&format!("/tables/{}/count", table)))
            .query(&ToggleQuery::from(filter).to_pairs());
        let response = self.authorized(request).send().await?;
        let body: CountResponse = decode(response).await?;
        Ok(body.count)
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
    ) -> Result<ActivityRecord, RemoteError> {
        if self.session.current_user() != Some(user_id) {
            return Err(RemoteError::Unauthorized);
        }
        let request = self.client.post(self.url("/activities")).json(&activity);
        let response = self.authorized(request).send().await?;
        decode(response).await
    }
}
