//! Who is signed in on this client.

use std::sync::RwLock;

use tracing::info;
use uuid::Uuid;

/// Exposes the signed-in user. "No user" is a precondition failure for
/// mutating operations, never something to retry.
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;

    /// Bearer token for the remote service, when one was issued.
    fn access_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub token: Option<String>,
}

/// In-memory sign-in state shared by stores and the HTTP client.
#[derive(Debug, Default)]
pub struct Session {
    inner: RwLock<Option<SessionInfo>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: Uuid) -> Self {
        let session = Self::new();
        session.sign_in(user_id, None);
        session
    }

    pub fn sign_in(&self, user_id: Uuid, token: Option<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(SessionInfo { user_id, token });
        info!("Session started for user {}", user_id);
    }

    pub fn sign_out(&self) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if let Some(info) = guard.take() {
            info!("Session ended for user {}", info.user_id);
        }
    }

    pub fn info(&self) -> Option<SessionInfo> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SessionProvider for Session {
    fn current_user(&self) -> Option<Uuid> {
        self.info().map(|info| info.user_id)
    }

    fn access_token(&self) -> Option<String> {
        self.info().and_then(|info| info.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_and_out() {
        let session = Session::new();
        assert_eq!(session.current_user(), None);

        let user = Uuid::new_v4();
        session.sign_in(user, Some("tok".into()));
        assert_eq!(session.current_user(), Some(user));
        assert_eq!(session.access_token().as_deref(), Some("tok"));

        session.sign_out();
        assert_eq!(session.current_user(), None);
        assert_eq!(session.access_token(), None);
    }
}
