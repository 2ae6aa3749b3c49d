//! Session-cookie authentication.
//!
//! Passwords are stored as bcrypt hashes; verification and hashing run in
//! `spawn_blocking` since bcrypt is deliberately slow. Sessions are uuid
//! tokens held in an in-memory store for the lifetime of the server
//! process (restarting the server logs everyone out).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::error::HttpError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "castctl_session";

/// In-memory session token store: token -> user id.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, i64>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a user and return the opaque token.
    pub fn create(&self, user_id: i64) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.inner
            .lock()
            .expect("session store poisoned")
            .insert(token.clone(), user_id);
        token
    }

    /// Resolve a token to its user id, if the session exists.
    pub fn get(&self, token: &str) -> Option<i64> {
        self.inner
            .lock()
            .expect("session store poisoned")
            .get(token)
            .copied()
    }

    /// Invalidate a session. Unknown tokens are ignored.
    pub fn remove(&self, token: &str) {
        self.inner
            .lock()
            .expect("session store poisoned")
            .remove(token);
    }
}

/// Hash a password with bcrypt at the default cost.
pub async fn hash_password(password: String) -> Result<String, HttpError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
        .map_err(|e| HttpError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored bcrypt hash.
pub async fn verify_password(password: String, hash: String) -> Result<bool, HttpError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| HttpError::Internal(e.to_string()))?
        .map_err(|e| HttpError::Internal(format!("password verification failed: {e}")))
}

/// Extractor for authenticated requests.
///
/// Reads the session cookie and resolves it through the session store;
/// rejects with 401 when either is missing.
pub struct AuthedUser {
    pub user_id: i64,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(HttpError::Unauthorized)?;
        let user_id = state.sessions.get(&token).ok_or(HttpError::Unauthorized)?;
        Ok(Self { user_id, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trip() {
        let store = SessionStore::new();
        let token = store.create(7);
        assert_eq!(store.get(&token), Some(7));
        store.remove(&token);
        assert_eq!(store.get(&token), None);
    }

    #[test]
    fn remove_unknown_token_is_noop() {
        let store = SessionStore::new();
        store.remove("not-a-token");
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password("hunter2".to_string()).await.unwrap();
        assert!(verify_password("hunter2".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }
}
