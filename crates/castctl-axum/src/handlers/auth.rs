//! Account handlers - registration, login, session management.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use castctl_core::{NewUser, RepositoryError};

use crate::auth::{AuthedUser, SESSION_COOKIE, hash_password, verify_password};
use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub secret_code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
    pub secret_code: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// Register a new account, gated by the instance secret code.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    if req.secret_code != state.secret_code {
        return Err(HttpError::Forbidden("Invalid secret code".to_string()));
    }
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(HttpError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(req.password).await?;
    state
        .repos
        .users
        .insert(&NewUser {
            username: req.username,
            password_hash,
        })
        .await?;

    Ok(message("Registration successful"))
}

/// Log in and receive a session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), HttpError> {
    // Unknown user and wrong password are indistinguishable to the caller.
    let user = match state.repos.users.get_by_username(&req.username).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound(_)) => return Err(HttpError::Unauthorized),
        Err(e) => return Err(e.into()),
    };

    if !verify_password(req.password, user.password_hash.clone()).await? {
        return Err(HttpError::Unauthorized);
    }

    let token = state.sessions.create(user.id);
    tracing::info!(user_id = user.id, "user logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build();
    Ok((jar.add(cookie), message("Login successful")))
}

/// Log out: invalidate the session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthedUser,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    state.sessions.remove(&user.token);
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, message("Logged out"))
}

/// Change the current user's password, gated by the secret code.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    if req.secret_code != state.secret_code {
        return Err(HttpError::Forbidden("Invalid secret code".to_string()));
    }
    if req.new_password.is_empty() {
        return Err(HttpError::BadRequest("Password must not be empty".to_string()));
    }

    let password_hash = hash_password(req.new_password).await?;
    state
        .repos
        .users
        .set_password_hash(user.user_id, &password_hash)
        .await?;

    Ok(message("Password changed"))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
}

/// Identify the current session.
pub async fn me(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<Json<MeResponse>, HttpError> {
    let record = state.repos.users.get_by_id(user.user_id).await?;
    Ok(Json(MeResponse {
        user_id: record.id,
        username: record.username,
    }))
}
