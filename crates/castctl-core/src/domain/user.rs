//! User account domain types.

use serde::{Deserialize, Serialize};

/// A persisted user account.
///
/// The password hash is a bcrypt string produced at registration time;
/// it never leaves the server (serialization skips it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
}

/// A user account to be inserted (no ID yet).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Already-hashed password; hashing happens at the HTTP boundary.
    pub password_hash: String,
}
