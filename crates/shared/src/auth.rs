//! Authentication payloads shared by the API and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SchoolId, UserId};

/// JWT claims for access tokens.
///
/// Only the subject is trusted from the token; role and school are re-read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.sub
    }
}

/// Login request payload.
///
/// Fields are optional so a missing one is reported as a validation error
/// rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    /// Account username.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token (valid for about an hour).
    pub token: String,
    /// Role name, e.g. `School`.
    pub role: String,
    /// Account username.
    pub username: String,
    /// Home school, absent for platform admins.
    pub school_id: Option<SchoolId>,
}

/// Current user details (`GET /api/users/me`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    /// Account ID.
    pub user_id: UserId,
    /// Account username.
    pub username: String,
    /// Role name.
    pub role: String,
    /// Home school, absent for platform admins.
    pub school_id: Option<SchoolId>,
}

/// Self-service password change (`POST /api/users/reset-password`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// The password currently on the account.
    pub current_password: Option<String>,
    /// The replacement password.
    pub new_password: Option<String>,
}

/// Password change performed on another account (`PUT /api/users/{id}/change-password`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// The replacement password.
    pub new_password: Option<String>,
}
