//! Authentication, roles and the request principal.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - The closed set of account roles
//! - `Principal`, the authenticated caller of one request

mod password;

pub use password::{PasswordError, hash_password, verify_decoy, verify_password};

use campus_shared::{SchoolId, UserId};
use serde::{Deserialize, Serialize};

/// Account roles.
///
/// Every policy decision matches on this enum exhaustively, so adding a role
/// is a compile-time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Platform administrator, not bound to any school.
    Admin,
    /// The account that administers one school.
    School,
    /// A teacher of one school.
    Teacher,
    /// A student of one school.
    Student,
    /// Non-teaching staff of one school.
    Staff,
}

impl Role {
    /// All roles, in display order.
    pub const ALL: [Self; 5] = [
        Self::Admin,
        Self::School,
        Self::Teacher,
        Self::Student,
        Self::Staff,
    ];

    /// Returns the canonical name used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::School => "School",
            Self::Teacher => "Teacher",
            Self::Student => "Student",
            Self::Staff => "Staff",
        }
    }

    /// Returns true if accounts with this role must belong to a school.
    #[must_use]
    pub const fn requires_school(&self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Returns true if this role may create or edit accounts of `target` role.
    ///
    /// Admins manage every account; a School manages the people of its school.
    #[must_use]
    pub const fn can_assign(&self, target: Self) -> bool {
        match self {
            Self::Admin => true,
            Self::School => matches!(target, Self::Teacher | Self::Student | Self::Staff),
            Self::Teacher | Self::Student | Self::Staff => false,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role")]
pub struct UnknownRole;

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or(UnknownRole)
    }
}

/// The authenticated caller of a request.
///
/// Built from a fresh account lookup on every request and dropped with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Account ID.
    pub user_id: UserId,
    /// Current role.
    pub role: Role,
    /// Home school; always `None` for `Admin`.
    pub home_school_id: Option<SchoolId>,
}

impl Principal {
    /// Creates a principal, discarding any school attached to an admin account.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role, school_id: Option<SchoolId>) -> Self {
        let home_school_id = match role {
            Role::Admin => None,
            Role::School | Role::Teacher | Role::Student | Role::Staff => school_id,
        };
        Self {
            user_id,
            role,
            home_school_id,
        }
    }

    /// Returns true for platform administrators.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Returns true if this principal's home school is `school_id`.
    #[must_use]
    pub fn belongs_to(&self, school_id: SchoolId) -> bool {
        self.home_school_id == Some(school_id)
    }
}
