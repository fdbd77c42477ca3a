//! The static access-rule table and the policy evaluator.

use serde::{Deserialize, Serialize};

use super::error::AccessError;
use super::kind::{Action, EntityKind, Party};
use super::scope::Scope;
use crate::auth::{Principal, Role};

/// How rows of a kind are owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scoping {
    /// Owned by a school only.
    Tenant,
    /// Owned by one user only, whatever the school.
    SelfScoped,
    /// Owned by a school and, for reads, by the person the row is about.
    TenantAndSelf,
}

/// Access rule for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRule {
    /// Ownership classification.
    pub scoping: Scoping,
    /// Only Admin may create, update or delete.
    pub admin_only_writes: bool,
    /// Roles that may read rows they personally own.
    pub self_readers: &'static [Role],
    /// Non-School roles that may read every row of their own school.
    pub member_readers: &'static [Role],
    /// A role that may read and write rows about one party within its school
    /// (teachers marking student attendance).
    pub roster: Option<(Role, Party)>,
}

impl AccessRule {
    const fn tenant() -> Self {
        Self {
            scoping: Scoping::Tenant,
            admin_only_writes: false,
            self_readers: &[],
            member_readers: &[],
            roster: None,
        }
    }

    const fn tenant_and_self(self_readers: &'static [Role]) -> Self {
        Self {
            scoping: Scoping::TenantAndSelf,
            self_readers,
            ..Self::tenant()
        }
    }

    fn reads_self(&self, role: Role) -> bool {
        !matches!(self.scoping, Scoping::Tenant) && self.self_readers.contains(&role)
    }

    fn reads_school(&self, role: Role) -> bool {
        !matches!(self.scoping, Scoping::SelfScoped) && self.member_readers.contains(&role)
    }
}

const BULLETIN_READERS: &[Role] = &[Role::Teacher, Role::Student, Role::Staff];

/// Returns the access rule for `kind`.
///
/// This table is the single place where per-kind differences live.
#[must_use]
pub const fn rule_for(kind: EntityKind) -> AccessRule {
    match kind {
        EntityKind::School => AccessRule {
            admin_only_writes: true,
            ..AccessRule::tenant()
        },
        EntityKind::User | EntityKind::Class | EntityKind::Staff => AccessRule::tenant(),
        EntityKind::Student => AccessRule {
            member_readers: &[Role::Teacher],
            ..AccessRule::tenant_and_self(&[Role::Student])
        },
        EntityKind::Teacher | EntityKind::Salary => AccessRule::tenant_and_self(&[Role::Teacher]),
        EntityKind::Subject => AccessRule {
            member_readers: &[Role::Teacher],
            ..AccessRule::tenant()
        },
        EntityKind::Timetable => AccessRule {
            member_readers: &[Role::Teacher, Role::Student],
            ..AccessRule::tenant()
        },
        EntityKind::Attendance => AccessRule {
            roster: Some((Role::Teacher, Party::Student)),
            ..AccessRule::tenant_and_self(&[Role::Student, Role::Teacher])
        },
        EntityKind::Fee => AccessRule::tenant_and_self(&[Role::Student]),
        EntityKind::Notice | EntityKind::Event | EntityKind::Holiday => AccessRule {
            member_readers: BULLETIN_READERS,
            ..AccessRule::tenant()
        },
    }
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The target belongs to another school.
    CrossTenant,
    /// The target is another person's record.
    NotOwner,
    /// The role may not perform this action on this kind at all.
    InsufficientRole,
}

impl DenyReason {
    /// Client-facing message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CrossTenant => "You can only access records of your own school",
            Self::NotOwner => "You can only access your own records",
            Self::InsufficientRole => "Your role does not permit this action",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation must not proceed.
    Deny(DenyReason),
}

impl Decision {
    /// Returns true for `Allow`.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts a denial into `AccessError::Denied`.
    ///
    /// # Errors
    ///
    /// Returns the denial reason as an error.
    pub fn into_result(self) -> Result<(), AccessError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(AccessError::Denied(reason)),
        }
    }
}

/// Decides whether `principal` may perform `action` on a `kind` row owned as `scope`.
///
/// Pure function of its inputs; it never touches storage.
#[must_use]
pub fn evaluate(principal: &Principal, action: Action, kind: EntityKind, scope: &Scope) -> Decision {
    let rule = rule_for(kind);

    match principal.role {
        Role::Admin => Decision::Allow,
        Role::School => {
            if action.is_write() && rule.admin_only_writes {
                return Decision::Deny(DenyReason::InsufficientRole);
            }
            match scope.owner_school_id {
                None => Decision::Deny(DenyReason::InsufficientRole),
                Some(school) if principal.belongs_to(school) => Decision::Allow,
                Some(_) => Decision::Deny(DenyReason::CrossTenant),
            }
        }
        role @ (Role::Teacher | Role::Student | Role::Staff) => {
            evaluate_member(principal, role, action, &rule, scope)
        }
    }
}

fn evaluate_member(
    principal: &Principal,
    role: Role,
    action: Action,
    rule: &AccessRule,
    scope: &Scope,
) -> Decision {
    if let Some((roster_role, party)) = rule.roster
        && roster_role == role
        && scope.party == Some(party)
    {
        return same_school(principal, scope);
    }

    if action.is_write() {
        return Decision::Deny(DenyReason::InsufficientRole);
    }

    if rule.reads_self(role) {
        match scope.owner_user_id {
            Some(owner) if owner == principal.user_id => return Decision::Allow,
            _ if rule.reads_school(role) => {}
            _ => return Decision::Deny(DenyReason::NotOwner),
        }
    }

    if rule.reads_school(role) {
        return same_school(principal, scope);
    }

    Decision::Deny(DenyReason::InsufficientRole)
}

fn same_school(principal: &Principal, scope: &Scope) -> Decision {
    match scope.owner_school_id {
        Some(school) if principal.belongs_to(school) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::CrossTenant),
        None => Decision::Deny(DenyReason::InsufficientRole),
    }
}
