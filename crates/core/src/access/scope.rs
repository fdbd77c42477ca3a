//! Ownership scopes and the resolver that computes them.

use async_trait::async_trait;
use campus_shared::{SchoolId, UserId};

use super::error::AccessError;
use super::kind::{Action, EntityKind, Party};
use super::policy::evaluate;
use crate::auth::Principal;

/// Upper bound on ownership hops. The deepest real chain is
/// Attendance → Student → Class → School.
const MAX_CHAIN_DEPTH: usize = 4;

/// Owner of a target, as far as the policy is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    /// Owning school; `None` for platform-level resources.
    pub owner_school_id: Option<SchoolId>,
    /// Account of the person the record is about, when linked.
    pub owner_user_id: Option<UserId>,
    /// Which kind of person the record is about, if any.
    pub party: Option<Party>,
}

impl Scope {
    /// Scope of a whole school's collection.
    #[must_use]
    pub const fn school(school_id: SchoolId) -> Self {
        Self {
            owner_school_id: Some(school_id),
            owner_user_id: None,
            party: None,
        }
    }

    /// Scope of platform-level resources (only Admin may act on these).
    #[must_use]
    pub const fn platform() -> Self {
        Self {
            owner_school_id: None,
            owner_user_id: None,
            party: None,
        }
    }

    /// Scope of a whole school's collection, or the platform when `None`.
    #[must_use]
    pub const fn school_or_platform(school_id: Option<SchoolId>) -> Self {
        match school_id {
            Some(id) => Self::school(id),
            None => Self::platform(),
        }
    }
}

/// Reference from a record to the record that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// Owned by the platform (admin accounts).
    Platform,
    /// Owned directly by a school.
    School(SchoolId),
    /// Owned through a class.
    Class(i32),
    /// Owned through a student.
    Student(i32),
    /// Owned through a teacher.
    Teacher(i32),
    /// Owned through a staff member.
    Staff(i32),
}

impl Link {
    /// Returns the kind and key of the linked record, if it is a record.
    #[must_use]
    pub const fn entity(&self) -> Option<(EntityKind, i32)> {
        match *self {
            Self::Platform => None,
            Self::School(id) => Some((EntityKind::School, id.0)),
            Self::Class(id) => Some((EntityKind::Class, id)),
            Self::Student(id) => Some((EntityKind::Student, id)),
            Self::Teacher(id) => Some((EntityKind::Teacher, id)),
            Self::Staff(id) => Some((EntityKind::Staff, id)),
        }
    }
}

/// One stored record's ownership facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// What owns this record.
    pub parent: Link,
    /// The account this record is about, when linked (students, teachers,
    /// staff and the accounts themselves).
    pub account: Option<UserId>,
}

impl Node {
    /// A record owned by `parent` with no linked account.
    #[must_use]
    pub const fn owned_by(parent: Link) -> Self {
        Self {
            parent,
            account: None,
        }
    }

    /// Attaches the linked account.
    #[must_use]
    pub const fn with_account(mut self, account: Option<UserId>) -> Self {
        self.account = account;
        self
    }
}

/// Storage seam: one hop of an ownership chain.
///
/// Implementations return `Ok(None)` when the record does not exist. A school
/// reports itself as its own parent.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    /// Error raised by the underlying storage.
    type Error: std::fmt::Display + Send;

    /// Returns the ownership facts of record `id` of `kind`.
    async fn parent_of(&self, kind: EntityKind, id: i32) -> Result<Option<Node>, Self::Error>;
}

/// What is being authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An existing row.
    Row {
        /// Kind of the row.
        kind: EntityKind,
        /// Key of the row.
        id: i32,
    },
    /// A new row, or the collection of rows, of `kind` under `parent`.
    Under {
        /// Kind of the rows.
        kind: EntityKind,
        /// The claimed or requested owner.
        parent: Link,
    },
}

impl Target {
    /// An existing row.
    #[must_use]
    pub const fn row(kind: EntityKind, id: i32) -> Self {
        Self::Row { kind, id }
    }

    /// Rows of `kind` under `parent`.
    #[must_use]
    pub const fn under(kind: EntityKind, parent: Link) -> Self {
        Self::Under { kind, parent }
    }

    /// Kind whose rule applies.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Row { kind, .. } | Self::Under { kind, .. } => *kind,
        }
    }
}

/// Resolves ownership scopes by walking chains through an [`OwnershipLookup`].
#[derive(Debug, Clone)]
pub struct ScopeResolver<L> {
    lookup: L,
}

impl<L: OwnershipLookup> ScopeResolver<L> {
    /// Creates a resolver over `lookup`.
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Returns the underlying lookup.
    pub const fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolves the scope of an existing row.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` for the row itself or for the first
    /// missing link of its chain.
    pub async fn resolve(&self, kind: EntityKind, id: i32) -> Result<Scope, AccessError> {
        if kind == EntityKind::School {
            return self.resolve_link(Link::School(SchoolId(id))).await;
        }

        let node = self.fetch(kind, id).await?;
        let mut scope = Scope::default();
        absorb(&mut scope, kind, node);
        self.climb(node.parent, scope).await
    }

    /// Resolves the scope implied by an owner reference.
    ///
    /// Used for creates (the owner comes from the request body) and for
    /// nested collection reads. A claimed school is checked for existence.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` for the first missing link.
    pub async fn resolve_link(&self, link: Link) -> Result<Scope, AccessError> {
        if let Link::School(school) = link {
            self.fetch(EntityKind::School, school.0).await?;
        }
        self.climb(link, Scope::default()).await
    }

    /// Resolves `target` and evaluates the policy for `principal`.
    ///
    /// Resolution always completes first, so `NotFound` takes precedence
    /// over any denial.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::NotFound` if resolution fails, or
    /// `AccessError::Denied` if the policy denies the action.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        target: Target,
    ) -> Result<Scope, AccessError> {
        let scope = match target {
            Target::Row { kind, id } => self.resolve(kind, id).await?,
            Target::Under { parent, .. } => self.resolve_link(parent).await?,
        };

        evaluate(principal, action, target.kind(), &scope).into_result()?;
        Ok(scope)
    }

    async fn fetch(&self, kind: EntityKind, id: i32) -> Result<Node, AccessError> {
        self.lookup
            .parent_of(kind, id)
            .await
            .map_err(|e| AccessError::Lookup(e.to_string()))?
            .ok_or(AccessError::NotFound { kind, id })
    }

    async fn climb(&self, mut link: Link, mut scope: Scope) -> Result<Scope, AccessError> {
        for _ in 0..MAX_CHAIN_DEPTH {
            match link {
                Link::Platform => return Ok(scope),
                Link::School(school) => {
                    scope.owner_school_id = Some(school);
                    return Ok(scope);
                }
                Link::Class(_) | Link::Student(_) | Link::Teacher(_) | Link::Staff(_) => {
                    let Some((kind, id)) = link.entity() else {
                        return Ok(scope);
                    };
                    let node = self.fetch(kind, id).await?;
                    absorb(&mut scope, kind, node);
                    link = node.parent;
                }
            }
        }

        Err(AccessError::Lookup(format!(
            "ownership chain deeper than {MAX_CHAIN_DEPTH} links"
        )))
    }
}

/// Records the first person met on the chain, and account ownership.
fn absorb(scope: &mut Scope, kind: EntityKind, node: Node) {
    if scope.party.is_some() || scope.owner_user_id.is_some() {
        return;
    }
    if let Some(party) = Party::of_kind(kind) {
        scope.party = Some(party);
        scope.owner_user_id = node.account;
    } else if kind == EntityKind::User {
        scope.owner_user_id = node.account;
    }
}
