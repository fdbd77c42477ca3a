//! Per-request authorization glue.
//!
//! A [`Guard`] binds the caller to a connection. Handlers open it on the
//! pool for reads and on the write transaction for writes, so the ownership
//! reads that justify a write see the same snapshot as the write itself.

use campus_core::access::{
    AccessError, Action, DenyReason, EntityKind, Link, Scope, ScopeResolver, Target,
};
use campus_core::auth::Principal;
use campus_db::OwnershipRepository;
use campus_shared::SchoolId;
use sea_orm::ConnectionTrait;
use tracing::info;

use crate::error::{ApiError, ApiResult};

/// Resolves and authorizes targets for one principal.
#[derive(Debug)]
pub struct Guard<'a, C> {
    principal: &'a Principal,
    resolver: ScopeResolver<OwnershipRepository<'a, C>>,
}

impl<'a, C: ConnectionTrait> Guard<'a, C> {
    /// Creates a guard over `db`.
    pub const fn new(db: &'a C, principal: &'a Principal) -> Self {
        Self {
            principal,
            resolver: ScopeResolver::new(OwnershipRepository::new(db)),
        }
    }

    /// Resolves `target` and checks the policy.
    ///
    /// # Errors
    ///
    /// 404 when the target or its chain is missing, 403 when denied.
    pub async fn authorize(&self, action: Action, target: Target) -> ApiResult<Scope> {
        self.resolver
            .authorize(self.principal, action, target)
            .await
            .map_err(|err| {
                if let AccessError::Denied(reason) = err {
                    info!(
                        user_id = %self.principal.user_id,
                        role = %self.principal.role,
                        ?action,
                        ?target,
                        ?reason,
                        "Access denied"
                    );
                }
                ApiError::from(err)
            })
    }

    /// Authorizes `action` on row `id` of `kind`.
    ///
    /// # Errors
    ///
    /// See [`Guard::authorize`].
    pub async fn row(&self, action: Action, kind: EntityKind, id: i32) -> ApiResult<Scope> {
        self.authorize(action, Target::row(kind, id)).await
    }

    /// Authorizes `action` on rows of `kind` under `parent`.
    ///
    /// # Errors
    ///
    /// See [`Guard::authorize`].
    pub async fn under(&self, action: Action, kind: EntityKind, parent: Link) -> ApiResult<Scope> {
        self.authorize(action, Target::under(kind, parent)).await
    }

    /// Authorizes an update of row `id` that places it under `parent`.
    ///
    /// The row must be updatable where it is and creatable where it goes.
    ///
    /// # Errors
    ///
    /// See [`Guard::authorize`].
    pub async fn relocate(&self, kind: EntityKind, id: i32, parent: Link) -> ApiResult<Scope> {
        self.row(Action::Update, kind, id).await?;
        self.under(Action::Create, kind, parent).await
    }

    /// Authorizes reading rows of `kind` in a class the caller can see.
    ///
    /// A class in another school is reported as missing.
    ///
    /// # Errors
    ///
    /// 404 "Class not found" when the class is missing or foreign, 403 for
    /// other denials.
    pub async fn visible_class(&self, kind: EntityKind, class_id: i32) -> ApiResult<Scope> {
        match self
            .resolver
            .authorize(self.principal, Action::Read, Target::under(kind, Link::Class(class_id)))
            .await
        {
            Ok(scope) => Ok(scope),
            Err(AccessError::Denied(DenyReason::CrossTenant)) => {
                Err(ApiError::not_found("Class not found"))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Picks and authorizes the school a `kind` listing covers.
    ///
    /// Admins list every school unless they ask for one. Everyone else
    /// defaults to their home school; asking for another is checked like
    /// any other target.
    ///
    /// # Errors
    ///
    /// See [`Guard::authorize`].
    pub async fn list_scope(
        &self,
        kind: EntityKind,
        requested: Option<i32>,
    ) -> ApiResult<Option<SchoolId>> {
        let school = requested.map(SchoolId).or(self.principal.home_school_id);
        match school {
            Some(school) => {
                self.under(Action::Read, kind, Link::School(school)).await?;
                Ok(Some(school))
            }
            None => {
                self.under(Action::Read, kind, Link::Platform).await?;
                Ok(None)
            }
        }
    }

    /// The caller.
    pub const fn principal(&self) -> &Principal {
        self.principal
    }
}

/// School that owns a resolved scope.
///
/// # Errors
///
/// 500 for a platform-level scope, which never owns school rows.
pub fn owner_school(scope: &Scope) -> ApiResult<SchoolId> {
    scope
        .owner_school_id
        .ok_or_else(|| ApiError(campus_shared::AppError::Internal("scope has no school".into())))
}
