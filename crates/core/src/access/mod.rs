//! Tenant-scoped access control.
//!
//! Every endpoint answers the same question before touching storage: may
//! this principal perform this action on this target? The answer is built
//! in three steps:
//!
//! 1. [`ScopeResolver`] walks the target's ownership chain (for example
//!    Fee → Student → Class → School) through an [`OwnershipLookup`] and
//!    produces a [`Scope`]. A broken link is reported as `NotFound`.
//! 2. [`evaluate`] applies the static per-kind [`AccessRule`] table to the
//!    principal and the scope.
//! 3. The caller maps a denial to 403 without touching storage state.
//!
//! Because resolution always runs first, a missing target can never be
//! confirmed through a 403.

pub mod error;
pub mod kind;
pub mod policy;
pub mod scope;

#[cfg(test)]
mod policy_props;
#[cfg(test)]
mod tests;

pub use error::AccessError;
pub use kind::{Action, EntityKind, Party};
pub use policy::{AccessRule, Decision, DenyReason, Scoping, evaluate, rule_for};
pub use scope::{Link, Node, OwnershipLookup, Scope, ScopeResolver, Target};
