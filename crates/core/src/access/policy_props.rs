//! Property tests for the policy evaluator.

use campus_shared::{SchoolId, UserId};
use proptest::prelude::*;
use proptest::sample::select;

use super::*;
use crate::auth::{Principal, Role};

fn any_kind() -> impl Strategy<Value = EntityKind> {
    select(EntityKind::ALL.to_vec())
}

fn any_action() -> impl Strategy<Value = Action> {
    select(vec![Action::Read, Action::Create, Action::Update, Action::Delete])
}

fn any_role() -> impl Strategy<Value = Role> {
    select(Role::ALL.to_vec())
}

fn any_party() -> impl Strategy<Value = Option<Party>> {
    prop_oneof![
        Just(None),
        Just(Some(Party::Student)),
        Just(Some(Party::Teacher)),
        Just(Some(Party::Staff)),
    ]
}

fn any_scope() -> impl Strategy<Value = Scope> {
    (
        proptest::option::of(1..50i32),
        proptest::option::of(1..500i32),
        any_party(),
    )
        .prop_map(|(school, user, party)| Scope {
            owner_school_id: school.map(SchoolId),
            owner_user_id: user.map(UserId),
            party,
        })
}

proptest! {
    /// Outside the home school only Admin ever passes.
    #[test]
    fn prop_no_cross_tenant_access(
        role in any_role(),
        kind in any_kind(),
        action in any_action(),
        scope in any_scope(),
        home in 1..50i32,
        user in 1..500i32,
    ) {
        prop_assume!(role != Role::Admin);
        prop_assume!(scope.owner_school_id != Some(SchoolId(home)));

        let principal = Principal::new(UserId(user), role, Some(SchoolId(home)));
        let decision = evaluate(&principal, action, kind, &scope);

        // Self-scoped reads are the one way across: a person owns their
        // record wherever it lives.
        let owns = scope.owner_user_id == Some(principal.user_id)
            && rule_for(kind).self_readers.contains(&role)
            && action == Action::Read;
        prop_assert!(!decision.is_allowed() || owns, "{role} {action:?} {kind} {scope:?}");
    }

    /// Admin is allowed everything, everywhere.
    #[test]
    fn prop_admin_always_allowed(
        kind in any_kind(),
        action in any_action(),
        scope in any_scope(),
    ) {
        let admin = Principal::new(UserId(1), Role::Admin, None);
        prop_assert_eq!(evaluate(&admin, action, kind, &scope), Decision::Allow);
    }

    /// A School account decides by tenancy alone, except for admin-only writes.
    #[test]
    fn prop_school_decides_by_tenant(
        kind in any_kind(),
        action in any_action(),
        scope in any_scope(),
        home in 1..50i32,
    ) {
        let principal = Principal::new(UserId(9), Role::School, Some(SchoolId(home)));
        let decision = evaluate(&principal, action, kind, &scope);

        let expected = scope.owner_school_id == Some(SchoolId(home))
            && !(action.is_write() && rule_for(kind).admin_only_writes);
        prop_assert_eq!(decision.is_allowed(), expected);
    }

    /// Students and Teachers see their own self-scoped records and nobody
    /// else's.
    #[test]
    fn prop_self_scoped_reads_follow_owner(
        role in select(vec![Role::Student, Role::Teacher]),
        kind in select(vec![EntityKind::Attendance, EntityKind::Fee, EntityKind::Salary]),
        owner in 1..500i32,
        caller in 1..500i32,
        school in 1..50i32,
    ) {
        prop_assume!(rule_for(kind).self_readers.contains(&role));

        let party = match role {
            Role::Teacher => Party::Teacher,
            _ => Party::Student,
        };
        let scope = Scope {
            owner_school_id: Some(SchoolId(school)),
            owner_user_id: Some(UserId(owner)),
            party: Some(party),
        };
        let principal = Principal::new(UserId(caller), role, Some(SchoolId(school)));

        let decision = evaluate(&principal, Action::Read, kind, &scope);
        if owner == caller {
            prop_assert_eq!(decision, Decision::Allow);
        } else {
            prop_assert_eq!(decision, Decision::Deny(DenyReason::NotOwner));
        }
    }

    /// Staff only ever read bulletins of their own school.
    #[test]
    fn prop_staff_reads_bulletins_only(
        kind in any_kind(),
        action in any_action(),
        scope in any_scope(),
        home in 1..50i32,
    ) {
        let principal = Principal::new(UserId(3), Role::Staff, Some(SchoolId(home)));
        let decision = evaluate(&principal, action, kind, &scope);

        let bulletin = matches!(kind, EntityKind::Notice | EntityKind::Event | EntityKind::Holiday);
        let expected = bulletin
            && action == Action::Read
            && scope.owner_school_id == Some(SchoolId(home));
        prop_assert_eq!(decision.is_allowed(), expected);
    }
}
