//! Resolver and policy tests over an in-memory ownership store.

use std::collections::HashMap;

use async_trait::async_trait;
use campus_shared::{SchoolId, UserId};
use mockall::{mock, predicate::eq};
use rstest::rstest;

use super::*;
use crate::auth::{Principal, Role};

/// In-memory ownership store.
#[derive(Default)]
struct Store {
    nodes: HashMap<(EntityKind, i32), Node>,
}

impl Store {
    fn with(mut self, kind: EntityKind, id: i32, node: Node) -> Self {
        self.nodes.insert((kind, id), node);
        self
    }

    fn school(self, id: i32) -> Self {
        self.with(
            EntityKind::School,
            id,
            Node::owned_by(Link::School(SchoolId(id))),
        )
    }
}

#[async_trait]
impl OwnershipLookup for Store {
    type Error = String;

    async fn parent_of(&self, kind: EntityKind, id: i32) -> Result<Option<Node>, String> {
        Ok(self.nodes.get(&(kind, id)).copied())
    }
}

/// Two schools. School 1 has class 10 with student 100 (account 50),
/// teacher 7 (account 7) and teacher 9 (account 9). School 2 has class 20
/// with student 200 (account 60).
fn campus() -> ScopeResolver<Store> {
    let store = Store::default()
        .school(1)
        .school(2)
        .with(EntityKind::Class, 10, Node::owned_by(Link::School(SchoolId(1))))
        .with(EntityKind::Class, 20, Node::owned_by(Link::School(SchoolId(2))))
        .with(
            EntityKind::Student,
            100,
            Node::owned_by(Link::Class(10)).with_account(Some(UserId(50))),
        )
        .with(
            EntityKind::Student,
            200,
            Node::owned_by(Link::Class(20)).with_account(Some(UserId(60))),
        )
        .with(
            EntityKind::Teacher,
            7,
            Node::owned_by(Link::School(SchoolId(1))).with_account(Some(UserId(7))),
        )
        .with(
            EntityKind::Teacher,
            9,
            Node::owned_by(Link::School(SchoolId(1))).with_account(Some(UserId(9))),
        )
        .with(EntityKind::Attendance, 1000, Node::owned_by(Link::Student(100)))
        .with(EntityKind::Attendance, 1001, Node::owned_by(Link::Teacher(9)))
        .with(EntityKind::Fee, 3000, Node::owned_by(Link::Student(100)))
        .with(EntityKind::Subject, 4000, Node::owned_by(Link::Class(10)))
        .with(EntityKind::Timetable, 4100, Node::owned_by(Link::Class(10)))
        .with(EntityKind::Notice, 5000, Node::owned_by(Link::School(SchoolId(2))))
        .with(
            EntityKind::User,
            1,
            Node::owned_by(Link::Platform).with_account(Some(UserId(1))),
        )
        // Student 300 points at a class that has been deleted.
        .with(EntityKind::Student, 300, Node::owned_by(Link::Class(99)))
        .with(EntityKind::Fee, 3001, Node::owned_by(Link::Student(300)));

    ScopeResolver::new(store)
}

fn admin() -> Principal {
    Principal::new(UserId(1), Role::Admin, None)
}

fn school_account(school: i32) -> Principal {
    Principal::new(UserId(1000 + school), Role::School, Some(SchoolId(school)))
}

fn teacher(user: i32) -> Principal {
    Principal::new(UserId(user), Role::Teacher, Some(SchoolId(1)))
}

fn student(user: i32, school: i32) -> Principal {
    Principal::new(UserId(user), Role::Student, Some(SchoolId(school)))
}

// =========================================================================
// Scope resolution
// =========================================================================

#[tokio::test]
async fn test_student_resolves_through_class() {
    let scope = campus().resolve(EntityKind::Student, 100).await.unwrap();

    assert_eq!(scope.owner_school_id, Some(SchoolId(1)));
    assert_eq!(scope.owner_user_id, Some(UserId(50)));
    assert_eq!(scope.party, Some(Party::Student));
}

#[tokio::test]
async fn test_attendance_inherits_owner_of_person() {
    let resolver = campus();

    let student_mark = resolver.resolve(EntityKind::Attendance, 1000).await.unwrap();
    assert_eq!(student_mark.owner_school_id, Some(SchoolId(1)));
    assert_eq!(student_mark.owner_user_id, Some(UserId(50)));
    assert_eq!(student_mark.party, Some(Party::Student));

    let teacher_mark = resolver.resolve(EntityKind::Attendance, 1001).await.unwrap();
    assert_eq!(teacher_mark.owner_user_id, Some(UserId(9)));
    assert_eq!(teacher_mark.party, Some(Party::Teacher));
}

#[tokio::test]
async fn test_direct_and_platform_scopes() {
    let resolver = campus();

    let notice = resolver.resolve(EntityKind::Notice, 5000).await.unwrap();
    assert_eq!(notice, Scope::school(SchoolId(2)));

    let admin_account = resolver.resolve(EntityKind::User, 1).await.unwrap();
    assert_eq!(admin_account.owner_school_id, None);
    assert_eq!(admin_account.owner_user_id, Some(UserId(1)));
}

#[tokio::test]
async fn test_missing_row_is_not_found() {
    let err = campus().resolve(EntityKind::Fee, 42).await.unwrap_err();
    assert_eq!(
        err,
        AccessError::NotFound {
            kind: EntityKind::Fee,
            id: 42
        }
    );
}

#[tokio::test]
async fn test_broken_chain_reports_missing_link() {
    let err = campus().resolve(EntityKind::Fee, 3001).await.unwrap_err();
    assert_eq!(
        err,
        AccessError::NotFound {
            kind: EntityKind::Class,
            id: 99
        }
    );
}

#[tokio::test]
async fn test_claimed_school_must_exist() {
    let err = campus()
        .resolve_link(Link::School(SchoolId(77)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccessError::NotFound {
            kind: EntityKind::School,
            id: 77
        }
    ));
}

#[tokio::test]
async fn test_cyclic_chain_is_a_lookup_failure() {
    let resolver = ScopeResolver::new(Store::default().with(
        EntityKind::Class,
        1,
        Node::owned_by(Link::Class(1)),
    ));

    let err = resolver.resolve(EntityKind::Class, 1).await.unwrap_err();
    assert!(matches!(err, AccessError::Lookup(_)));
}

// =========================================================================
// Authorization through the resolver
// =========================================================================

#[tokio::test]
async fn test_not_found_precedes_forbidden() {
    // A student of school 2 could never delete this fee, but the chain is
    // broken so the answer must be 404-shaped.
    let err = campus()
        .authorize(&student(60, 2), Action::Delete, Target::row(EntityKind::Fee, 3001))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_class_roster_visible_only_to_owning_school() {
    let resolver = campus();
    let target = Target::under(EntityKind::Student, Link::Class(10));

    assert!(
        resolver
            .authorize(&school_account(1), Action::Read, target)
            .await
            .is_ok()
    );
    assert_eq!(
        resolver
            .authorize(&school_account(2), Action::Read, target)
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::CrossTenant)
    );
}

#[tokio::test]
async fn test_students_read_timetable_of_their_own_school() {
    let resolver = campus();
    let target = Target::row(EntityKind::Timetable, 4100);

    assert!(resolver.authorize(&student(50, 1), Action::Read, target).await.is_ok());
    assert_eq!(
        resolver
            .authorize(&student(60, 2), Action::Read, target)
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::CrossTenant)
    );
    assert_eq!(
        resolver
            .authorize(&student(50, 1), Action::Delete, target)
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::InsufficientRole)
    );
}

#[tokio::test]
async fn test_school_cannot_create_class_in_other_school() {
    let err = campus()
        .authorize(
            &school_account(1),
            Action::Create,
            Target::under(EntityKind::Class, Link::School(SchoolId(2))),
        )
        .await
        .unwrap_err();

    assert_eq!(err, AccessError::Denied(DenyReason::CrossTenant));
}

#[tokio::test]
async fn test_teacher_reads_only_own_attendance() {
    let resolver = campus();

    let own = resolver
        .authorize(
            &teacher(7),
            Action::Read,
            Target::under(EntityKind::Attendance, Link::Teacher(7)),
        )
        .await;
    assert!(own.is_ok());

    let colleague = resolver
        .authorize(
            &teacher(7),
            Action::Read,
            Target::under(EntityKind::Attendance, Link::Teacher(9)),
        )
        .await;
    assert_eq!(
        colleague.unwrap_err(),
        AccessError::Denied(DenyReason::NotOwner)
    );

    let by_school = resolver
        .authorize(
            &school_account(1),
            Action::Read,
            Target::under(EntityKind::Attendance, Link::Teacher(9)),
        )
        .await;
    assert!(by_school.is_ok());
}

#[tokio::test]
async fn test_teacher_marks_student_attendance_in_own_school_only() {
    let resolver = campus();

    assert!(
        resolver
            .authorize(
                &teacher(7),
                Action::Create,
                Target::under(EntityKind::Attendance, Link::Student(100)),
            )
            .await
            .is_ok()
    );
    assert_eq!(
        resolver
            .authorize(
                &teacher(7),
                Action::Create,
                Target::under(EntityKind::Attendance, Link::Student(200)),
            )
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::CrossTenant)
    );
    // Teacher attendance is kept by the school, not by colleagues.
    assert_eq!(
        resolver
            .authorize(&teacher(7), Action::Update, Target::row(EntityKind::Attendance, 1001))
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::InsufficientRole)
    );
}

#[tokio::test]
async fn test_student_reads_own_fee_but_not_others() {
    let resolver = campus();

    assert!(
        resolver
            .authorize(&student(50, 1), Action::Read, Target::row(EntityKind::Fee, 3000))
            .await
            .is_ok()
    );
    assert_eq!(
        resolver
            .authorize(&student(51, 1), Action::Read, Target::row(EntityKind::Fee, 3000))
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::NotOwner)
    );
    assert_eq!(
        resolver
            .authorize(&student(50, 1), Action::Update, Target::row(EntityKind::Fee, 3000))
            .await
            .unwrap_err(),
        AccessError::Denied(DenyReason::InsufficientRole)
    );
}

#[tokio::test]
async fn test_admin_passes_everything_that_exists() {
    let resolver = campus();

    for target in [
        Target::row(EntityKind::Fee, 3000),
        Target::row(EntityKind::Notice, 5000),
        Target::row(EntityKind::User, 1),
        Target::under(EntityKind::Class, Link::School(SchoolId(2))),
    ] {
        assert!(resolver.authorize(&admin(), Action::Delete, target).await.is_ok());
    }
}

// =========================================================================
// Lookup call pattern
// =========================================================================

mock! {
    Lookup {}

    #[async_trait]
    impl OwnershipLookup for Lookup {
        type Error = String;

        async fn parent_of(&self, kind: EntityKind, id: i32) -> Result<Option<Node>, String>;
    }
}

#[tokio::test]
async fn test_resolution_stops_at_first_missing_link() {
    let mut lookup = MockLookup::new();
    lookup
        .expect_parent_of()
        .with(eq(EntityKind::Subject), eq(4))
        .times(1)
        .returning(|_, _| Ok(Some(Node::owned_by(Link::Class(8)))));
    lookup
        .expect_parent_of()
        .with(eq(EntityKind::Class), eq(8))
        .times(1)
        .returning(|_, _| Ok(None));

    let err = ScopeResolver::new(lookup)
        .authorize(&admin(), Action::Delete, Target::row(EntityKind::Subject, 4))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AccessError::NotFound {
            kind: EntityKind::Class,
            id: 8
        }
    );
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_lookup_error() {
    let mut lookup = MockLookup::new();
    lookup
        .expect_parent_of()
        .returning(|_, _| Err("connection reset".to_string()));

    let err = ScopeResolver::new(lookup)
        .resolve(EntityKind::Notice, 1)
        .await
        .unwrap_err();

    assert_eq!(err, AccessError::Lookup("connection reset".to_string()));
}

// =========================================================================
// Decision table
// =========================================================================

#[rstest]
#[case(Role::Staff, EntityKind::Notice, Action::Read, true)]
#[case(Role::Staff, EntityKind::Event, Action::Read, true)]
#[case(Role::Staff, EntityKind::Holiday, Action::Read, true)]
#[case(Role::Staff, EntityKind::Notice, Action::Create, false)]
#[case(Role::Staff, EntityKind::Student, Action::Read, false)]
#[case(Role::Teacher, EntityKind::Student, Action::Read, true)]
#[case(Role::Teacher, EntityKind::Student, Action::Update, false)]
#[case(Role::Teacher, EntityKind::Subject, Action::Read, true)]
#[case(Role::Teacher, EntityKind::Timetable, Action::Read, true)]
#[case(Role::Teacher, EntityKind::Timetable, Action::Update, false)]
#[case(Role::Student, EntityKind::Timetable, Action::Read, true)]
#[case(Role::Staff, EntityKind::Timetable, Action::Read, false)]
#[case(Role::School, EntityKind::Timetable, Action::Create, true)]
#[case(Role::Teacher, EntityKind::Class, Action::Read, false)]
#[case(Role::Teacher, EntityKind::Staff, Action::Read, false)]
#[case(Role::Student, EntityKind::Notice, Action::Read, true)]
#[case(Role::Student, EntityKind::Class, Action::Read, false)]
#[case(Role::School, EntityKind::Fee, Action::Create, true)]
#[case(Role::School, EntityKind::Salary, Action::Delete, true)]
#[case(Role::School, EntityKind::School, Action::Read, true)]
#[case(Role::School, EntityKind::School, Action::Update, false)]
fn test_same_school_collection_decisions(
    #[case] role: Role,
    #[case] kind: EntityKind,
    #[case] action: Action,
    #[case] allowed: bool,
) {
    let principal = Principal::new(UserId(5), role, Some(SchoolId(1)));
    let decision = evaluate(&principal, action, kind, &Scope::school(SchoolId(1)));

    assert_eq!(decision.is_allowed(), allowed, "{role} {action:?} {kind}");
}

#[test]
fn test_platform_scope_is_admin_only() {
    let scope = Scope::platform();

    assert!(evaluate(&admin(), Action::Read, EntityKind::School, &scope).is_allowed());
    assert_eq!(
        evaluate(&school_account(1), Action::Read, EntityKind::School, &scope),
        Decision::Deny(DenyReason::InsufficientRole)
    );
    assert_eq!(
        evaluate(&school_account(1), Action::Update, EntityKind::User, &scope),
        Decision::Deny(DenyReason::InsufficientRole)
    );
}

#[test]
fn test_rule_table_is_consistent() {
    for kind in EntityKind::ALL {
        let rule = rule_for(kind);

        // Self readers only make sense on kinds owned by a person.
        if !rule.self_readers.is_empty() {
            assert_ne!(rule.scoping, Scoping::Tenant, "{kind}");
        }
        // Nobody but Admin and School writes unless a roster grant says so.
        if let Some((role, _)) = rule.roster {
            assert_eq!(role, Role::Teacher, "{kind}");
        }
        assert!(!rule.member_readers.contains(&Role::School), "{kind}");
        assert!(!rule.member_readers.contains(&Role::Admin), "{kind}");
    }
}
