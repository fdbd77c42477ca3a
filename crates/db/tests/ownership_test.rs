//! Integration tests for the storage-backed ownership lookup.

mod common;

use campus_core::access::{AccessError, Action, EntityKind, Link, Party, ScopeResolver, Target};
use campus_core::auth::{Principal, Role};
use campus_core::finance::FeeFigures;
use campus_core::validation::Limits;
use campus_db::OwnershipRepository;
use campus_db::entities::sea_orm_active_enums::{AttendanceStatus, FeeStatus};
use campus_db::repositories::{AttendanceRepository, Attendee, FeeInput, FeeRepository};
use campus_shared::{SchoolId, UserId};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::TransactionTrait;

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_fee_resolves_through_student_and_class() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;

    let figures = FeeFigures::new(&Limits::default(), dec!(500), None, None).expect("valid");
    let fee = FeeRepository::new(&txn)
        .create(FeeInput {
            student_id: fx.student_id,
            figures,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("date"),
            status: FeeStatus::Pending,
        })
        .await
        .expect("Failed to create fee");

    let resolver = ScopeResolver::new(OwnershipRepository::new(&txn));
    let scope = resolver
        .resolve(EntityKind::Fee, fee.id)
        .await
        .expect("Failed to resolve");

    assert_eq!(scope.owner_school_id, Some(fx.school));
    assert_eq!(scope.party, Some(Party::Student));
    assert_eq!(scope.owner_user_id, None);

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_teacher_attendance_has_teacher_party() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;

    let record = AttendanceRepository::new(&txn)
        .create(
            Attendee::Teacher(fx.teacher_id),
            NaiveDate::from_ymd_opt(2026, 9, 1).expect("date"),
            AttendanceStatus::Present,
        )
        .await
        .expect("Failed to record attendance");

    let resolver = ScopeResolver::new(OwnershipRepository::new(&txn));
    let scope = resolver
        .resolve(EntityKind::Attendance, record.id)
        .await
        .expect("Failed to resolve");

    assert_eq!(scope.party, Some(Party::Teacher));
    assert_eq!(scope.owner_school_id, Some(fx.school));

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_cross_tenant_create_is_denied_after_resolution() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let other = common::school(&txn).await;

    let principal = Principal::new(UserId(1), Role::School, Some(other));
    let resolver = ScopeResolver::new(OwnershipRepository::new(&txn));

    let err = resolver
        .authorize(
            &principal,
            Action::Create,
            Target::under(EntityKind::Student, Link::Class(fx.class_id)),
        )
        .await
        .expect_err("cross-tenant create must fail");

    assert!(matches!(err, AccessError::Denied(_)));

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_school_is_not_found() {
    let db = common::connect().await;
    let resolver = ScopeResolver::new(OwnershipRepository::new(&db));

    let err = resolver
        .resolve_link(Link::School(SchoolId(i32::MAX)))
        .await
        .expect_err("school does not exist");

    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_admin_account_is_platform_scoped() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let admin = common::account(&txn, Role::Admin, None).await;

    let resolver = ScopeResolver::new(OwnershipRepository::new(&txn));
    let scope = resolver
        .resolve(EntityKind::User, admin)
        .await
        .expect("Failed to resolve");

    assert_eq!(scope.owner_school_id, None);
    assert_eq!(scope.owner_user_id, Some(UserId(admin)));

    txn.rollback().await.expect("Failed to roll back");
}
