//! Integration tests for entity repositories.

mod common;

use campus_core::auth::Role;
use campus_core::finance::{FeeFigures, SalaryFigures};
use campus_core::validation::Limits;
use campus_db::RepoError;
use campus_db::entities::sea_orm_active_enums::{AttendanceStatus, FeeStatus, SalaryStatus};
use campus_db::repositories::{
    Attendee, AttendanceRepository, ClassRepository, DashboardRepository, FeeInput, FeeRepository,
    HolidayInput, HolidayRepository, Payee, SalaryInput, SalaryRepository, StudentInput,
    StudentRepository, SubjectInput, SubjectRepository, TeacherRepository, TimetableInput,
    TimetableRepository, UserChanges, UserRepository,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal_macros::dec;
use sea_orm::TransactionTrait;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_class_delete_blocked_while_students_exist() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;

    let result = ClassRepository::new(&txn).delete(fx.class_id).await;

    assert!(matches!(result, Err(RepoError::InUse(_))));

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_roll_number_unique_per_class() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let repo = StudentRepository::new(&txn);

    let result = repo.ensure_roll_no_free(fx.class_id, "1", None).await;
    assert!(matches!(result, Err(RepoError::Conflict(_))));

    repo.ensure_roll_no_free(fx.class_id, "1", Some(fx.student_id))
        .await
        .expect("the student's own roll number is free for it");

    let listed = repo.list_by_class(fx.class_id).await.expect("Failed to list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].class_name, "5");

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_teacher_delete_lists_subjects() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;

    SubjectRepository::new(&txn)
        .create(SubjectInput {
            class_id: fx.class_id,
            name: "Mathematics".into(),
            teacher_id: fx.teacher_id,
            periods_per_week: 5,
        })
        .await
        .expect("Failed to create subject");

    let err = TeacherRepository::new(&txn)
        .delete(fx.teacher_id)
        .await
        .expect_err("teacher still teaches");

    match err {
        RepoError::InUse(message) => assert!(message.contains("Mathematics")),
        other => panic!("unexpected error: {other:?}"),
    }

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_subject_teacher_must_share_school() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let other = common::school(&txn).await;

    let repo = SubjectRepository::new(&txn);
    repo.ensure_teacher_in_school(fx.teacher_id, fx.school)
        .await
        .expect("same school");

    let result = repo.ensure_teacher_in_school(fx.teacher_id, other).await;
    assert!(matches!(result, Err(RepoError::NotFound(_))));

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_one_attendance_per_day() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let repo = AttendanceRepository::new(&txn);
    let who = Attendee::Student(fx.student_id);

    repo.create(who, date(2026, 9, 1), AttendanceStatus::Present)
        .await
        .expect("Failed to record");
    repo.create(who, date(2026, 9, 2), AttendanceStatus::Absent)
        .await
        .expect("Failed to record");

    let dup = repo.ensure_free(who, date(2026, 9, 1), None).await;
    assert!(matches!(dup, Err(RepoError::Conflict(_))));

    let listed = repo.list_for(who).await.expect("Failed to list");
    assert_eq!(listed.len(), 2);
    assert!(listed[0].date > listed[1].date);

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_fee_balance_is_stored() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;

    let figures =
        FeeFigures::new(&Limits::default(), dec!(1000), Some(dec!(400)), Some(dec!(50)))
            .expect("valid figures");
    let fee = FeeRepository::new(&txn)
        .create(FeeInput {
            student_id: fx.student_id,
            figures,
            due_date: date(2026, 10, 1),
            status: FeeStatus::Pending,
        })
        .await
        .expect("Failed to create fee");

    assert_eq!(fee.balance, dec!(650));

    let rows = FeeRepository::new(&txn)
        .list_for_school(fx.school)
        .await
        .expect("Failed to list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].balance, dec!(650));

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_salary_net_is_stored() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;

    let figures = SalaryFigures::new(
        &Limits::default(),
        dec!(3000),
        Some(dec!(300)),
        Some(dec!(200)),
        Some(dec!(100)),
    )
    .expect("valid figures");
    let salary = SalaryRepository::new(&txn)
        .create(SalaryInput {
            payee: Payee::Teacher(fx.teacher_id),
            figures,
            month: date(2026, 9, 1),
            status: SalaryStatus::NotCredited,
        })
        .await
        .expect("Failed to create salary");

    assert_eq!(salary.net_salary, dec!(2600));
    assert_eq!(salary.payee(), Some(Payee::Teacher(fx.teacher_id)));

    let rows = SalaryRepository::new(&txn)
        .list_teacher_salaries(fx.school)
        .await
        .expect("Failed to list");
    assert_eq!(rows.len(), 1);

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_holiday_end_before_start_rejected_by_storage() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let school = common::school(&txn).await;

    let result = HolidayRepository::new(&txn)
        .create(HolidayInput {
            name: "Winter break".into(),
            start_date: date(2026, 12, 31),
            end_date: date(2026, 12, 20),
            description: String::new(),
            school_id: school,
        })
        .await;

    assert!(matches!(result, Err(RepoError::Database(_))));

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_dashboard_counts_one_school() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let repo = DashboardRepository::new(&txn);

    let stats = repo.stats(Some(fx.school)).await.expect("Failed to count");
    assert_eq!(stats.total_students, 1);
    assert_eq!(stats.total_teachers, 1);

    let year = chrono::Utc::now().year();
    let monthly = repo.monthly(Some(fx.school), year).await.expect("Failed to count");
    assert_eq!(monthly.len(), 12);
    assert_eq!(monthly.iter().map(|m| m.students).sum::<u64>(), 1);

    let gender = repo.gender(Some(fx.school)).await.expect("Failed to count");
    assert_eq!(gender.girls, 1);
    assert_eq!(gender.boys, 0);

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_linked_account_must_match_role_and_school() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let other = common::school(&txn).await;

    let student_account = common::account(&txn, Role::Student, Some(fx.school)).await;
    let foreign_account = common::account(&txn, Role::Student, Some(other)).await;
    let users = UserRepository::new(&txn);

    users
        .ensure_linkable(student_account, Role::Student, fx.school)
        .await
        .expect("matching account");
    assert!(matches!(
        users.ensure_linkable(student_account, Role::Teacher, fx.school).await,
        Err(RepoError::Invalid(_))
    ));
    assert!(matches!(
        users.ensure_linkable(foreign_account, Role::Student, fx.school).await,
        Err(RepoError::Invalid(_))
    ));

    StudentRepository::new(&txn)
        .update(
            fx.student_id,
            StudentInput {
                name: "Ana".into(),
                roll_no: "1".into(),
                email: format!("ana-{}@school.test", common::unique()),
                gender: Some("Female".into()),
                class_id: fx.class_id,
                user_id: Some(student_account),
            },
        )
        .await
        .expect("Failed to link account");

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_moving_linked_account_clears_the_link() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let other = common::school(&txn).await;

    let account = common::account(&txn, Role::Student, Some(fx.school)).await;
    let students = StudentRepository::new(&txn);
    students
        .update(
            fx.student_id,
            StudentInput {
                name: "Ana".into(),
                roll_no: "1".into(),
                email: format!("ana-{}@school.test", common::unique()),
                gender: Some("Female".into()),
                class_id: fx.class_id,
                user_id: Some(account),
            },
        )
        .await
        .expect("Failed to link account");

    let users = UserRepository::new(&txn);
    let current = users.find_by_id(account).await.expect("query").expect("account");
    let changes = |school| UserChanges {
        username: current.username.clone(),
        email: current.email.clone(),
        role: Role::Student,
        school_id: Some(school),
        permissions: None,
    };

    users.update(account, changes(fx.school)).await.expect("rename");
    let kept = students.find(fx.student_id).await.expect("query").expect("student");
    assert_eq!(kept.user_id, Some(account));

    users.update(account, changes(other)).await.expect("move");
    let moved = students.find(fx.student_id).await.expect("query").expect("student");
    assert_eq!(moved.user_id, None);

    txn.rollback().await.expect("Failed to roll back");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_timetable_lists_class_names_and_scopes_by_school() {
    let db = common::connect().await;
    let txn = db.begin().await.expect("Failed to begin");
    let fx = common::fixture(&txn).await;
    let other = common::school(&txn).await;

    let repo = TimetableRepository::new(&txn);
    let entry = repo
        .create(TimetableInput {
            class_id: fx.class_id,
            day: "Monday".into(),
            period: "1".into(),
            subject: "Maths".into(),
            teacher_id: Some(fx.teacher_id),
        })
        .await
        .expect("create");

    let row = repo.find(entry.id).await.expect("find").expect("present");
    assert_eq!(row.subject, "Maths");
    assert!(row.teacher_name.is_some());
    assert_eq!(repo.list(Some(fx.school)).await.expect("list").len(), 1);
    assert!(repo.list(Some(other)).await.expect("list").is_empty());

    repo.delete(entry.id).await.expect("delete");
    let again = repo.delete(entry.id).await;
    assert!(matches!(again, Err(RepoError::NotFound(m)) if m == "Timetable entry not found"));

    txn.rollback().await.expect("Failed to roll back");
}
