//! Fee and salary routes.
//!
//! Listings are per school. Each write runs in one transaction that also
//! holds the ownership reads authorizing it.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::finance::{FeeFigures, SalaryFigures};
use campus_core::status::{FeeStatus, SalaryStatus};
use campus_core::validation::{self, Either, ExclusivePair, Limits, ValidationError};
use campus_db::repositories::{FeeInput, FeeRepository, Payee, SalaryInput, SalaryRepository};
use campus_shared::SchoolId;
use rust_decimal::Decimal;
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    access::Guard,
    error::ApiResult,
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the fee and salary routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/school/{school_id}/fees", get(list_school_fees))
        .route("/accounts/fees", post(create_fee))
        .route("/accounts/fees/{id}", put(update_fee).delete(delete_fee))
        .route("/fees/student/{student_id}", get(list_student_fees))
        .route(
            "/accounts/school/{school_id}/teacher-salaries",
            get(list_teacher_salaries),
        )
        .route(
            "/accounts/school/{school_id}/staff-salaries",
            get(list_staff_salaries),
        )
        .route("/accounts/salaries", post(create_salary))
        .route(
            "/accounts/salaries/{id}",
            put(update_salary).delete(delete_salary),
        )
        .route("/salaries/teacher/{teacher_id}", get(list_teacher_salary_history))
}

/// Request body for creating or replacing a fee.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    /// Student charged.
    pub student_id: Option<i32>,
    /// Amount charged.
    pub amount: Option<Decimal>,
    /// Amount paid so far.
    pub submitted: Option<Decimal>,
    /// Late fine.
    pub fine: Option<Decimal>,
    /// Due date, `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// `Pending` unless given.
    pub status: Option<String>,
}

impl FeeRequest {
    fn into_input(self, limits: &Limits) -> Result<FeeInput, ValidationError> {
        let student_id = validation::present("Student ID", self.student_id)?;
        let amount = validation::present("Amount", self.amount)?;
        let due_date = validation::required_date("due date", self.due_date.as_deref())?;
        Ok(FeeInput {
            student_id,
            figures: FeeFigures::new(limits, amount, self.submitted, self.fine)?,
            due_date,
            status: FeeStatus::parse_or_default(self.status.as_deref())?.into(),
        })
    }
}

/// Request body for creating or replacing a salary.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRequest {
    /// Teacher paid; exclusive with `staff_id`.
    pub teacher_id: Option<i32>,
    /// Staff member paid; exclusive with `teacher_id`.
    pub staff_id: Option<i32>,
    /// Gross amount.
    pub amount: Option<Decimal>,
    /// Tax withheld.
    pub tax: Option<Decimal>,
    /// Provident fund contribution.
    pub pf: Option<Decimal>,
    /// Bonus.
    pub bonus: Option<Decimal>,
    /// Month paid for, `YYYY-MM-DD`.
    pub month: Option<String>,
    /// `Not Credited` unless given.
    pub status: Option<String>,
}

impl SalaryRequest {
    fn into_input(self, limits: &Limits) -> Result<SalaryInput, ValidationError> {
        let payee = match validation::exactly_one(
            ExclusivePair::TeacherOrStaff,
            self.teacher_id,
            self.staff_id,
        )? {
            Either::First(id) => Payee::Teacher(id),
            Either::Second(id) => Payee::Staff(id),
        };
        let amount = validation::present("Amount", self.amount)?;
        Ok(SalaryInput {
            payee,
            figures: SalaryFigures::new(limits, amount, self.tax, self.pf, self.bonus)?,
            month: validation::required_date("month", self.month.as_deref())?,
            status: SalaryStatus::parse_or_default(self.status.as_deref())?.into(),
        })
    }
}

const fn payee_link(payee: Payee) -> Link {
    match payee {
        Payee::Teacher(id) => Link::Teacher(id),
        Payee::Staff(id) => Link::Staff(id),
    }
}

/// GET `/accounts/school/{school_id}/fees` - Fees of a school.
async fn list_school_fees(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(school_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = SchoolId(school_id);
    Guard::new(db, &principal)
        .under(Action::Read, EntityKind::Fee, Link::School(school))
        .await?;

    Ok(Json(FeeRepository::new(db).list_for_school(school).await?))
}

/// GET `/fees/student/{student_id}` - One student's fees.
async fn list_student_fees(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(student_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .under(Action::Read, EntityKind::Fee, Link::Student(student_id))
        .await?;

    Ok(Json(FeeRepository::new(db).list_for_student(student_id).await?))
}

/// POST `/accounts/fees` - Charge a fee.
async fn create_fee(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<FeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&state.limits)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Fee, Link::Student(input.student_id))
        .await?;
    let fee = FeeRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(fee_id = fee.id, student_id = fee.student_id, balance = %fee.balance, "Fee created");
    Ok((StatusCode::CREATED, Json(fee)))
}

/// PUT `/accounts/fees/{id}` - Replace a fee.
async fn update_fee(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<FeeRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&state.limits)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .relocate(EntityKind::Fee, id, Link::Student(input.student_id))
        .await?;
    let fee = FeeRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(fee_id = id, balance = %fee.balance, "Fee updated");
    Ok(Json(fee))
}

/// DELETE `/accounts/fees/{id}` - Delete a fee.
async fn delete_fee(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Fee, id)
        .await?;
    FeeRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(fee_id = id, "Fee deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/accounts/school/{school_id}/teacher-salaries`
async fn list_teacher_salaries(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(school_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = SchoolId(school_id);
    Guard::new(db, &principal)
        .under(Action::Read, EntityKind::Salary, Link::School(school))
        .await?;

    Ok(Json(SalaryRepository::new(db).list_teacher_salaries(school).await?))
}

/// GET `/accounts/school/{school_id}/staff-salaries`
async fn list_staff_salaries(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(school_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = SchoolId(school_id);
    Guard::new(db, &principal)
        .under(Action::Read, EntityKind::Salary, Link::School(school))
        .await?;

    Ok(Json(SalaryRepository::new(db).list_staff_salaries(school).await?))
}

/// GET `/salaries/teacher/{teacher_id}` - One teacher's salaries, newest month first.
async fn list_teacher_salary_history(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(teacher_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .under(Action::Read, EntityKind::Salary, Link::Teacher(teacher_id))
        .await?;

    Ok(Json(SalaryRepository::new(db).list_for_teacher(teacher_id).await?))
}

/// POST `/accounts/salaries` - Record a salary.
async fn create_salary(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<SalaryRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&state.limits)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Salary, payee_link(input.payee))
        .await?;
    let salary = SalaryRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(salary_id = salary.id, net_salary = %salary.net_salary, "Salary created");
    Ok((StatusCode::CREATED, Json(salary)))
}

/// PUT `/accounts/salaries/{id}` - Replace a salary.
async fn update_salary(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<SalaryRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&state.limits)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .relocate(EntityKind::Salary, id, payee_link(input.payee))
        .await?;
    let salary = SalaryRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(salary_id = id, net_salary = %salary.net_salary, "Salary updated");
    Ok(Json(salary))
}

/// DELETE `/accounts/salaries/{id}` - Delete a salary.
async fn delete_salary(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Salary, id)
        .await?;
    SalaryRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(salary_id = id, "Salary deleted");
    Ok(StatusCode::NO_CONTENT)
}
