//! Salary repository for database operations.

use campus_core::finance::SalaryFigures;
use campus_shared::SchoolId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

use super::RepoError;
use crate::entities::{salaries, sea_orm_active_enums::SalaryStatus, staff, teachers};

/// Employee a salary is paid to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payee {
    /// A teacher's salary.
    Teacher(i32),
    /// A staff member's salary.
    Staff(i32),
}

/// Input for creating or replacing a salary.
#[derive(Debug, Clone)]
pub struct SalaryInput {
    /// Employee paid.
    pub payee: Payee,
    /// Validated money figures.
    pub figures: SalaryFigures,
    /// Month paid for, as its first day.
    pub month: NaiveDate,
    /// Payout status.
    pub status: SalaryStatus,
}

/// Teacher salary with the teacher's name.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeacherSalaryRow {
    /// Salary ID.
    pub id: i32,
    /// Teacher ID.
    pub teacher_id: Option<i32>,
    /// Gross amount.
    pub amount: Decimal,
    /// Tax withheld.
    pub tax: Decimal,
    /// Provident fund deduction.
    #[serde(rename = "PF")]
    pub pf: Decimal,
    /// Bonus.
    pub bonus: Decimal,
    /// Stored net salary.
    pub net_salary: Decimal,
    /// Month paid for.
    pub month: NaiveDate,
    /// Payout status.
    pub status: SalaryStatus,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Name of the teacher.
    pub teacher_name: String,
}

/// Staff salary with the staff member's name.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StaffSalaryRow {
    /// Salary ID.
    pub id: i32,
    /// Staff ID.
    pub staff_id: Option<i32>,
    /// Gross amount.
    pub amount: Decimal,
    /// Tax withheld.
    pub tax: Decimal,
    /// Provident fund deduction.
    #[serde(rename = "PF")]
    pub pf: Decimal,
    /// Bonus.
    pub bonus: Decimal,
    /// Stored net salary.
    pub net_salary: Decimal,
    /// Month paid for.
    pub month: NaiveDate,
    /// Payout status.
    pub status: SalaryStatus,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Name of the staff member.
    pub staff_name: String,
}

/// Salary repository.
#[derive(Debug, Clone, Copy)]
pub struct SalaryRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> SalaryRepository<'c, C> {
    /// Creates a new salary repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists the salaries of a school's teachers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_teacher_salaries(
        &self,
        school: SchoolId,
    ) -> Result<Vec<TeacherSalaryRow>, RepoError> {
        Ok(salaries::Entity::find()
            .join(JoinType::InnerJoin, salaries::Relation::Teachers.def())
            .column_as(teachers::Column::Name, "teacher_name")
            .filter(teachers::Column::SchoolId.eq(school.0))
            .order_by_desc(salaries::Column::Month)
            .into_model::<TeacherSalaryRow>()
            .all(self.db)
            .await?)
    }

    /// Lists the salaries of a school's staff.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_staff_salaries(
        &self,
        school: SchoolId,
    ) -> Result<Vec<StaffSalaryRow>, RepoError> {
        Ok(salaries::Entity::find()
            .join(JoinType::InnerJoin, salaries::Relation::Staff.def())
            .column_as(staff::Column::Name, "staff_name")
            .filter(staff::Column::SchoolId.eq(school.0))
            .order_by_desc(salaries::Column::Month)
            .into_model::<StaffSalaryRow>()
            .all(self.db)
            .await?)
    }

    /// Lists one teacher's salaries, newest month first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_teacher(&self, teacher_id: i32) -> Result<Vec<salaries::Model>, RepoError> {
        Ok(salaries::Entity::find()
            .filter(salaries::Column::TeacherId.eq(teacher_id))
            .order_by_desc(salaries::Column::Month)
            .all(self.db)
            .await?)
    }

    /// Records a salary, storing its net amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: SalaryInput) -> Result<salaries::Model, RepoError> {
        let (teacher_id, staff_id) = input.payee.columns();
        let salary = salaries::ActiveModel {
            teacher_id: Set(teacher_id),
            staff_id: Set(staff_id),
            amount: Set(input.figures.amount),
            tax: Set(input.figures.tax),
            pf: Set(input.figures.pf),
            bonus: Set(input.figures.bonus),
            net_salary: Set(input.figures.net()),
            month: Set(input.month),
            status: Set(input.status),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(salary.insert(self.db).await?)
    }

    /// Replaces a salary, recomputing its net amount.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the salary does not exist.
    pub async fn update(&self, id: i32, input: SalaryInput) -> Result<salaries::Model, RepoError> {
        let salary = salaries::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepoError::NotFound("Salary not found".into()))?;

        let (teacher_id, staff_id) = input.payee.columns();
        let mut active: salaries::ActiveModel = salary.into();
        active.teacher_id = Set(teacher_id);
        active.staff_id = Set(staff_id);
        active.amount = Set(input.figures.amount);
        active.tax = Set(input.figures.tax);
        active.pf = Set(input.figures.pf);
        active.bonus = Set(input.figures.bonus);
        active.net_salary = Set(input.figures.net());
        active.month = Set(input.month);
        active.status = Set(input.status);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a salary.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the salary does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = salaries::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Salary not found".into()));
        }
        Ok(())
    }
}

impl Payee {
    const fn columns(self) -> (Option<i32>, Option<i32>) {
        match self {
            Self::Teacher(id) => (Some(id), None),
            Self::Staff(id) => (None, Some(id)),
        }
    }
}

impl salaries::Model {
    /// The employee this salary is paid to.
    #[must_use]
    pub fn payee(&self) -> Option<Payee> {
        match (self.teacher_id, self.staff_id) {
            (Some(id), None) => Some(Payee::Teacher(id)),
            (None, Some(id)) => Some(Payee::Staff(id)),
            _ => None,
        }
    }
}
