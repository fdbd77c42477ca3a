//! Fee repository for database operations.

use campus_core::finance::FeeFigures;
use campus_shared::SchoolId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

use super::RepoError;
use crate::entities::{classes, fees, sea_orm_active_enums::FeeStatus, students};

/// Input for creating or replacing a fee.
#[derive(Debug, Clone)]
pub struct FeeInput {
    /// Student charged.
    pub student_id: i32,
    /// Validated money figures.
    pub figures: FeeFigures,
    /// Due date.
    pub due_date: NaiveDate,
    /// Payment status.
    pub status: FeeStatus,
}

/// Fee with the student's name.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeeRow {
    /// Fee ID.
    pub id: i32,
    /// Student ID.
    pub student_id: i32,
    /// Amount charged.
    pub amount: Decimal,
    /// Amount paid.
    pub submitted: Decimal,
    /// Late fine.
    pub fine: Decimal,
    /// Stored balance.
    pub balance: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Payment status.
    pub status: FeeStatus,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Name of the student.
    pub student_name: String,
}

/// Fee repository.
#[derive(Debug, Clone, Copy)]
pub struct FeeRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> FeeRepository<'c, C> {
    /// Creates a new fee repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    fn with_student() -> Select<fees::Entity> {
        fees::Entity::find()
            .join(JoinType::InnerJoin, fees::Relation::Students.def())
            .column_as(students::Column::Name, "student_name")
    }

    /// Lists every fee charged in a school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_school(&self, school: SchoolId) -> Result<Vec<FeeRow>, RepoError> {
        Ok(Self::with_student()
            .join(JoinType::InnerJoin, students::Relation::Classes.def())
            .filter(classes::Column::SchoolId.eq(school.0))
            .order_by_desc(fees::Column::DueDate)
            .into_model::<FeeRow>()
            .all(self.db)
            .await?)
    }

    /// Lists one student's fees.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_student(&self, student_id: i32) -> Result<Vec<FeeRow>, RepoError> {
        Ok(Self::with_student()
            .filter(fees::Column::StudentId.eq(student_id))
            .order_by_desc(fees::Column::DueDate)
            .into_model::<FeeRow>()
            .all(self.db)
            .await?)
    }

    /// Charges a fee, storing its balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: FeeInput) -> Result<fees::Model, RepoError> {
        let fee = fees::ActiveModel {
            student_id: Set(input.student_id),
            amount: Set(input.figures.amount),
            submitted: Set(input.figures.submitted),
            fine: Set(input.figures.fine),
            balance: Set(input.figures.balance()),
            due_date: Set(input.due_date),
            status: Set(input.status),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(fee.insert(self.db).await?)
    }

    /// Replaces a fee, recomputing its balance.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the fee does not exist.
    pub async fn update(&self, id: i32, input: FeeInput) -> Result<fees::Model, RepoError> {
        let fee = fees::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepoError::NotFound("Fee not found".into()))?;

        let mut active: fees::ActiveModel = fee.into();
        active.student_id = Set(input.student_id);
        active.amount = Set(input.figures.amount);
        active.submitted = Set(input.figures.submitted);
        active.fine = Set(input.figures.fine);
        active.balance = Set(input.figures.balance());
        active.due_date = Set(input.due_date);
        active.status = Set(input.status);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a fee.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the fee does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = fees::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Fee not found".into()));
        }
        Ok(())
    }
}
