//! Attendance repository for database operations.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::SimpleExpr,
};

use super::RepoError;
use crate::entities::{attendance, sea_orm_active_enums::AttendanceStatus};

/// Person an attendance record is kept for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attendee {
    /// A student's attendance.
    Student(i32),
    /// A teacher's attendance.
    Teacher(i32),
}

impl Attendee {
    const fn label(self) -> &'static str {
        match self {
            Self::Student(_) => "student",
            Self::Teacher(_) => "teacher",
        }
    }

    fn filter(self) -> SimpleExpr {
        match self {
            Self::Student(id) => attendance::Column::StudentId.eq(id),
            Self::Teacher(id) => attendance::Column::TeacherId.eq(id),
        }
    }
}

/// Attendance repository.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> AttendanceRepository<'c, C> {
    /// Creates a new attendance repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists one person's attendance, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for(&self, attendee: Attendee) -> Result<Vec<attendance::Model>, RepoError> {
        Ok(attendance::Entity::find()
            .filter(attendee.filter())
            .order_by_desc(attendance::Column::Date)
            .all(self.db)
            .await?)
    }

    /// Finds an attendance record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<attendance::Model>, RepoError> {
        Ok(attendance::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Fails if the person already has a record on `date`, other than `except`.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Conflict` on a duplicate.
    pub async fn ensure_free(
        &self,
        attendee: Attendee,
        date: NaiveDate,
        except: Option<i32>,
    ) -> Result<(), RepoError> {
        let mut query = attendance::Entity::find()
            .filter(attendee.filter())
            .filter(attendance::Column::Date.eq(date));
        if let Some(id) = except {
            query = query.filter(attendance::Column::Id.ne(id));
        }

        if query.one(self.db).await?.is_some() {
            return Err(RepoError::Conflict(format!(
                "Attendance record already exists for this {} on this date",
                attendee.label()
            )));
        }
        Ok(())
    }

    /// Records attendance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        attendee: Attendee,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<attendance::Model, RepoError> {
        let (student_id, teacher_id) = match attendee {
            Attendee::Student(id) => (Some(id), None),
            Attendee::Teacher(id) => (None, Some(id)),
        };

        let record = attendance::ActiveModel {
            student_id: Set(student_id),
            teacher_id: Set(teacher_id),
            date: Set(date),
            status: Set(status),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(record.insert(self.db).await?)
    }

    /// Changes the date and status of a record. The attendee is fixed.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the record does not exist.
    pub async fn update(
        &self,
        id: i32,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<attendance::Model, RepoError> {
        let record = self
            .find(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Attendance record not found".into()))?;

        let mut active: attendance::ActiveModel = record.into();
        active.date = Set(date);
        active.status = Set(status);

        Ok(active.update(self.db).await?)
    }

    /// Deletes an attendance record.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the record does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = attendance::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Attendance record not found".into()));
        }
        Ok(())
    }
}

impl attendance::Model {
    /// The person this record is kept for.
    #[must_use]
    pub fn attendee(&self) -> Option<Attendee> {
        match (self.student_id, self.teacher_id) {
            (Some(id), None) => Some(Attendee::Student(id)),
            (None, Some(id)) => Some(Attendee::Teacher(id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_the_attendee() {
        assert_eq!(Attendee::Student(1).label(), "student");
        assert_eq!(Attendee::Teacher(1).label(), "teacher");
    }
}
