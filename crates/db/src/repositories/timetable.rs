//! Timetable repository for database operations.

use campus_shared::SchoolId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

use super::RepoError;
use crate::entities::{classes, teachers, timetables};

/// Input for creating or replacing a timetable entry.
#[derive(Debug, Clone)]
pub struct TimetableInput {
    /// Class the period belongs to.
    pub class_id: i32,
    /// Weekday name.
    pub day: String,
    /// Period label, such as "1" or "09:00-09:45".
    pub period: String,
    /// Subject taught in the period.
    pub subject: String,
    /// Teacher taking the period; must work at the class's school.
    pub teacher_id: Option<i32>,
}

/// Timetable entry with its class and teacher names.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimetableRow {
    /// Entry ID.
    pub id: i32,
    /// Class ID.
    pub class_id: i32,
    /// Weekday name.
    pub day: String,
    /// Period label.
    pub period: String,
    /// Subject taught.
    pub subject: String,
    /// Teacher ID, if assigned.
    pub teacher_id: Option<i32>,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Name of the class.
    pub class_name: String,
    /// Section of the class.
    pub class_section: String,
    /// Name of the teacher, if assigned.
    pub teacher_name: Option<String>,
}

/// Timetable repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct TimetableRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> TimetableRepository<'c, C> {
    /// Creates a new timetable repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    fn with_names() -> Select<timetables::Entity> {
        timetables::Entity::find()
            .join(JoinType::InnerJoin, timetables::Relation::Classes.def())
            .join(JoinType::LeftJoin, timetables::Relation::Teachers.def())
            .column_as(classes::Column::Name, "class_name")
            .column_as(classes::Column::Section, "class_section")
            .column_as(teachers::Column::Name, "teacher_name")
    }

    /// Lists timetable entries of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<TimetableRow>, RepoError> {
        let mut query = Self::with_names()
            .order_by_asc(classes::Column::Name)
            .order_by_asc(timetables::Column::Day)
            .order_by_asc(timetables::Column::Period);
        if let Some(school) = school {
            query = query.filter(classes::Column::SchoolId.eq(school.0));
        }
        Ok(query.into_model::<TimetableRow>().all(self.db).await?)
    }

    /// Lists the timetable of one class.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_class(&self, class_id: i32) -> Result<Vec<TimetableRow>, RepoError> {
        Ok(Self::with_names()
            .filter(timetables::Column::ClassId.eq(class_id))
            .order_by_asc(timetables::Column::Day)
            .order_by_asc(timetables::Column::Period)
            .into_model::<TimetableRow>()
            .all(self.db)
            .await?)
    }

    /// Finds a timetable entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<TimetableRow>, RepoError> {
        Ok(Self::with_names()
            .filter(timetables::Column::Id.eq(id))
            .into_model::<TimetableRow>()
            .one(self.db)
            .await?)
    }

    /// Creates a timetable entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: TimetableInput) -> Result<timetables::Model, RepoError> {
        let entry = timetables::ActiveModel {
            class_id: Set(input.class_id),
            day: Set(input.day),
            period: Set(input.period),
            subject: Set(input.subject),
            teacher_id: Set(input.teacher_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(entry.insert(self.db).await?)
    }

    /// Replaces a timetable entry.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the entry does not exist.
    pub async fn update(
        &self,
        id: i32,
        input: TimetableInput,
    ) -> Result<timetables::Model, RepoError> {
        let entry = timetables::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepoError::NotFound("Timetable entry not found".into()))?;

        let mut active: timetables::ActiveModel = entry.into();
        active.class_id = Set(input.class_id);
        active.day = Set(input.day);
        active.period = Set(input.period);
        active.subject = Set(input.subject);
        active.teacher_id = Set(input.teacher_id);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a timetable entry.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the entry does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = timetables::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Timetable entry not found".into()));
        }
        Ok(())
    }
}
