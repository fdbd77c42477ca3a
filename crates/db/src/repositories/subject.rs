//! Subject repository for database operations.

use campus_shared::SchoolId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

use super::RepoError;
use crate::entities::{classes, subjects, teachers};

/// Input for creating or replacing a subject.
#[derive(Debug, Clone)]
pub struct SubjectInput {
    /// Class the subject is taught in.
    pub class_id: i32,
    /// Subject name.
    pub name: String,
    /// Teacher of the subject; must work at the class's school.
    pub teacher_id: i32,
    /// Weekly periods, positive.
    pub periods_per_week: i32,
}

/// Subject with its class and teacher names.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubjectRow {
    /// Subject ID.
    pub id: i32,
    /// Class ID.
    pub class_id: i32,
    /// Subject name.
    pub name: String,
    /// Teacher ID.
    pub teacher_id: i32,
    /// Weekly periods.
    pub periods_per_week: i32,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Name of the class.
    pub class_name: String,
    /// Name of the teacher.
    pub teacher_name: String,
}

/// Subject repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct SubjectRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> SubjectRepository<'c, C> {
    /// Creates a new subject repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    fn with_names() -> Select<subjects::Entity> {
        subjects::Entity::find()
            .join(JoinType::InnerJoin, subjects::Relation::Classes.def())
            .join(JoinType::InnerJoin, subjects::Relation::Teachers.def())
            .column_as(classes::Column::Name, "class_name")
            .column_as(teachers::Column::Name, "teacher_name")
    }

    /// Lists subjects of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<SubjectRow>, RepoError> {
        let mut query = Self::with_names()
            .order_by_asc(classes::Column::Name)
            .order_by_asc(subjects::Column::Name);
        if let Some(school) = school {
            query = query.filter(classes::Column::SchoolId.eq(school.0));
        }
        Ok(query.into_model::<SubjectRow>().all(self.db).await?)
    }

    /// Lists the subjects of one class.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_class(&self, class_id: i32) -> Result<Vec<SubjectRow>, RepoError> {
        Ok(Self::with_names()
            .filter(subjects::Column::ClassId.eq(class_id))
            .order_by_asc(subjects::Column::Name)
            .into_model::<SubjectRow>()
            .all(self.db)
            .await?)
    }

    /// Finds a subject by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<SubjectRow>, RepoError> {
        Ok(Self::with_names()
            .filter(subjects::Column::Id.eq(id))
            .into_model::<SubjectRow>()
            .one(self.db)
            .await?)
    }

    /// Fails unless the teacher works at `school`.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the teacher is missing or works elsewhere.
    pub async fn ensure_teacher_in_school(
        &self,
        teacher_id: i32,
        school: SchoolId,
    ) -> Result<(), RepoError> {
        let found = teachers::Entity::find_by_id(teacher_id)
            .filter(teachers::Column::SchoolId.eq(school.0))
            .one(self.db)
            .await?;

        if found.is_none() {
            return Err(RepoError::NotFound(
                "Teacher not found or does not belong to the same school as the class".into(),
            ));
        }
        Ok(())
    }

    /// Creates a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: SubjectInput) -> Result<subjects::Model, RepoError> {
        let subject = subjects::ActiveModel {
            class_id: Set(input.class_id),
            name: Set(input.name),
            teacher_id: Set(input.teacher_id),
            periods_per_week: Set(input.periods_per_week),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(subject.insert(self.db).await?)
    }

    /// Replaces a subject's details.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the subject does not exist.
    pub async fn update(&self, id: i32, input: SubjectInput) -> Result<subjects::Model, RepoError> {
        let subject = subjects::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepoError::NotFound("Subject not found".into()))?;

        let mut active: subjects::ActiveModel = subject.into();
        active.class_id = Set(input.class_id);
        active.name = Set(input.name);
        active.teacher_id = Set(input.teacher_id);
        active.periods_per_week = Set(input.periods_per_week);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a subject.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the subject does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = subjects::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Subject not found".into()));
        }
        Ok(())
    }
}
