//! Teacher repository for database operations.

use campus_shared::SchoolId;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::RepoError;
use crate::entities::{subjects, teachers};

/// Input for creating or replacing a teacher.
#[derive(Debug, Clone)]
pub struct TeacherInput {
    /// Full name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Employing school.
    pub school_id: SchoolId,
    /// Linked Teacher account.
    pub user_id: Option<i32>,
}

/// Teacher repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct TeacherRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> TeacherRepository<'c, C> {
    /// Creates a new teacher repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists teachers of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<teachers::Model>, RepoError> {
        let mut query = teachers::Entity::find().order_by_asc(teachers::Column::Name);
        if let Some(school) = school {
            query = query.filter(teachers::Column::SchoolId.eq(school.0));
        }
        Ok(query.all(self.db).await?)
    }

    /// Finds a teacher by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<teachers::Model>, RepoError> {
        Ok(teachers::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Creates a teacher.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: TeacherInput) -> Result<teachers::Model, RepoError> {
        let teacher = teachers::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            date_of_birth: Set(input.date_of_birth),
            school_id: Set(input.school_id.0),
            user_id: Set(input.user_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(teacher.insert(self.db).await?)
    }

    /// Replaces a teacher's details.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the teacher does not exist.
    pub async fn update(&self, id: i32, input: TeacherInput) -> Result<teachers::Model, RepoError> {
        let teacher = self
            .find(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Teacher not found".into()))?;

        let mut active: teachers::ActiveModel = teacher.into();
        active.name = Set(input.name);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.date_of_birth = Set(input.date_of_birth);
        active.school_id = Set(input.school_id.0);
        active.user_id = Set(input.user_id);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a teacher who teaches no subject.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::InUse` naming the subjects that still reference the
    /// teacher, or `RepoError::NotFound` if the teacher does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let taught: Vec<String> = subjects::Entity::find()
            .select_only()
            .column(subjects::Column::Name)
            .filter(subjects::Column::TeacherId.eq(id))
            .order_by_asc(subjects::Column::Name)
            .into_tuple()
            .all(self.db)
            .await?;

        if !taught.is_empty() {
            return Err(RepoError::InUse(format!(
                "Cannot delete teacher: still assigned to {}",
                taught.join(", ")
            )));
        }

        let result = teachers::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Teacher not found".into()));
        }
        Ok(())
    }
}
