//! Class repository for database operations.

use campus_shared::SchoolId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::RepoError;
use crate::entities::{classes, students};

/// Input for creating or replacing a class.
#[derive(Debug, Clone)]
pub struct ClassInput {
    /// Class name, e.g. "5A".
    pub name: String,
    /// Section.
    pub section: String,
    /// Room, if assigned.
    pub room: Option<String>,
    /// Owning school.
    pub school_id: SchoolId,
}

/// Class repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct ClassRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> ClassRepository<'c, C> {
    /// Creates a new class repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists classes of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<classes::Model>, RepoError> {
        let mut query = classes::Entity::find()
            .order_by_asc(classes::Column::SchoolId)
            .order_by_asc(classes::Column::Name);
        if let Some(school) = school {
            query = query.filter(classes::Column::SchoolId.eq(school.0));
        }
        Ok(query.all(self.db).await?)
    }

    /// Finds a class by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<classes::Model>, RepoError> {
        Ok(classes::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Creates a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: ClassInput) -> Result<classes::Model, RepoError> {
        let class = classes::ActiveModel {
            name: Set(input.name),
            section: Set(input.section),
            room: Set(input.room),
            school_id: Set(input.school_id.0),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(class.insert(self.db).await?)
    }

    /// Replaces a class's details.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the class does not exist.
    pub async fn update(&self, id: i32, input: ClassInput) -> Result<classes::Model, RepoError> {
        let class = self
            .find(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Class not found".into()))?;

        let mut active: classes::ActiveModel = class.into();
        active.name = Set(input.name);
        active.section = Set(input.section);
        active.room = Set(input.room);
        active.school_id = Set(input.school_id.0);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a class that has no students.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::InUse` while students are enrolled, or
    /// `RepoError::NotFound` if the class does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let enrolled = students::Entity::find()
            .filter(students::Column::ClassId.eq(id))
            .count(self.db)
            .await?;

        if enrolled > 0 {
            return Err(RepoError::InUse(
                "Cannot delete class: It has associated students.".into(),
            ));
        }

        let result = classes::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Class not found".into()));
        }
        Ok(())
    }
}
