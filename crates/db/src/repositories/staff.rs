//! Staff repository for database operations.

use campus_shared::SchoolId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::RepoError;
use crate::entities::staff;

/// Input for creating or replacing a staff member.
#[derive(Debug, Clone)]
pub struct StaffInput {
    /// Full name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Employing school.
    pub school_id: SchoolId,
    /// Linked Staff account.
    pub user_id: Option<i32>,
}

/// Staff repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct StaffRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> StaffRepository<'c, C> {
    /// Creates a new staff repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists staff of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<staff::Model>, RepoError> {
        let mut query = staff::Entity::find().order_by_asc(staff::Column::Name);
        if let Some(school) = school {
            query = query.filter(staff::Column::SchoolId.eq(school.0));
        }
        Ok(query.all(self.db).await?)
    }

    /// Finds a staff member by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<staff::Model>, RepoError> {
        Ok(staff::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Creates a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: StaffInput) -> Result<staff::Model, RepoError> {
        let member = staff::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            school_id: Set(input.school_id.0),
            user_id: Set(input.user_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(member.insert(self.db).await?)
    }

    /// Replaces a staff member's details.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the staff member does not exist.
    pub async fn update(&self, id: i32, input: StaffInput) -> Result<staff::Model, RepoError> {
        let member = self
            .find(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Staff not found".into()))?;

        let mut active: staff::ActiveModel = member.into();
        active.name = Set(input.name);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.school_id = Set(input.school_id.0);
        active.user_id = Set(input.user_id);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a staff member with their salaries.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the staff member does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = staff::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Staff not found".into()));
        }
        Ok(())
    }
}
