//! School repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use super::RepoError;
use crate::entities::schools;

/// Input for creating or replacing a school.
#[derive(Debug, Clone)]
pub struct SchoolInput {
    /// School name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Contact phone or person.
    pub contact: String,
    /// Contact email.
    pub email: String,
}

/// Id and name, for pickers.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchoolName {
    /// School ID.
    pub id: i32,
    /// School name.
    pub name: String,
}

/// School repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct SchoolRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> SchoolRepository<'c, C> {
    /// Creates a new school repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists schools, optionally only one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, only: Option<i32>) -> Result<Vec<schools::Model>, RepoError> {
        let mut query = schools::Entity::find().order_by_asc(schools::Column::Id);
        if let Some(id) = only {
            query = query.filter(schools::Column::Id.eq(id));
        }
        Ok(query.all(self.db).await?)
    }

    /// Lists every school's id and name, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_names(&self) -> Result<Vec<SchoolName>, RepoError> {
        Ok(schools::Entity::find()
            .select_only()
            .column(schools::Column::Id)
            .column(schools::Column::Name)
            .order_by_asc(schools::Column::Name)
            .into_model::<SchoolName>()
            .all(self.db)
            .await?)
    }

    /// Finds a school by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<schools::Model>, RepoError> {
        Ok(schools::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Creates a school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: SchoolInput) -> Result<schools::Model, RepoError> {
        let school = schools::ActiveModel {
            name: Set(input.name),
            address: Set(input.address),
            contact: Set(input.contact),
            email: Set(input.email),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(school.insert(self.db).await?)
    }

    /// Replaces a school's details.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the school does not exist.
    pub async fn update(&self, id: i32, input: SchoolInput) -> Result<schools::Model, RepoError> {
        let school = self
            .find(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("School not found".into()))?;

        let mut active: schools::ActiveModel = school.into();
        active.name = Set(input.name);
        active.address = Set(input.address);
        active.contact = Set(input.contact);
        active.email = Set(input.email);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a school and, through cascades, everything it owns.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the school does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = schools::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("School not found".into()));
        }
        Ok(())
    }
}
