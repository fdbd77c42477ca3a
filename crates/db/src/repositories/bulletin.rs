//! Notice, event and holiday repositories.
//!
//! All three are school-level bulletins: readable by every member of the
//! school, written by the school account.

use campus_shared::SchoolId;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::RepoError;
use crate::entities::{events, holidays, notices};

/// Input for creating or replacing a notice or an event.
#[derive(Debug, Clone)]
pub struct BulletinInput {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Date the bulletin refers to.
    pub date: NaiveDate,
    /// Owning school.
    pub school_id: SchoolId,
}

/// Input for creating or replacing a holiday.
#[derive(Debug, Clone)]
pub struct HolidayInput {
    /// Holiday name.
    pub name: String,
    /// First day off.
    pub start_date: NaiveDate,
    /// Last day off, not before `start_date`.
    pub end_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Owning school.
    pub school_id: SchoolId,
}

macro_rules! dated_bulletin_repository {
    ($(#[$doc:meta])* $name:ident, $module:ident, $label:literal, $order:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'c, C> {
            db: &'c C,
        }

        impl<'c, C: ConnectionTrait> $name<'c, C> {
            /// Creates a new repository.
            #[must_use]
            pub const fn new(db: &'c C) -> Self {
                Self { db }
            }

            /// Lists rows of one school, or of every school.
            ///
            /// # Errors
            ///
            /// Returns an error if the database query fails.
            pub async fn list(
                &self,
                school: Option<SchoolId>,
            ) -> Result<Vec<$module::Model>, RepoError> {
                let mut query = $module::Entity::find().order_by_desc($module::Column::$order);
                if let Some(school) = school {
                    query = query.filter($module::Column::SchoolId.eq(school.0));
                }
                Ok(query.all(self.db).await?)
            }

            /// Finds a row by ID.
            ///
            /// # Errors
            ///
            /// Returns an error if the database query fails.
            pub async fn find(&self, id: i32) -> Result<Option<$module::Model>, RepoError> {
                Ok($module::Entity::find_by_id(id).one(self.db).await?)
            }

            /// Creates a row.
            ///
            /// # Errors
            ///
            /// Returns an error if the database insert fails.
            pub async fn create(&self, input: BulletinInput) -> Result<$module::Model, RepoError> {
                let row = $module::ActiveModel {
                    title: Set(input.title),
                    description: Set(input.description),
                    date: Set(input.date),
                    school_id: Set(input.school_id.0),
                    created_at: Set(chrono::Utc::now().into()),
                    ..Default::default()
                };

                Ok(row.insert(self.db).await?)
            }

            /// Replaces a row.
            ///
            /// # Errors
            ///
            /// Returns `RepoError::NotFound` if the row does not exist.
            pub async fn update(
                &self,
                id: i32,
                input: BulletinInput,
            ) -> Result<$module::Model, RepoError> {
                let row = self
                    .find(id)
                    .await?
                    .ok_or_else(|| RepoError::NotFound(concat!($label, " not found").into()))?;

                let mut active: $module::ActiveModel = row.into();
                active.title = Set(input.title);
                active.description = Set(input.description);
                active.date = Set(input.date);
                active.school_id = Set(input.school_id.0);

                Ok(active.update(self.db).await?)
            }

            /// Deletes a row.
            ///
            /// # Errors
            ///
            /// Returns `RepoError::NotFound` if the row does not exist.
            pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
                let result = $module::Entity::delete_by_id(id).exec(self.db).await?;
                if result.rows_affected == 0 {
                    return Err(RepoError::NotFound(concat!($label, " not found").into()));
                }
                Ok(())
            }
        }
    };
}

dated_bulletin_repository!(
    /// Notice repository, newest first.
    NoticeRepository,
    notices,
    "Notice",
    CreatedAt
);

dated_bulletin_repository!(
    /// Event repository, latest date first.
    EventRepository,
    events,
    "Event",
    Date
);

/// Holiday repository, earliest start first.
#[derive(Debug, Clone, Copy)]
pub struct HolidayRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> HolidayRepository<'c, C> {
    /// Creates a new holiday repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Lists holidays of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<holidays::Model>, RepoError> {
        let mut query = holidays::Entity::find().order_by_asc(holidays::Column::StartDate);
        if let Some(school) = school {
            query = query.filter(holidays::Column::SchoolId.eq(school.0));
        }
        Ok(query.all(self.db).await?)
    }

    /// Finds a holiday by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<holidays::Model>, RepoError> {
        Ok(holidays::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Creates a holiday.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: HolidayInput) -> Result<holidays::Model, RepoError> {
        let holiday = holidays::ActiveModel {
            name: Set(input.name),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            description: Set(input.description),
            school_id: Set(input.school_id.0),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(holiday.insert(self.db).await?)
    }

    /// Replaces a holiday.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the holiday does not exist.
    pub async fn update(&self, id: i32, input: HolidayInput) -> Result<holidays::Model, RepoError> {
        let holiday = self
            .find(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Holiday not found".into()))?;

        let mut active: holidays::ActiveModel = holiday.into();
        active.name = Set(input.name);
        active.start_date = Set(input.start_date);
        active.end_date = Set(input.end_date);
        active.description = Set(input.description);
        active.school_id = Set(input.school_id.0);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a holiday.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the holiday does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = holidays::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Holiday not found".into()));
        }
        Ok(())
    }
}
