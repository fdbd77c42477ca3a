//! Student repository for database operations.

use campus_shared::SchoolId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

use super::RepoError;
use crate::entities::{classes, students};

/// Input for creating or replacing a student.
#[derive(Debug, Clone)]
pub struct StudentInput {
    /// Full name.
    pub name: String,
    /// Roll number, unique within the class.
    pub roll_no: String,
    /// Email.
    pub email: String,
    /// Gender, free text.
    pub gender: Option<String>,
    /// Class the student is enrolled in.
    pub class_id: i32,
    /// Linked Student account.
    pub user_id: Option<i32>,
}

/// Student with the name of their class.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StudentRow {
    /// Student ID.
    pub id: i32,
    /// Full name.
    pub name: String,
    /// Roll number.
    pub roll_no: String,
    /// Email.
    pub email: String,
    /// Gender.
    pub gender: Option<String>,
    /// Class ID.
    pub class_id: i32,
    /// Linked account.
    pub user_id: Option<i32>,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Name of the class.
    pub class_name: String,
}

/// Student repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct StudentRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> StudentRepository<'c, C> {
    /// Creates a new student repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    fn with_class() -> Select<students::Entity> {
        students::Entity::find()
            .join(JoinType::InnerJoin, students::Relation::Classes.def())
            .column_as(classes::Column::Name, "class_name")
    }

    /// Lists students of one school, or of every school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<StudentRow>, RepoError> {
        let mut query = Self::with_class().order_by_asc(students::Column::Name);
        if let Some(school) = school {
            query = query.filter(classes::Column::SchoolId.eq(school.0));
        }
        Ok(query.into_model::<StudentRow>().all(self.db).await?)
    }

    /// Lists the students of one class, by roll number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_class(&self, class_id: i32) -> Result<Vec<StudentRow>, RepoError> {
        Ok(Self::with_class()
            .filter(students::Column::ClassId.eq(class_id))
            .order_by_asc(students::Column::RollNo)
            .into_model::<StudentRow>()
            .all(self.db)
            .await?)
    }

    /// Finds a student by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, id: i32) -> Result<Option<StudentRow>, RepoError> {
        Ok(Self::with_class()
            .filter(students::Column::Id.eq(id))
            .into_model::<StudentRow>()
            .one(self.db)
            .await?)
    }

    /// Fails with `Conflict` if the roll number is taken in the class.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Conflict` on a clash.
    pub async fn ensure_roll_no_free(
        &self,
        class_id: i32,
        roll_no: &str,
        except: Option<i32>,
    ) -> Result<(), RepoError> {
        let mut query = students::Entity::find()
            .filter(students::Column::ClassId.eq(class_id))
            .filter(students::Column::RollNo.eq(roll_no));
        if let Some(id) = except {
            query = query.filter(students::Column::Id.ne(id));
        }

        if query.count(self.db).await? > 0 {
            return Err(RepoError::Conflict(
                "Roll number already exists in this class".into(),
            ));
        }
        Ok(())
    }

    /// Creates a student.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: StudentInput) -> Result<students::Model, RepoError> {
        let student = students::ActiveModel {
            name: Set(input.name),
            roll_no: Set(input.roll_no),
            email: Set(input.email),
            gender: Set(input.gender),
            class_id: Set(input.class_id),
            user_id: Set(input.user_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(student.insert(self.db).await?)
    }

    /// Replaces a student's details.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the student does not exist.
    pub async fn update(&self, id: i32, input: StudentInput) -> Result<students::Model, RepoError> {
        let student = students::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepoError::NotFound("Student not found".into()))?;

        let mut active: students::ActiveModel = student.into();
        active.name = Set(input.name);
        active.roll_no = Set(input.roll_no);
        active.email = Set(input.email);
        active.gender = Set(input.gender);
        active.class_id = Set(input.class_id);
        active.user_id = Set(input.user_id);

        Ok(active.update(self.db).await?)
    }

    /// Deletes a student with their attendance and fees.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the student does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = students::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("Student not found".into()));
        }
        Ok(())
    }
}
