//! User repository for database operations.

use campus_core::auth::Role;
use campus_shared::SchoolId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use tracing::info;

use super::RepoError;
use crate::entities::{sea_orm_active_enums::UserRole, staff, students, teachers, users};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name (unique).
    pub username: String,
    /// Email (unique).
    pub email: String,
    /// Argon2 hash of the password.
    pub password_hash: String,
    /// Role.
    pub role: Role,
    /// Home school, `None` for admins.
    pub school_id: Option<SchoolId>,
    /// Free-form permissions document, stored verbatim.
    pub permissions: Option<serde_json::Value>,
}

/// Editable account fields.
#[derive(Debug, Clone)]
pub struct UserChanges {
    /// Login name (unique).
    pub username: String,
    /// Email (unique).
    pub email: String,
    /// Role.
    pub role: Role,
    /// Home school, `None` for admins.
    pub school_id: Option<SchoolId>,
    /// Permissions document; `None` keeps the stored one.
    pub permissions: Option<serde_json::Value>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone, Copy)]
pub struct UserRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> UserRepository<'c, C> {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<users::Model>, RepoError> {
        Ok(users::Entity::find_by_id(id).one(self.db).await?)
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, RepoError> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db)
            .await?)
    }

    /// Lists accounts: all of them, or those of one school.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, school: Option<SchoolId>) -> Result<Vec<users::Model>, RepoError> {
        let mut query = users::Entity::find().order_by_asc(users::Column::Id);
        if let Some(school) = school {
            query = query.filter(users::Column::SchoolId.eq(school.0));
        }
        Ok(query.all(self.db).await?)
    }

    /// Fails with `Conflict` if another account already uses the username or email.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Conflict` on a clash.
    pub async fn ensure_unique(
        &self,
        username: &str,
        email: &str,
        except: Option<i32>,
    ) -> Result<(), RepoError> {
        let mut query = users::Entity::find().filter(
            Condition::any()
                .add(users::Column::Username.eq(username))
                .add(users::Column::Email.eq(email)),
        );
        if let Some(id) = except {
            query = query.filter(users::Column::Id.ne(id));
        }

        if query.count(self.db).await? > 0 {
            return Err(RepoError::Conflict("Username or email already exists".into()));
        }
        Ok(())
    }

    /// Checks that `user_id` is an account of `role` in `school`, so it may be
    /// linked to a person record.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::Invalid` if the account is missing or does not fit.
    pub async fn ensure_linkable(
        &self,
        user_id: i32,
        role: Role,
        school: SchoolId,
    ) -> Result<(), RepoError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| RepoError::Invalid("Linked account not found".into()))?;

        if Role::from(user.role) != role || user.school_id != Some(school.0) {
            return Err(RepoError::Invalid(format!(
                "Linked account must be a {role} account of the same school"
            )));
        }
        Ok(())
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: NewUser) -> Result<users::Model, RepoError> {
        let user = users::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            role: Set(UserRole::from(input.role)),
            school_id: Set(input.school_id.map(SchoolId::into_inner)),
            permissions: Set(input.permissions),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        Ok(user.insert(self.db).await?)
    }

    /// Updates an account's details.
    ///
    /// A linked account must keep its person's role and school, so a change
    /// of either unlinks the account from every student, teacher and staff
    /// row that points at it.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the account does not exist.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<users::Model, RepoError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("User not found".into()))?;

        let new_school = changes.school_id.map(SchoolId::into_inner);
        if Role::from(user.role) != changes.role || user.school_id != new_school {
            let unlinked = self.unlink_people(id).await?;
            if unlinked > 0 {
                info!(user_id = id, unlinked, "Account unlinked after role or school change");
            }
        }

        let mut active: users::ActiveModel = user.into();
        active.username = Set(changes.username);
        active.email = Set(changes.email);
        active.role = Set(UserRole::from(changes.role));
        active.school_id = Set(new_school);
        if let Some(permissions) = changes.permissions {
            active.permissions = Set(Some(permissions));
        }

        Ok(active.update(self.db).await?)
    }

    /// Clears every person link to account `id`. Returns the rows touched.
    async fn unlink_people(&self, id: i32) -> Result<u64, RepoError> {
        let none = || Expr::value(Option::<i32>::None);
        let students = students::Entity::update_many()
            .col_expr(students::Column::UserId, none())
            .filter(students::Column::UserId.eq(id))
            .exec(self.db)
            .await?;
        let teachers = teachers::Entity::update_many()
            .col_expr(teachers::Column::UserId, none())
            .filter(teachers::Column::UserId.eq(id))
            .exec(self.db)
            .await?;
        let staff = staff::Entity::update_many()
            .col_expr(staff::Column::UserId, none())
            .filter(staff::Column::UserId.eq(id))
            .exec(self.db)
            .await?;

        Ok(students.rows_affected + teachers.rows_affected + staff.rows_affected)
    }

    /// Replaces an account's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the account does not exist.
    pub async fn set_password_hash(&self, id: i32, password_hash: String) -> Result<(), RepoError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("User not found".into()))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.update(self.db).await?;
        Ok(())
    }

    /// Deletes an account. Linked person records keep their row and lose the link.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotFound` if the account does not exist.
    pub async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let result = users::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
