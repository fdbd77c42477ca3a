//! Storage-backed ownership lookup.
//!
//! One query per hop. The resolver in `campus_core::access` decides how far
//! to climb; this module only answers "who owns row `id` of `kind`".

use async_trait::async_trait;
use campus_core::access::{EntityKind, Link, Node, OwnershipLookup};
use campus_shared::{SchoolId, UserId};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QuerySelect};

use crate::entities::{
    attendance, classes, events, fees, holidays, notices, salaries, schools, staff, students,
    subjects, teachers, timetables, users,
};

/// Answers ownership hops against any connection, pooled or transactional.
///
/// Inside a write transaction the hop reads see the same snapshot as the
/// write that follows.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> OwnershipRepository<'c, C> {
    /// Creates a lookup over `db`.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    async fn school(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<i32> = schools::Entity::find_by_id(id)
            .select_only()
            .column(schools::Column::Id)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|id| Node::owned_by(Link::School(SchoolId(id)))))
    }

    async fn user(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<(i32, Option<i32>)> = users::Entity::find_by_id(id)
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::SchoolId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|(id, school_id)| {
            let parent = school_id.map_or(Link::Platform, |s| Link::School(SchoolId(s)));
            Node::owned_by(parent).with_account(Some(UserId(id)))
        }))
    }

    async fn class(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<i32> = classes::Entity::find_by_id(id)
            .select_only()
            .column(classes::Column::SchoolId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|school_id| Node::owned_by(Link::School(SchoolId(school_id)))))
    }

    async fn student(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<(i32, Option<i32>)> = students::Entity::find_by_id(id)
            .select_only()
            .column(students::Column::ClassId)
            .column(students::Column::UserId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|(class_id, user_id)| {
            Node::owned_by(Link::Class(class_id)).with_account(user_id.map(UserId))
        }))
    }

    async fn teacher(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<(i32, Option<i32>)> = teachers::Entity::find_by_id(id)
            .select_only()
            .column(teachers::Column::SchoolId)
            .column(teachers::Column::UserId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|(school_id, user_id)| {
            Node::owned_by(Link::School(SchoolId(school_id))).with_account(user_id.map(UserId))
        }))
    }

    async fn staff(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<(i32, Option<i32>)> = staff::Entity::find_by_id(id)
            .select_only()
            .column(staff::Column::SchoolId)
            .column(staff::Column::UserId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|(school_id, user_id)| {
            Node::owned_by(Link::School(SchoolId(school_id))).with_account(user_id.map(UserId))
        }))
    }

    async fn subject(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<i32> = subjects::Entity::find_by_id(id)
            .select_only()
            .column(subjects::Column::ClassId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|class_id| Node::owned_by(Link::Class(class_id))))
    }

    async fn timetable(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<i32> = timetables::Entity::find_by_id(id)
            .select_only()
            .column(timetables::Column::ClassId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|class_id| Node::owned_by(Link::Class(class_id))))
    }

    async fn attendance(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<(Option<i32>, Option<i32>)> = attendance::Entity::find_by_id(id)
            .select_only()
            .column(attendance::Column::StudentId)
            .column(attendance::Column::TeacherId)
            .into_tuple()
            .one(self.db)
            .await?;

        found
            .map(|pair| match pair {
                (Some(student_id), _) => Ok(Node::owned_by(Link::Student(student_id))),
                (None, Some(teacher_id)) => Ok(Node::owned_by(Link::Teacher(teacher_id))),
                (None, None) => Err(DbErr::Custom(format!(
                    "attendance {id} references neither a student nor a teacher"
                ))),
            })
            .transpose()
    }

    async fn fee(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<i32> = fees::Entity::find_by_id(id)
            .select_only()
            .column(fees::Column::StudentId)
            .into_tuple()
            .one(self.db)
            .await?;

        Ok(found.map(|student_id| Node::owned_by(Link::Student(student_id))))
    }

    async fn salary(&self, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<(Option<i32>, Option<i32>)> = salaries::Entity::find_by_id(id)
            .select_only()
            .column(salaries::Column::TeacherId)
            .column(salaries::Column::StaffId)
            .into_tuple()
            .one(self.db)
            .await?;

        found
            .map(|pair| match pair {
                (Some(teacher_id), _) => Ok(Node::owned_by(Link::Teacher(teacher_id))),
                (None, Some(staff_id)) => Ok(Node::owned_by(Link::Staff(staff_id))),
                (None, None) => Err(DbErr::Custom(format!(
                    "salary {id} references neither a teacher nor a staff member"
                ))),
            })
            .transpose()
    }

    async fn bulletin(&self, kind: EntityKind, id: i32) -> Result<Option<Node>, DbErr> {
        let found: Option<i32> = match kind {
            EntityKind::Notice => {
                notices::Entity::find_by_id(id)
                    .select_only()
                    .column(notices::Column::SchoolId)
                    .into_tuple()
                    .one(self.db)
                    .await?
            }
            EntityKind::Event => {
                events::Entity::find_by_id(id)
                    .select_only()
                    .column(events::Column::SchoolId)
                    .into_tuple()
                    .one(self.db)
                    .await?
            }
            _ => {
                holidays::Entity::find_by_id(id)
                    .select_only()
                    .column(holidays::Column::SchoolId)
                    .into_tuple()
                    .one(self.db)
                    .await?
            }
        };

        Ok(found.map(|school_id| Node::owned_by(Link::School(SchoolId(school_id)))))
    }
}

#[async_trait]
impl<C: ConnectionTrait> OwnershipLookup for OwnershipRepository<'_, C> {
    type Error = DbErr;

    async fn parent_of(&self, kind: EntityKind, id: i32) -> Result<Option<Node>, DbErr> {
        match kind {
            EntityKind::School => self.school(id).await,
            EntityKind::User => self.user(id).await,
            EntityKind::Class => self.class(id).await,
            EntityKind::Student => self.student(id).await,
            EntityKind::Teacher => self.teacher(id).await,
            EntityKind::Staff => self.staff(id).await,
            EntityKind::Subject => self.subject(id).await,
            EntityKind::Timetable => self.timetable(id).await,
            EntityKind::Attendance => self.attendance(id).await,
            EntityKind::Fee => self.fee(id).await,
            EntityKind::Salary => self.salary(id).await,
            EntityKind::Notice | EntityKind::Event | EntityKind::Holiday => {
                self.bulletin(kind, id).await
            }
        }
    }
}
