//! Dashboard queries.

use campus_core::dashboard::{DashboardStats, GenderBreakdown, MonthlyHeadcount, fill_year};
use campus_shared::SchoolId;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Statement, sea_query::Expr,
};

use super::RepoError;
use crate::entities::{classes, notices, students, subjects, teachers};

const TEACHERS_BY_MONTH: &str = r"
SELECT EXTRACT(MONTH FROM t.created_at)::int AS month, COUNT(*) AS total
FROM teachers t
WHERE EXTRACT(YEAR FROM t.created_at)::int = $1
  AND ($2::int IS NULL OR t.school_id = $2)
GROUP BY 1
";

const STUDENTS_BY_MONTH: &str = r"
SELECT EXTRACT(MONTH FROM s.created_at)::int AS month, COUNT(*) AS total
FROM students s
JOIN classes c ON c.id = s.class_id
WHERE EXTRACT(YEAR FROM s.created_at)::int = $1
  AND ($2::int IS NULL OR c.school_id = $2)
GROUP BY 1
";

#[derive(Debug, FromQueryResult)]
struct MonthCount {
    month: i32,
    total: i64,
}

/// Read-only dashboard figures for a school, or for every school.
#[derive(Debug, Clone, Copy)]
pub struct DashboardRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> DashboardRepository<'c, C> {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Headline counts.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn stats(&self, school: Option<SchoolId>) -> Result<DashboardStats, RepoError> {
        let mut students = students::Entity::find()
            .join(JoinType::InnerJoin, students::Relation::Classes.def());
        let mut teachers = teachers::Entity::find();
        let mut subjects = subjects::Entity::find()
            .join(JoinType::InnerJoin, subjects::Relation::Classes.def());
        let mut notices = notices::Entity::find();

        if let Some(school) = school {
            students = students.filter(classes::Column::SchoolId.eq(school.0));
            teachers = teachers.filter(teachers::Column::SchoolId.eq(school.0));
            subjects = subjects.filter(classes::Column::SchoolId.eq(school.0));
            notices = notices.filter(notices::Column::SchoolId.eq(school.0));
        }

        Ok(DashboardStats {
            total_students: students.count(self.db).await?,
            total_teachers: teachers.count(self.db).await?,
            total_subjects: subjects.count(self.db).await?,
            notices: notices.count(self.db).await?,
        })
    }

    /// New teachers and students per month of `year`, by creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn monthly(
        &self,
        school: Option<SchoolId>,
        year: i32,
    ) -> Result<Vec<MonthlyHeadcount>, RepoError> {
        let teachers = self.count_by_month(TEACHERS_BY_MONTH, school, year).await?;
        let students = self.count_by_month(STUDENTS_BY_MONTH, school, year).await?;
        Ok(fill_year(&teachers, &students))
    }

    async fn count_by_month(
        &self,
        sql: &str,
        school: Option<SchoolId>,
        year: i32,
    ) -> Result<Vec<(u32, u64)>, RepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [year.into(), school.map(|s| s.0).into()],
        );
        let rows = MonthCount::find_by_statement(stmt).all(self.db).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some((u32::try_from(row.month).ok()?, u64::try_from(row.total).ok()?))
            })
            .collect())
    }

    /// Student counts by gender.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn gender(&self, school: Option<SchoolId>) -> Result<GenderBreakdown, RepoError> {
        let mut query = students::Entity::find()
            .select_only()
            .column(students::Column::Gender)
            .column_as(Expr::col((students::Entity, students::Column::Id)).count(), "total")
            .join(JoinType::InnerJoin, students::Relation::Classes.def())
            .group_by(students::Column::Gender);
        if let Some(school) = school {
            query = query.filter(classes::Column::SchoolId.eq(school.0));
        }

        let rows: Vec<(Option<String>, i64)> = query.into_tuple().all(self.db).await?;

        Ok(GenderBreakdown::tally(rows.iter().map(|(gender, total)| {
            (gender.as_deref(), u64::try_from(*total).unwrap_or_default())
        })))
    }
}
