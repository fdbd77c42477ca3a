//! Postgres enum types.

use campus_core::auth::Role;
use campus_core::status;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Platform administrator.
    #[sea_orm(string_value = "Admin")]
    Admin,
    /// School account.
    #[sea_orm(string_value = "School")]
    School,
    /// Teacher account.
    #[sea_orm(string_value = "Teacher")]
    Teacher,
    /// Student account.
    #[sea_orm(string_value = "Student")]
    Student,
    /// Staff account.
    #[sea_orm(string_value = "Staff")]
    Staff,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::School => Self::School,
            Role::Teacher => Self::Teacher,
            Role::Student => Self::Student,
            Role::Staff => Self::Staff,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::School => Self::School,
            UserRole::Teacher => Self::Teacher,
            UserRole::Student => Self::Student,
            UserRole::Staff => Self::Staff,
        }
    }
}

/// `attendance_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
pub enum AttendanceStatus {
    /// Attended.
    #[sea_orm(string_value = "Present")]
    Present,
    /// Did not attend.
    #[sea_orm(string_value = "Absent")]
    Absent,
}

impl From<status::AttendanceStatus> for AttendanceStatus {
    fn from(value: status::AttendanceStatus) -> Self {
        match value {
            status::AttendanceStatus::Present => Self::Present,
            status::AttendanceStatus::Absent => Self::Absent,
        }
    }
}

/// `fee_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fee_status")]
pub enum FeeStatus {
    /// Not yet paid.
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Fully paid.
    #[sea_orm(string_value = "Paid")]
    Paid,
    /// Past due.
    #[sea_orm(string_value = "Overdue")]
    Overdue,
}

impl From<status::FeeStatus> for FeeStatus {
    fn from(value: status::FeeStatus) -> Self {
        match value {
            status::FeeStatus::Pending => Self::Pending,
            status::FeeStatus::Paid => Self::Paid,
            status::FeeStatus::Overdue => Self::Overdue,
        }
    }
}

/// `salary_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "salary_status")]
pub enum SalaryStatus {
    /// Not yet paid out.
    #[sea_orm(string_value = "Not Credited")]
    #[serde(rename = "Not Credited")]
    NotCredited,
    /// Paid out.
    #[sea_orm(string_value = "Credited")]
    Credited,
}

impl From<status::SalaryStatus> for SalaryStatus {
    fn from(value: status::SalaryStatus) -> Self {
        match value {
            status::SalaryStatus::NotCredited => Self::NotCredited,
            status::SalaryStatus::Credited => Self::Credited,
        }
    }
}
