//! Entity kinds, actions and parties.

use serde::{Deserialize, Serialize};

/// Every kind of record the access policy knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A school (the tenant root).
    School,
    /// A login account.
    User,
    /// A class within a school.
    Class,
    /// A student, owned through their class.
    Student,
    /// A teacher of a school.
    Teacher,
    /// Non-teaching staff of a school.
    Staff,
    /// A subject taught in a class.
    Subject,
    /// One period of a class's weekly timetable.
    Timetable,
    /// A daily attendance mark for a student or a teacher.
    Attendance,
    /// A fee charged to a student.
    Fee,
    /// A monthly salary paid to a teacher or staff member.
    Salary,
    /// A school notice.
    Notice,
    /// A school event.
    Event,
    /// A school holiday.
    Holiday,
}

impl EntityKind {
    /// All kinds, in table order.
    pub const ALL: [Self; 14] = [
        Self::School,
        Self::User,
        Self::Class,
        Self::Student,
        Self::Teacher,
        Self::Staff,
        Self::Subject,
        Self::Timetable,
        Self::Attendance,
        Self::Fee,
        Self::Salary,
        Self::Notice,
        Self::Event,
        Self::Holiday,
    ];

    /// Human-readable label used in messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::School => "School",
            Self::User => "User",
            Self::Class => "Class",
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Staff => "Staff",
            Self::Subject => "Subject",
            Self::Timetable => "Timetable entry",
            Self::Attendance => "Attendance record",
            Self::Fee => "Fee record",
            Self::Salary => "Salary record",
            Self::Notice => "Notice",
            Self::Event => "Event",
            Self::Holiday => "Holiday",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Read one row or a collection.
    Read,
    /// Insert a row.
    Create,
    /// Modify a row.
    Update,
    /// Remove a row.
    Delete,
}

impl Action {
    /// Returns true for `Create`, `Update` and `Delete`.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// The person a record is about, when it is a personal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    /// A student record or something hanging off one.
    Student,
    /// A teacher record or something hanging off one.
    Teacher,
    /// A staff record or something hanging off one.
    Staff,
}

impl Party {
    /// Maps a person-entity kind to its party.
    #[must_use]
    pub const fn of_kind(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::Student => Some(Self::Student),
            EntityKind::Teacher => Some(Self::Teacher),
            EntityKind::Staff => Some(Self::Staff),
            _ => None,
        }
    }
}
