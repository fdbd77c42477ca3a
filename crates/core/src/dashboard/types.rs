//! Dashboard data types.

use serde::{Deserialize, Serialize};

/// Headline counts (`GET /api/dashboard/stats`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of students.
    pub total_students: u64,
    /// Number of teachers.
    pub total_teachers: u64,
    /// Number of subjects.
    pub total_subjects: u64,
    /// Number of notices.
    pub notices: u64,
}

/// New teachers and students in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyHeadcount {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Teachers created that month.
    pub teachers: u64,
    /// Students created that month.
    pub students: u64,
}

/// Builds twelve monthly rows from sparse `(month, count)` pairs.
///
/// Months absent from both inputs report zero. Months outside 1 to 12 are
/// ignored.
#[must_use]
pub fn fill_year(teachers: &[(u32, u64)], students: &[(u32, u64)]) -> Vec<MonthlyHeadcount> {
    let count_for = |rows: &[(u32, u64)], month: u32| -> u64 {
        rows.iter()
            .filter(|(m, _)| *m == month)
            .map(|(_, count)| *count)
            .sum()
    };

    (1..=12)
        .map(|month| MonthlyHeadcount {
            month,
            teachers: count_for(teachers, month),
            students: count_for(students, month),
        })
        .collect()
}

/// Student gender breakdown (`GET /api/dashboard/gender-data`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderBreakdown {
    /// Students recorded as male.
    pub boys: u64,
    /// Students recorded as female.
    pub girls: u64,
}

impl GenderBreakdown {
    /// Tallies `(gender, count)` rows. Matching is case-insensitive and
    /// anything other than male or female is left out.
    #[must_use]
    pub fn tally<'a>(rows: impl IntoIterator<Item = (Option<&'a str>, u64)>) -> Self {
        rows.into_iter()
            .fold(Self::default(), |mut acc, (gender, count)| {
                match gender.map(str::to_ascii_lowercase).as_deref() {
                    Some("male") => acc.boys += count,
                    Some("female") => acc.girls += count,
                    _ => {}
                }
                acc
            })
    }
}
