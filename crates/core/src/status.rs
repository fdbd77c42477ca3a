//! Status values carried by attendance, fee and salary records.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Daily attendance mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Attended.
    Present,
    /// Did not attend.
    Absent,
}

/// Payment state of a fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeStatus {
    /// Not yet paid (the default).
    #[default]
    Pending,
    /// Fully paid.
    Paid,
    /// Past its due date.
    Overdue,
}

/// Payment state of a salary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalaryStatus {
    /// Not yet paid out (the default).
    #[default]
    #[serde(rename = "Not Credited")]
    NotCredited,
    /// Paid out.
    Credited,
}

macro_rules! status_names {
    ($ty:ty, $field:literal, $allowed:literal, { $($variant:path => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Canonical name used in storage and on the wire.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $name,)+
                }
            }

            /// Parses a canonical name.
            ///
            /// # Errors
            ///
            /// Returns `InvalidChoice` listing the allowed names.
            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                match value {
                    $($name => Ok($variant),)+
                    _ => Err(ValidationError::InvalidChoice {
                        field: $field,
                        allowed: $allowed,
                    }),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_names!(AttendanceStatus, "Status", "Present, Absent", {
    Self::Present => "Present",
    Self::Absent => "Absent",
});

status_names!(FeeStatus, "Status", "Pending, Paid, Overdue", {
    Self::Pending => "Pending",
    Self::Paid => "Paid",
    Self::Overdue => "Overdue",
});

status_names!(SalaryStatus, "Status", "Not Credited, Credited", {
    Self::NotCredited => "Not Credited",
    Self::Credited => "Credited",
});

impl FeeStatus {
    /// Parses an optional status, defaulting to `Pending`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidChoice` for an unknown name.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, ValidationError> {
        value.filter(|v| !v.is_empty()).map_or(Ok(Self::default()), Self::parse)
    }
}

impl SalaryStatus {
    /// Parses an optional status, defaulting to `Not Credited`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidChoice` for an unknown name.
    pub fn parse_or_default(value: Option<&str>) -> Result<Self, ValidationError> {
        value.filter(|v| !v.is_empty()).map_or(Ok(Self::default()), Self::parse)
    }
}
