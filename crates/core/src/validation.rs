//! Input validation for request bodies.
//!
//! Everything here runs before any storage access. Field names are passed in
//! by the caller so messages read the way the client spelled the request.

use campus_shared::config::ValidationConfig;
use campus_shared::{AppError, SchoolId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use validator::ValidateEmail;

use crate::auth::Role;

/// Which pair of mutually exclusive references a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusivePair {
    /// Attendance: a student or a teacher.
    StudentOrTeacher,
    /// Salary: a teacher or a staff member.
    TeacherOrStaff,
}

impl ExclusivePair {
    const fn both_message(self) -> &'static str {
        match self {
            Self::StudentOrTeacher => "Provide either a student or a teacher, not both",
            Self::TeacherOrStaff => "Provide either Teacher ID or Staff ID, not both.",
        }
    }

    const fn neither_message(self) -> &'static str {
        match self {
            Self::StudentOrTeacher => "Either studentId or teacherId must be provided",
            Self::TeacherOrStaff => "Either teacherId or staffId must be provided",
        }
    }
}

/// Rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// A date field is not a real `YYYY-MM-DD` date.
    #[error("Invalid {0} format. Use YYYY-MM-DD")]
    InvalidDate(&'static str),

    /// A monetary field is below zero.
    #[error("{0} cannot be negative.")]
    NegativeAmount(&'static str),

    /// A monetary field is above the configured bound.
    #[error("{field} exceeds maximum allowed value ({max}).")]
    AmountTooLarge {
        /// Field name.
        field: &'static str,
        /// Configured upper bound.
        max: Decimal,
    },

    /// A monetary field has sub-cent precision.
    #[error("{0} must have at most 2 decimal places.")]
    TooManyDecimals(&'static str),

    /// The email address is malformed.
    #[error("Invalid email format")]
    InvalidEmail,

    /// A value is not one of the allowed choices.
    #[error("{field} must be one of: {allowed}.")]
    InvalidChoice {
        /// Field name.
        field: &'static str,
        /// Allowed values, comma separated.
        allowed: &'static str,
    },

    /// The role name is unknown.
    #[error("Invalid role")]
    InvalidRole,

    /// Both of a mutually exclusive pair were supplied.
    #[error("{}", .0.both_message())]
    BothReferences(ExclusivePair),

    /// Neither of a mutually exclusive pair was supplied.
    #[error("{}", .0.neither_message())]
    MissingReference(ExclusivePair),

    /// A fee records more paid than charged.
    #[error("Submitted amount cannot exceed the total amount")]
    SubmittedExceedsAmount,

    /// A holiday ends before it starts.
    #[error("End date cannot be before start date")]
    EndBeforeStart,

    /// A subject has zero or negative periods per week.
    #[error("Periods per week must be a positive integer")]
    NonPositivePeriods,

    /// The account role and school assignment do not fit together.
    #[error("{0}")]
    SchoolAssignment(&'static str),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Bounds applied to monetary input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Inclusive upper bound for any amount.
    pub max_amount: Decimal,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&ValidationConfig::default())
    }
}

impl From<&ValidationConfig> for Limits {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            max_amount: Decimal::from(config.max_amount),
        }
    }
}

impl Limits {
    /// Checks that `value` is within `0..=max_amount` and has whole cents.
    ///
    /// Columns are `NUMERIC(12,2)`; a finer value would be rounded on store
    /// and no longer agree with the derived balance or net pay.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAmount`, `AmountTooLarge` or `TooManyDecimals`.
    pub fn money(&self, field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeAmount(field));
        }
        if value.normalize().scale() > 2 {
            return Err(ValidationError::TooManyDecimals(field));
        }
        if value > self.max_amount {
            return Err(ValidationError::AmountTooLarge {
                field,
                max: self.max_amount,
            });
        }
        Ok(value)
    }

    /// Like [`Limits::money`], treating an absent value as zero.
    ///
    /// # Errors
    ///
    /// See [`Limits::money`].
    pub fn money_or_zero(
        &self,
        field: &'static str,
        value: Option<Decimal>,
    ) -> Result<Decimal, ValidationError> {
        self.money(field, value.unwrap_or(Decimal::ZERO))
    }
}

/// Returns the trimmed value of a required text field.
///
/// # Errors
///
/// Returns `Required` when the value is absent or blank.
pub fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Required(field)),
    }
}

/// Returns a required non-text value.
///
/// # Errors
///
/// Returns `Required` when the value is absent.
pub fn present<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Required(field))
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// `2025-6-1` and `2025-02-30` are both rejected.
///
/// # Errors
///
/// Returns `InvalidDate` for anything that is not a zero-padded calendar date.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(ValidationError::InvalidDate(field));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(field))
}

/// Parses a required date field.
///
/// # Errors
///
/// Returns `Required` or `InvalidDate`.
pub fn required_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    parse_date(field, required(field, value)?)
}

/// Checks an email address has the shape `local@domain.tld`.
///
/// # Errors
///
/// Returns `InvalidEmail`.
pub fn email(value: &str) -> Result<&str, ValidationError> {
    let has_tld = value
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'));
    if value.validate_email() && has_tld {
        Ok(value)
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// One side of a mutually exclusive pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<A, B> {
    /// The first reference was supplied.
    First(A),
    /// The second reference was supplied.
    Second(B),
}

/// Requires exactly one of two references.
///
/// # Errors
///
/// Returns `BothReferences` or `MissingReference`.
pub fn exactly_one<A, B>(
    pair: ExclusivePair,
    first: Option<A>,
    second: Option<B>,
) -> Result<Either<A, B>, ValidationError> {
    match (first, second) {
        (Some(a), None) => Ok(Either::First(a)),
        (None, Some(b)) => Ok(Either::Second(b)),
        (Some(_), Some(_)) => Err(ValidationError::BothReferences(pair)),
        (None, None) => Err(ValidationError::MissingReference(pair)),
    }
}

/// Checks that a date range does not end before it starts.
///
/// # Errors
///
/// Returns `EndBeforeStart`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::EndBeforeStart);
    }
    Ok(())
}

/// Checks a subject's weekly period count.
///
/// # Errors
///
/// Returns `NonPositivePeriods`.
pub fn periods_per_week(value: i32) -> Result<i32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositivePeriods);
    }
    Ok(value)
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Normalizes a timetable day to its capitalized English name.
///
/// # Errors
///
/// Returns `InvalidChoice` for anything but a weekday name, in any case.
pub fn weekday(value: &str) -> Result<&'static str, ValidationError> {
    let value = value.trim();
    WEEKDAYS
        .into_iter()
        .find(|day| day.eq_ignore_ascii_case(value))
        .ok_or(ValidationError::InvalidChoice {
            field: "Day",
            allowed: "Monday, Tuesday, Wednesday, Thursday, Friday, Saturday, Sunday",
        })
}

/// Checks that an account's school fits its role.
///
/// # Errors
///
/// Returns `SchoolAssignment` when an Admin carries a school or any other
/// role lacks one.
pub fn school_assignment(role: Role, school: Option<SchoolId>) -> Result<(), ValidationError> {
    match (role.requires_school(), school) {
        (false, Some(_)) => Err(ValidationError::SchoolAssignment(
            "Admins cannot be associated with a school",
        )),
        (true, None) => Err(ValidationError::SchoolAssignment(
            "School ID is required for School, Teacher, Student and Staff accounts",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(Role::Admin, None, true)]
    #[case(Role::Admin, Some(SchoolId(1)), false)]
    #[case(Role::School, Some(SchoolId(1)), true)]
    #[case(Role::Teacher, None, false)]
    #[case(Role::Staff, Some(SchoolId(2)), true)]
    fn test_school_assignment(
        #[case] role: Role,
        #[case] school: Option<SchoolId>,
        #[case] ok: bool,
    ) {
        assert_eq!(school_assignment(role, school).is_ok(), ok);
    }

    #[rstest]
    #[case("2025-06-10", NaiveDate::from_ymd_opt(2025, 6, 10))]
    #[case("2024-02-29", NaiveDate::from_ymd_opt(2024, 2, 29))]
    fn test_parse_date_accepts_calendar_dates(#[case] input: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_date("date", input).ok(), expected);
    }

    #[rstest]
    #[case("2025-6-10")]
    #[case("2025-02-30")]
    #[case("2023-02-29")]
    #[case("10-06-2025")]
    #[case("2025/06/10")]
    #[case("2025-06-10T00:00:00")]
    #[case("")]
    fn test_parse_date_rejects_everything_else(#[case] input: &str) {
        assert_eq!(
            parse_date("due date", input),
            Err(ValidationError::InvalidDate("due date"))
        );
    }

    #[test]
    fn test_invalid_date_message() {
        assert_eq!(
            ValidationError::InvalidDate("date").to_string(),
            "Invalid date format. Use YYYY-MM-DD"
        );
    }

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("Name", Some("  Oak  ")), Ok("Oak"));
        assert_eq!(required("Name", Some("   ")), Err(ValidationError::Required("Name")));
        assert_eq!(required("Name", None), Err(ValidationError::Required("Name")));
        assert_eq!(
            ValidationError::Required("Username").to_string(),
            "Username is required"
        );
    }

    #[test]
    fn test_money_bounds() {
        let limits = Limits::default();

        assert_eq!(limits.money("Amount", dec!(0)), Ok(dec!(0)));
        assert_eq!(limits.money("Amount", dec!(1000000)), Ok(dec!(1000000)));
        assert_eq!(
            limits.money("Tax", dec!(-0.01)),
            Err(ValidationError::NegativeAmount("Tax"))
        );
        assert_eq!(
            limits.money("Amount", dec!(1000000.01)).unwrap_err().to_string(),
            "Amount exceeds maximum allowed value (1000000)."
        );
        assert_eq!(limits.money_or_zero("Fine", None), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert!(Limits::default().money("Fine", dec!(-0)).is_ok());
    }

    #[rstest]
    #[case("Monday", "Monday")]
    #[case(" friday ", "Friday")]
    #[case("SUNDAY", "Sunday")]
    fn test_weekday_is_normalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(weekday(raw).unwrap(), expected);
    }

    #[test]
    fn test_weekday_rejects_abbreviations() {
        assert!(matches!(
            weekday("Mon"),
            Err(ValidationError::InvalidChoice { field: "Day", .. })
        ));
    }

    #[rstest]
    #[case(dec!(10.00), true)]
    #[case(dec!(10.01), true)]
    #[case(dec!(10.010), true)]
    #[case(dec!(10.004), false)]
    #[case(dec!(0.001), false)]
    fn test_money_whole_cents(#[case] value: Decimal, #[case] accepted: bool) {
        let result = Limits::default().money("Amount", value);
        if accepted {
            assert_eq!(result, Ok(value));
        } else {
            assert_eq!(result, Err(ValidationError::TooManyDecimals("Amount")));
        }
    }

    #[rstest]
    #[case("ana@oak.edu", true)]
    #[case("first.last+tag@school.example.org", true)]
    #[case("ana@localhost", false)]
    #[case("ana.oak.edu", false)]
    #[case("@oak.edu", false)]
    #[case("ana@", false)]
    fn test_email(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(email(input).is_ok(), valid);
    }

    #[test]
    fn test_exactly_one() {
        let pair = ExclusivePair::TeacherOrStaff;

        assert_eq!(exactly_one(pair, Some(1), None::<i32>), Ok(Either::First(1)));
        assert_eq!(exactly_one(pair, None::<i32>, Some(2)), Ok(Either::Second(2)));
        assert_eq!(
            exactly_one(pair, Some(1), Some(2)).unwrap_err().to_string(),
            "Provide either Teacher ID or Staff ID, not both."
        );
        assert_eq!(
            exactly_one(pair, None::<i32>, None::<i32>).unwrap_err().to_string(),
            "Either teacherId or staffId must be provided"
        );
        assert_eq!(
            exactly_one(ExclusivePair::StudentOrTeacher, None::<i32>, None::<i32>)
                .unwrap_err()
                .to_string(),
            "Either studentId or teacherId must be provided"
        );
    }

    #[test]
    fn test_holiday_range() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        assert_eq!(date_range(start, end), Err(ValidationError::EndBeforeStart));
        assert_eq!(date_range(start, start), Ok(()));
        assert_eq!(date_range(end, start), Ok(()));
        assert_eq!(
            ValidationError::EndBeforeStart.to_string(),
            "End date cannot be before start date"
        );
    }

    #[test]
    fn test_periods_per_week() {
        assert_eq!(periods_per_week(5), Ok(5));
        assert_eq!(periods_per_week(0), Err(ValidationError::NonPositivePeriods));
        assert_eq!(periods_per_week(-1), Err(ValidationError::NonPositivePeriods));
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = ValidationError::SubmittedExceedsAmount.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.detail(), "Submitted amount cannot exceed the total amount");
    }
}
