//! Entity re-exports.

pub use super::attendance::Entity as Attendance;
pub use super::classes::Entity as Classes;
pub use super::events::Entity as Events;
pub use super::fees::Entity as Fees;
pub use super::holidays::Entity as Holidays;
pub use super::notices::Entity as Notices;
pub use super::salaries::Entity as Salaries;
pub use super::schools::Entity as Schools;
pub use super::staff::Entity as Staff;
pub use super::students::Entity as Students;
pub use super::subjects::Entity as Subjects;
pub use super::teachers::Entity as Teachers;
pub use super::timetables::Entity as Timetables;
pub use super::users::Entity as Users;
