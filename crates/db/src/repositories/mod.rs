//! Repository abstractions for data access.
//!
//! Repositories borrow any `ConnectionTrait` implementor, so the same code
//! runs on the pool for reads and inside a transaction for writes.

pub mod attendance;
pub mod bulletin;
pub mod class;
pub mod dashboard;
pub mod error;
pub mod fee;
pub mod ownership;
pub mod salary;
pub mod school;
pub mod staff;
pub mod student;
pub mod subject;
pub mod teacher;
pub mod timetable;
pub mod user;

pub use attendance::{AttendanceRepository, Attendee};
pub use bulletin::{
    BulletinInput, EventRepository, HolidayInput, HolidayRepository, NoticeRepository,
};
pub use class::{ClassInput, ClassRepository};
pub use dashboard::DashboardRepository;
pub use error::RepoError;
pub use fee::{FeeInput, FeeRepository, FeeRow};
pub use ownership::OwnershipRepository;
pub use salary::{Payee, SalaryInput, SalaryRepository, StaffSalaryRow, TeacherSalaryRow};
pub use school::{SchoolInput, SchoolName, SchoolRepository};
pub use staff::{StaffInput, StaffRepository};
pub use student::{StudentInput, StudentRepository, StudentRow};
pub use subject::{SubjectInput, SubjectRepository, SubjectRow};
pub use teacher::{TeacherInput, TeacherRepository};
pub use timetable::{TimetableInput, TimetableRepository, TimetableRow};
pub use user::{NewUser, UserChanges, UserRepository};
