//! `SeaORM` entities, one module per table.

pub mod prelude;
pub mod sea_orm_active_enums;

pub mod attendance;
pub mod classes;
pub mod events;
pub mod fees;
pub mod holidays;
pub mod notices;
pub mod salaries;
pub mod schools;
pub mod staff;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod timetables;
pub mod users;
