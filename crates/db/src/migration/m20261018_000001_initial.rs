//! Initial database migration.
//!
//! Creates the enums and every table of the school registry: schools and
//! accounts, classes and people, then the records hanging off them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANTS AND ACCOUNTS
        // ============================================================
        db.execute_unprepared(SCHOOLS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: CLASSES AND PEOPLE
        // ============================================================
        db.execute_unprepared(CLASSES_SQL).await?;
        db.execute_unprepared(PEOPLE_SQL).await?;
        db.execute_unprepared(SUBJECTS_SQL).await?;

        // ============================================================
        // PART 4: RECORDS
        // ============================================================
        db.execute_unprepared(ATTENDANCE_SQL).await?;
        db.execute_unprepared(FEES_SQL).await?;
        db.execute_unprepared(SALARIES_SQL).await?;
        db.execute_unprepared(BULLETINS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('Admin', 'School', 'Teacher', 'Student', 'Staff');
CREATE TYPE attendance_status AS ENUM ('Present', 'Absent');
CREATE TYPE fee_status AS ENUM ('Pending', 'Paid', 'Overdue');
CREATE TYPE salary_status AS ENUM ('Not Credited', 'Credited');
";

const SCHOOLS_SQL: &str = r"
CREATE TABLE schools (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    address TEXT NOT NULL,
    contact VARCHAR(50) NOT NULL,
    email VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_schools_name ON schools(name);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    username VARCHAR(100) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    role user_role NOT NULL,
    school_id INTEGER REFERENCES schools(id) ON DELETE CASCADE,
    permissions JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Admins are platform-wide, everyone else belongs to a school
    CONSTRAINT chk_users_school CHECK ((role = 'Admin') = (school_id IS NULL))
);

CREATE INDEX idx_users_school ON users(school_id);
";

const CLASSES_SQL: &str = r"
CREATE TABLE classes (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    section VARCHAR(50) NOT NULL,
    room VARCHAR(50),
    school_id INTEGER NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_classes_school ON classes(school_id);
";

const PEOPLE_SQL: &str = r"
CREATE TABLE students (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    roll_no VARCHAR(50) NOT NULL,
    email VARCHAR(255) NOT NULL,
    gender VARCHAR(20),
    class_id INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_students_class_roll UNIQUE (class_id, roll_no)
);

CREATE INDEX idx_students_user ON students(user_id);

CREATE TABLE teachers (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    phone VARCHAR(50),
    date_of_birth DATE,
    school_id INTEGER NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_teachers_school ON teachers(school_id);
CREATE INDEX idx_teachers_user ON teachers(user_id);

CREATE TABLE staff (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    phone VARCHAR(50),
    school_id INTEGER NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_staff_school ON staff(school_id);
";

const SUBJECTS_SQL: &str = r"
CREATE TABLE subjects (
    id SERIAL PRIMARY KEY,
    class_id INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    -- NO ACTION: deleting a referenced teacher fails, a school cascade does not
    teacher_id INTEGER NOT NULL REFERENCES teachers(id),
    periods_per_week INTEGER NOT NULL CHECK (periods_per_week > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_subjects_class ON subjects(class_id);
CREATE INDEX idx_subjects_teacher ON subjects(teacher_id);
";

const ATTENDANCE_SQL: &str = r"
CREATE TABLE attendance (
    id SERIAL PRIMARY KEY,
    student_id INTEGER REFERENCES students(id) ON DELETE CASCADE,
    teacher_id INTEGER REFERENCES teachers(id) ON DELETE CASCADE,
    date DATE NOT NULL,
    status attendance_status NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_attendance_one_person CHECK ((student_id IS NULL) <> (teacher_id IS NULL))
);

CREATE UNIQUE INDEX uq_attendance_student_date ON attendance(student_id, date) WHERE student_id IS NOT NULL;
CREATE UNIQUE INDEX uq_attendance_teacher_date ON attendance(teacher_id, date) WHERE teacher_id IS NOT NULL;
";

const FEES_SQL: &str = r"
CREATE TABLE fees (
    id SERIAL PRIMARY KEY,
    student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    submitted NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (submitted >= 0),
    fine NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (fine >= 0),
    balance NUMERIC(12, 2) NOT NULL,
    due_date DATE NOT NULL,
    status fee_status NOT NULL DEFAULT 'Pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fees_submitted CHECK (submitted <= amount)
);

CREATE INDEX idx_fees_student ON fees(student_id, due_date DESC);
";

const SALARIES_SQL: &str = r"
CREATE TABLE salaries (
    id SERIAL PRIMARY KEY,
    teacher_id INTEGER REFERENCES teachers(id) ON DELETE CASCADE,
    staff_id INTEGER REFERENCES staff(id) ON DELETE CASCADE,
    amount NUMERIC(12, 2) NOT NULL CHECK (amount >= 0),
    tax NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (tax >= 0),
    pf NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (pf >= 0),
    bonus NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (bonus >= 0),
    net_salary NUMERIC(12, 2) NOT NULL,
    month DATE NOT NULL,
    status salary_status NOT NULL DEFAULT 'Not Credited',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_salaries_one_payee CHECK ((teacher_id IS NULL) <> (staff_id IS NULL))
);

CREATE INDEX idx_salaries_teacher ON salaries(teacher_id, month DESC);
CREATE INDEX idx_salaries_staff ON salaries(staff_id, month DESC);
";

const BULLETINS_SQL: &str = r"
CREATE TABLE notices (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    date DATE NOT NULL,
    school_id INTEGER NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notices_school ON notices(school_id, created_at DESC);

CREATE TABLE events (
    id SERIAL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    date DATE NOT NULL,
    school_id INTEGER NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_events_school ON events(school_id, date DESC);

CREATE TABLE holidays (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    description TEXT NOT NULL,
    school_id INTEGER NOT NULL REFERENCES schools(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_holidays_range CHECK (end_date >= start_date)
);

CREATE INDEX idx_holidays_school ON holidays(school_id, start_date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS timetables, holidays, events, notices, salaries, fees, attendance, subjects, staff, teachers, students, classes, users, schools CASCADE;
DROP TYPE IF EXISTS salary_status, fee_status, attendance_status, user_role;
";
