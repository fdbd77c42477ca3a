//! Dashboard figures.
//!
//! This module provides types for dashboard data:
//! - Headline counts for a school or the whole platform
//! - Monthly headcount of new teachers and students
//! - Student gender breakdown

pub mod types;

pub use types::*;
