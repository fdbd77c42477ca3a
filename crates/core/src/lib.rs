//! Core school-management logic for Campus.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Roles, the tenant-scoped access policy, input validation and derived money
//! figures all live here.
//!
//! # Modules
//!
//! - `auth` - Roles, the request principal and password hashing
//! - `access` - Scope resolution and the access policy
//! - `validation` - Request input rules
//! - `status` - Attendance, fee and salary status values
//! - `finance` - Fee balance and net salary
//! - `dashboard` - Dashboard figures

pub mod access;
pub mod auth;
pub mod dashboard;
pub mod finance;
pub mod status;
pub mod validation;

#[cfg(test)]
mod validation_props;
