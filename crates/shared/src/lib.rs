//! Shared types, errors, and configuration for Campus.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for schools and user accounts
//! - Application-wide error types
//! - Configuration management
//! - JWT issuing and validation
//! - Login and current-user payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;


pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{SchoolId, UserId};
