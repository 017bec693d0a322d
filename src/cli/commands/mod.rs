//! CLI command implementations
//!
//! Each command group is implemented in its own module.

pub mod auth;
pub mod pr;
pub mod repo;
