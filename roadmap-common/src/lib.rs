//! # Roadmap Common Library
//!
//! Shared code for the learning-roadmap service including:
//! - Database initialization (schema and default settings)
//! - Configuration loading and root folder resolution
//! - Password hashing and session token helpers
//! - Utility functions

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
