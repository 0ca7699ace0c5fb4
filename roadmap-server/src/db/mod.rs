//! Repository functions over the shared SQLite pool
//!
//! Every function takes the pool explicitly; nothing holds a global
//! connection.

pub mod questions;
pub mod recommendations;
pub mod responses;
pub mod sessions;
pub mod users;
