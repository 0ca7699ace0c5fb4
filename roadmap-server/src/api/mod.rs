//! HTTP API handlers for roadmap-server

pub mod auth;
pub mod health;
pub mod questionnaire;
pub mod recommendations;
pub mod responses;
pub mod users;

pub use auth::{auth_middleware, AuthUser};
pub use health::health_routes;
