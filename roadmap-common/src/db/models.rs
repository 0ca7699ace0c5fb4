//! Database models

use serde::{Deserialize, Serialize};

/// User row without credential columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub guid: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub questionnaire_completed: bool,
    pub questionnaire_completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Credential columns, loaded only for login checks
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub guid: String,
    /// Argon2 PHC string
    pub password_hash: String,
}
