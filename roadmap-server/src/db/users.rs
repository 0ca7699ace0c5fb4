//! User account persistence

use roadmap_common::api::auth::{hash_password, is_valid_email, validate_registration, verify_password};
use roadmap_common::db::{UserAccount, UserCredentials};
use roadmap_common::{time, uuid_utils, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const ACCOUNT_COLUMNS: &str = "guid, username, email, is_active, questionnaire_completed, \
                               questionnaire_completed_at, created_at, updated_at";

fn account_from_row(row: &SqliteRow) -> UserAccount {
    UserAccount {
        guid: row.get("guid"),
        username: row.get("username"),
        email: row.get("email"),
        is_active: row.get("is_active"),
        questionnaire_completed: row.get("questionnaire_completed"),
        questionnaire_completed_at: row.get("questionnaire_completed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Register a new user
///
/// Fails with `InvalidInput` on bad fields and `Conflict` when the username
/// or email is already taken.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserAccount> {
    let username = username.trim();
    let email = email.trim().to_lowercase();

    validate_registration(username, &email, password).map_err(Error::InvalidInput)?;

    let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    if taken > 0 {
        return Err(Error::Conflict("Username already exists".to_string()));
    }

    let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(&email)
        .fetch_one(pool)
        .await?;
    if taken > 0 {
        return Err(Error::Conflict("Email already registered".to_string()));
    }

    let guid = uuid_utils::generate().to_string();
    let password_hash = hash_password(password)?;
    let now = time::now_rfc3339();

    // A concurrent registration can still win the race after the checks above
    sqlx::query(
        r#"
        INSERT INTO users (
            guid, username, email, password_hash,
            is_active, questionnaire_completed, created_at, updated_at
        ) VALUES (?, ?, ?, ?, 1, 0, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(username)
    .bind(&email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::Conflict("Username or email already registered".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    info!("Registered user {} ({})", username, guid);

    Ok(UserAccount {
        guid,
        username: username.to_string(),
        email,
        is_active: true,
        questionnaire_completed: false,
        questionnaire_completed_at: None,
        created_at: now.clone(),
        updated_at: now,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

pub async fn find_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<UserAccount>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE guid = ?", ACCOUNT_COLUMNS))
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(account_from_row))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<UserAccount>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", ACCOUNT_COLUMNS))
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(account_from_row))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserAccount>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", ACCOUNT_COLUMNS))
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(account_from_row))
}

/// Load credentials by guid
async fn credentials_for(pool: &SqlitePool, guid: &str) -> Result<Option<UserCredentials>> {
    let row = sqlx::query("SELECT guid, password_hash FROM users WHERE guid = ? AND is_active = 1")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| UserCredentials {
        guid: row.get("guid"),
        password_hash: row.get("password_hash"),
    }))
}

/// Check a login/password pair, returning the account on success
///
/// An e-mail shaped login is looked up by email only, anything else by
/// username only.
pub async fn authenticate(pool: &SqlitePool, login: &str, password: &str) -> Result<Option<UserAccount>> {
    let login = login.trim();
    let account = if is_valid_email(login) {
        find_by_email(pool, login).await?
    } else {
        find_by_username(pool, login).await?
    };

    let Some(account) = account else {
        return Ok(None);
    };
    let Some(credentials) = credentials_for(pool, &account.guid).await? else {
        return Ok(None);
    };

    if !verify_password(password, &credentials.password_hash) {
        return Ok(None);
    }

    Ok(Some(account))
}

pub async fn mark_questionnaire_completed(pool: &SqlitePool, guid: &str) -> Result<()> {
    let now = time::now_rfc3339();
    sqlx::query(
        r#"
        UPDATE users
        SET questionnaire_completed = 1,
            questionnaire_completed_at = COALESCE(questionnaire_completed_at, ?),
            updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&now)
    .bind(&now)
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn reset_questionnaire_completed(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET questionnaire_completed = 0,
            questionnaire_completed_at = NULL,
            updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(time::now_rfc3339())
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}
