//! Bearer session tokens

use chrono::{Datelike, Duration};
use roadmap_common::api::auth::generate_token;
use roadmap_common::db::get_setting_i64;
use roadmap_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Seven days
pub const DEFAULT_SESSION_TIMEOUT_SECONDS: i64 = 604_800;

/// Stored expiries must stay four-digit years to compare as text
const MAX_EXPIRY_YEAR: i32 = 9999;

/// Issue a new session token for `user_guid`
///
/// Sessions that have already expired are pruned first. A timeout outside
/// chrono's range is rejected rather than wrapping.
pub async fn issue(pool: &SqlitePool, user_guid: &str) -> Result<String> {
    let timeout = get_setting_i64(pool, "session_timeout_seconds", DEFAULT_SESSION_TIMEOUT_SECONDS).await?;

    let now = time::now();
    let expires_at = Duration::try_seconds(timeout)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .filter(|expiry| expiry.year() <= MAX_EXPIRY_YEAR)
        .ok_or_else(|| Error::Config(format!("session_timeout_seconds out of range: {}", timeout)))?;

    let pruned = prune_expired(pool).await?;
    if pruned > 0 {
        debug!("Pruned {} expired sessions", pruned);
    }

    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_guid)
        .bind(time::format_rfc3339(&now))
        .bind(time::format_rfc3339(&expires_at))
        .execute(pool)
        .await?;

    Ok(token)
}

/// Delete every session whose expiry has passed, returning how many went
pub async fn prune_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(time::now_rfc3339())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Resolve a token to its user guid
///
/// Expired or malformed sessions are deleted and yield `None`.
pub async fn resolve(pool: &SqlitePool, token: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT user_guid, expires_at FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: String = row.get("expires_at");
    match time::parse_rfc3339(&expires_at) {
        Some(expiry) if expiry > time::now() => Ok(Some(row.get("user_guid"))),
        _ => {
            debug!("Dropping expired session");
            revoke(pool, token).await?;
            Ok(None)
        }
    }
}

pub async fn revoke(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}
