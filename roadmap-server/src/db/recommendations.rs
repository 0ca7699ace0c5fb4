//! Stored recommendations and feedback
//!
//! Only the latest recommendation per user is kept.

use chrono::{DateTime, Utc};
use roadmap_common::db::get_setting_i64;
use roadmap_common::{time, Result};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::engine::Recommendation;

pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecommendation {
    pub recommendation: Recommendation,
    pub created_at: String,
}

/// Feedback on a recommendation, rating 1-5
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub rating: i64,
    pub feedback_text: String,
    pub is_helpful: bool,
    pub suggestions: Vec<String>,
}

/// Replace the user's stored recommendation
pub async fn save(pool: &SqlitePool, user_guid: &str, recommendation: &Recommendation) -> Result<()> {
    let document = serde_json::to_string(recommendation)?;

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM recommendations WHERE user_guid = ?")
        .bind(user_guid)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO recommendations (user_guid, recommendation, confidence_score, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_guid)
    .bind(&document)
    .bind(recommendation.confidence_score)
    .bind(time::now_rfc3339())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(
        "Stored recommendation for {}: {} (confidence {})",
        user_guid, recommendation.primary_path.path_name, recommendation.confidence_score
    );
    Ok(())
}

pub async fn latest(pool: &SqlitePool, user_guid: &str) -> Result<Option<StoredRecommendation>> {
    let row = sqlx::query("SELECT recommendation, created_at FROM recommendations WHERE user_guid = ?")
        .bind(user_guid)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let document: String = row.get("recommendation");
    Ok(Some(StoredRecommendation {
        recommendation: serde_json::from_str(&document)?,
        created_at: row.get("created_at"),
    }))
}

/// Returns true when a stored recommendation existed
pub async fn delete(pool: &SqlitePool, user_guid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM recommendations WHERE user_guid = ?")
        .bind(user_guid)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// A recommendation expires `expiry_days` after it was generated.
///
/// Unparsable timestamps count as expired.
pub fn is_expired(generated_at: &str, expiry_days: i64, now: DateTime<Utc>) -> bool {
    match time::parse_rfc3339(generated_at) {
        Some(generated) => time::is_older_than_days(generated, expiry_days, now),
        None => true,
    }
}

pub async fn expiry_days(pool: &SqlitePool) -> Result<i64> {
    get_setting_i64(pool, "recommendation_expiry_days", DEFAULT_EXPIRY_DAYS).await
}

pub async fn save_feedback(pool: &SqlitePool, user_guid: &str, feedback: &Feedback) -> Result<i64> {
    let suggestions = serde_json::to_string(&feedback.suggestions)?;

    let result = sqlx::query(
        r#"
        INSERT INTO recommendation_feedback (
            user_guid, rating, feedback_text, is_helpful, suggestions, submitted_at
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_guid)
    .bind(feedback.rating)
    .bind(&feedback.feedback_text)
    .bind(feedback.is_helpful)
    .bind(&suggestions)
    .bind(time::now_rfc3339())
    .execute(pool)
    .await?;

    info!("Recorded feedback from {} (rating {})", user_guid, feedback.rating);
    Ok(result.last_insert_rowid())
}
