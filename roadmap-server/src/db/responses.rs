//! Answer store
//!
//! One row per (user, question); answering again overwrites the previous
//! answer and moves it to the end of the answer order.

use roadmap_common::{time, Error, Result};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::questions::{self, Question};
use crate::engine::{AnswerPayload, AnswerRecord, Category};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResponse {
    pub question_id: String,
    pub question_category: Category,
    pub answer_value: String,
    pub answer_text: String,
    pub payload: AnswerPayload,
    pub weight: i64,
    pub answered_at: String,
}

impl StoredResponse {
    pub fn to_record(&self) -> AnswerRecord {
        AnswerRecord {
            question_id: self.question_id.clone(),
            answer_value: self.answer_value.clone(),
            answer_text: self.answer_text.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// Questionnaire completion for one user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub total_questions: i64,
    pub answered_count: i64,
    /// Rounded to one decimal
    pub progress_percentage: f64,
    pub is_completed: bool,
}

impl Progress {
    pub fn new(total_questions: i64, answered_count: i64) -> Self {
        let percentage = if total_questions > 0 {
            answered_count as f64 / total_questions as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_questions,
            answered_count,
            progress_percentage: (percentage * 10.0).round() / 10.0,
            is_completed: total_questions > 0 && answered_count >= total_questions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryProgress {
    pub total_questions: i64,
    pub answered_questions: i64,
    pub is_completed: bool,
}

fn response_from_row(row: &SqliteRow) -> Result<StoredResponse> {
    let question_id: String = row.get("question_id");

    let payload: String = row.get("payload");
    let payload: AnswerPayload = serde_json::from_str(&payload)?;

    Ok(StoredResponse {
        question_category: payload.category(),
        question_id,
        answer_value: row.get("answer_value"),
        answer_text: row.get("answer_text"),
        payload,
        weight: row.get("weight"),
        answered_at: row.get("answered_at"),
    })
}

/// Store `answer_value` for `question`, replacing any earlier answer.
///
/// The payload is taken from the chosen option according to the question's
/// category. `answer_text` defaults to the option's text.
pub async fn save_answer(
    pool: &SqlitePool,
    user_guid: &str,
    question: &Question,
    answer_value: &str,
    answer_text: Option<&str>,
) -> Result<StoredResponse> {
    let option = question.option(answer_value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Invalid answer option '{}' for question {}",
            answer_value, question.question_id
        ))
    })?;

    let answer_text = answer_text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&option.text)
        .to_string();
    let payload = option.payload_for(question.category);
    let payload_json = serde_json::to_string(&payload)?;
    let answered_at = time::now_rfc3339();

    // Delete-then-insert so a re-answer takes a fresh rowid at the end of the order
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM responses WHERE user_guid = ? AND question_id = ?")
        .bind(user_guid)
        .bind(&question.question_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO responses (
            user_guid, question_id, question_category, answer_value,
            answer_text, payload, weight, answered_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_guid)
    .bind(&question.question_id)
    .bind(question.category.as_str())
    .bind(answer_value)
    .bind(&answer_text)
    .bind(&payload_json)
    .bind(question.weight)
    .bind(&answered_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    debug!("User {} answered {} = {}", user_guid, question.question_id, answer_value);

    Ok(StoredResponse {
        question_id: question.question_id.clone(),
        question_category: question.category,
        answer_value: answer_value.to_string(),
        answer_text,
        payload,
        weight: question.weight,
        answered_at,
    })
}

/// All answers of a user in answer order
pub async fn list_for_user(pool: &SqlitePool, user_guid: &str) -> Result<Vec<StoredResponse>> {
    let rows = sqlx::query(
        r#"
        SELECT question_id, answer_value, answer_text, payload, weight, answered_at
        FROM responses
        WHERE user_guid = ?
        ORDER BY answered_at, rowid
        "#,
    )
    .bind(user_guid)
    .fetch_all(pool)
    .await?;

    rows.iter().map(response_from_row).collect()
}

pub async fn list_by_category(
    pool: &SqlitePool,
    user_guid: &str,
    category: Category,
) -> Result<Vec<StoredResponse>> {
    let rows = sqlx::query(
        r#"
        SELECT question_id, answer_value, answer_text, payload, weight, answered_at
        FROM responses
        WHERE user_guid = ? AND question_category = ?
        ORDER BY answered_at, rowid
        "#,
    )
    .bind(user_guid)
    .bind(category.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(response_from_row).collect()
}

pub async fn count_for_user(pool: &SqlitePool, user_guid: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE user_guid = ?")
        .bind(user_guid)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn progress(pool: &SqlitePool, user_guid: &str) -> Result<Progress> {
    let total = questions::count_active(pool).await?;
    let answered = count_for_user(pool, user_guid).await?;
    Ok(Progress::new(total, answered))
}

/// Remove every answer of a user, returning how many were deleted
pub async fn delete_all(pool: &SqlitePool, user_guid: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM responses WHERE user_guid = ?")
        .bind(user_guid)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Answers in the shape the recommendation engine consumes
pub async fn load_answer_records(pool: &SqlitePool, user_guid: &str) -> Result<Vec<AnswerRecord>> {
    Ok(list_for_user(pool, user_guid)
        .await?
        .iter()
        .map(StoredResponse::to_record)
        .collect())
}
