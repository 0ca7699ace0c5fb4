//! Question bank
//!
//! The built-in questionnaire is compiled in from `seed/questions.json` and
//! installed the first time the service starts against an empty table.

use roadmap_common::{time, Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::engine::{Category, QuestionOption};

const SEED_QUESTIONS: &str = include_str!("../../seed/questions.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: String,
    pub category: Category,
    pub question_text: String,
    pub question_type: String,
    pub options: Vec<QuestionOption>,
    pub weight: i64,
    pub sort_order: i64,
}

impl Question {
    pub fn option(&self, value: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Category with its display name and active question count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub category: Category,
    pub name: &'static str,
    pub question_count: i64,
}

pub fn display_name(category: Category) -> &'static str {
    match category {
        Category::SkillAssessment => "Skill assessment",
        Category::InterestPreference => "Interests",
        Category::CareerGoal => "Career goals",
        Category::LearningStyle => "Learning style",
        Category::TimePlanning => "Time planning",
    }
}

/// Parse the compiled-in questionnaire
pub fn seed_questions() -> Result<Vec<Question>> {
    Ok(serde_json::from_str(SEED_QUESTIONS)?)
}

/// Install the built-in questionnaire when no questions exist yet.
///
/// Returns the number of questions inserted.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<usize> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let questions = seed_questions()?;
    let mut tx = pool.begin().await?;
    for question in &questions {
        insert_question(&mut tx, question).await?;
    }
    tx.commit().await?;

    info!("Seeded {} questionnaire questions", questions.len());
    Ok(questions.len())
}

async fn insert_question(
    conn: &mut sqlx::SqliteConnection,
    question: &Question,
) -> Result<()> {
    let options = serde_json::to_string(&question.options)?;
    let now = time::now_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO questions (
            question_id, category, question_text, question_type, options,
            weight, sort_order, is_active, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&question.question_id)
    .bind(question.category.as_str())
    .bind(&question.question_text)
    .bind(&question.question_type)
    .bind(&options)
    .bind(question.weight)
    .bind(question.sort_order)
    .bind(&now)
    .bind(&now)
    .execute(conn)
    .await?;

    Ok(())
}

fn question_from_row(row: &SqliteRow) -> Result<Question> {
    let question_id: String = row.get("question_id");

    let category: String = row.get("category");
    let category = category.parse::<Category>().map_err(|e| {
        Error::Internal(format!("Question {} has bad category: {}", question_id, e))
    })?;

    let options: String = row.get("options");
    let options: Vec<QuestionOption> = serde_json::from_str(&options)?;

    Ok(Question {
        question_id,
        category,
        question_text: row.get("question_text"),
        question_type: row.get("question_type"),
        options,
        weight: row.get("weight"),
        sort_order: row.get("sort_order"),
    })
}

/// Active questions ordered by category then sort order
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Question>> {
    let rows = sqlx::query(
        r#"
        SELECT question_id, category, question_text, question_type, options, weight, sort_order
        FROM questions
        WHERE is_active = 1
        ORDER BY category, sort_order
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(question_from_row).collect()
}

pub async fn list_by_category(pool: &SqlitePool, category: Category) -> Result<Vec<Question>> {
    let rows = sqlx::query(
        r#"
        SELECT question_id, category, question_text, question_type, options, weight, sort_order
        FROM questions
        WHERE is_active = 1 AND category = ?
        ORDER BY sort_order
        "#,
    )
    .bind(category.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(question_from_row).collect()
}

pub async fn get(pool: &SqlitePool, question_id: &str) -> Result<Option<Question>> {
    let row = sqlx::query(
        r#"
        SELECT question_id, category, question_text, question_type, options, weight, sort_order
        FROM questions
        WHERE question_id = ? AND is_active = 1
        "#,
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(question_from_row).transpose()
}

pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE is_active = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Categories that have at least one active question, in canonical order
pub async fn categories(pool: &SqlitePool) -> Result<Vec<CategoryInfo>> {
    let rows = sqlx::query(
        "SELECT category, COUNT(*) AS question_count FROM questions WHERE is_active = 1 GROUP BY category",
    )
    .fetch_all(pool)
    .await?;

    let mut result = Vec::new();
    for category in Category::ALL {
        let count = rows
            .iter()
            .find(|row| row.get::<String, _>("category") == category.as_str())
            .map(|row| row.get::<i64, _>("question_count"));
        if let Some(question_count) = count {
            result.push(CategoryInfo {
                category,
                name: display_name(category),
                question_count,
            });
        }
    }
    Ok(result)
}
