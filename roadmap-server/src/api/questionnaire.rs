//! Questionnaire endpoints

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::auth::optional_user;
use super::AuthUser;
use crate::db::questions::{self, CategoryInfo, Question};
use crate::db::responses::{self, CategoryProgress, Progress, StoredResponse};
use crate::engine::Category;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    #[serde(flatten)]
    pub question: Question,
    pub user_answer: Option<StoredResponse>,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<QuestionView>,
    pub total_questions: usize,
    pub progress: Progress,
    pub user_id: Option<String>,
    pub category: Option<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
    pub total_categories: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub overall_progress: Progress,
    pub category_progress: BTreeMap<Category, CategoryProgress>,
}

pub(crate) fn parse_category(raw: &str) -> ApiResult<Category> {
    raw.parse::<Category>().map_err(ApiError::BadRequest)
}

/// GET /api/questionnaire/questions
///
/// Public. With a valid bearer token each question carries the caller's
/// answer and the progress is real.
pub async fn questions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<QuestionsQuery>,
) -> ApiResult<Json<QuestionsResponse>> {
    let category = query.category.as_deref().map(parse_category).transpose()?;

    let list = match category {
        Some(c) => questions::list_by_category(&state.db, c).await?,
        None => questions::list_active(&state.db).await?,
    };
    if list.is_empty() {
        return Err(ApiError::NotFound("No questions available".to_string()));
    }

    let user_id = optional_user(&state, &headers).await?;

    let (mut answers, progress) = match &user_id {
        Some(guid) => {
            let answers: HashMap<String, StoredResponse> = responses::list_for_user(&state.db, guid)
                .await?
                .into_iter()
                .map(|r| (r.question_id.clone(), r))
                .collect();
            (answers, responses::progress(&state.db, guid).await?)
        }
        None => (HashMap::new(), Progress::new(list.len() as i64, 0)),
    };

    let total_questions = list.len();
    let questions = list
        .into_iter()
        .map(|question| QuestionView {
            user_answer: answers.remove(&question.question_id),
            question,
        })
        .collect();

    Ok(Json(QuestionsResponse {
        questions,
        total_questions,
        progress,
        user_id,
        category,
    }))
}

/// GET /api/questionnaire/categories
pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = questions::categories(&state.db).await?;
    Ok(Json(CategoriesResponse {
        total_categories: categories.len(),
        categories,
    }))
}

/// GET /api/questionnaire/status
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<StatusResponse>> {
    let overall_progress = responses::progress(&state.db, &auth.guid).await?;

    let mut category_progress = BTreeMap::new();
    for info in questions::categories(&state.db).await? {
        let answered = responses::list_by_category(&state.db, &auth.guid, info.category)
            .await?
            .len() as i64;
        category_progress.insert(
            info.category,
            CategoryProgress {
                total_questions: info.question_count,
                answered_questions: answered,
                is_completed: answered >= info.question_count,
            },
        );
    }

    Ok(Json(StatusResponse {
        overall_progress,
        category_progress,
    }))
}
