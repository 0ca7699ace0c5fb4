//! Answer submission and retrieval endpoints

use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use roadmap_common::Error as CommonError;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AuthUser;
use crate::db::responses::{self, Progress, StoredResponse};
use crate::db::{questions, users};
use crate::engine::{aggregate, Category, CategorySummaries};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub answer_value: String,
    pub answer_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub question_id: String,
    pub answer_value: String,
    pub answer_text: String,
    pub progress: Progress,
}

#[derive(Debug, Deserialize)]
pub struct BatchSubmitRequest {
    #[serde(default)]
    pub answers: Vec<SubmitAnswerRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchSubmitResponse {
    pub success_count: usize,
    pub failed_count: usize,
    pub total_count: usize,
    pub errors: Vec<String>,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct MyAnswersResponse {
    pub responses: Vec<StoredResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AnswerProfileResponse {
    pub user_id: String,
    pub profile_data: BTreeMap<Category, Vec<StoredResponse>>,
    pub total_responses: usize,
    pub completed_categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationDataResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub summaries: CategorySummaries,
    pub response_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// Validate and store one answer
async fn store_answer(
    state: &AppState,
    user_guid: &str,
    req: &SubmitAnswerRequest,
) -> ApiResult<StoredResponse> {
    if req.question_id.trim().is_empty() || req.answer_value.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "question_id and answer_value are required".to_string(),
        ));
    }

    let question = questions::get(&state.db, &req.question_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Question {} not found", req.question_id)))?;

    let stored = responses::save_answer(
        &state.db,
        user_guid,
        &question,
        &req.answer_value,
        req.answer_text.as_deref(),
    )
    .await?;

    Ok(stored)
}

/// Recompute progress and flag the questionnaire complete when it is
async fn refresh_completion(state: &AppState, user_guid: &str) -> ApiResult<Progress> {
    let progress = responses::progress(&state.db, user_guid).await?;
    if progress.is_completed {
        users::mark_questionnaire_completed(&state.db, user_guid).await?;
    }
    Ok(progress)
}

/// POST /api/responses/submit
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SubmitAnswerRequest>,
) -> ApiResult<Json<SubmitAnswerResponse>> {
    let stored = store_answer(&state, &auth.guid, &req).await?;
    let progress = refresh_completion(&state, &auth.guid).await?;

    Ok(Json(SubmitAnswerResponse {
        question_id: stored.question_id,
        answer_value: stored.answer_value,
        answer_text: stored.answer_text,
        progress,
    }))
}

/// POST /api/responses/batch
///
/// Items are stored independently; invalid items are counted and reported
/// without aborting the rest.
pub async fn batch_submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<BatchSubmitRequest>,
) -> ApiResult<Json<BatchSubmitResponse>> {
    if req.answers.is_empty() {
        return Err(ApiError::BadRequest("Answer list must not be empty".to_string()));
    }

    let mut success_count = 0;
    let mut errors = Vec::new();

    for answer in &req.answers {
        match store_answer(&state, &auth.guid, answer).await {
            Ok(_) => success_count += 1,
            Err(ApiError::BadRequest(msg))
            | Err(ApiError::NotFound(msg))
            | Err(ApiError::Common(CommonError::InvalidInput(msg))) => {
                errors.push(format!("{}: {}", answer.question_id, msg));
            }
            Err(e) => return Err(e),
        }
    }

    let progress = refresh_completion(&state, &auth.guid).await?;
    info!(
        "Batch submit for {}: {} stored, {} failed",
        auth.guid,
        success_count,
        errors.len()
    );

    Ok(Json(BatchSubmitResponse {
        success_count,
        failed_count: errors.len(),
        total_count: req.answers.len(),
        errors,
        progress,
    }))
}

/// GET /api/responses/my-answers
pub async fn my_answers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MyAnswersResponse>> {
    let responses = responses::list_for_user(&state.db, &auth.guid).await?;
    Ok(Json(MyAnswersResponse {
        count: responses.len(),
        responses,
    }))
}

/// GET /api/responses/profile
pub async fn answer_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<AnswerProfileResponse>> {
    let all = responses::list_for_user(&state.db, &auth.guid).await?;
    let total_responses = all.len();

    let mut profile_data: BTreeMap<Category, Vec<StoredResponse>> =
        Category::ALL.into_iter().map(|c| (c, Vec::new())).collect();
    for response in all {
        profile_data
            .entry(response.question_category)
            .or_default()
            .push(response);
    }

    let completed_categories = Category::ALL
        .into_iter()
        .filter(|c| profile_data.get(c).is_some_and(|list| !list.is_empty()))
        .collect();

    Ok(Json(AnswerProfileResponse {
        user_id: auth.guid,
        profile_data,
        total_responses,
        completed_categories,
    }))
}

/// GET /api/responses/recommendation-data
pub async fn recommendation_data(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<RecommendationDataResponse>> {
    let records = responses::load_answer_records(&state.db, &auth.guid).await?;
    let summaries = aggregate(&records).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RecommendationDataResponse {
        user_id: auth.guid,
        summaries,
        response_count: records.len(),
    }))
}

/// DELETE /api/responses/reset
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ResetResponse>> {
    let deleted_count = responses::delete_all(&state.db, &auth.guid).await?;
    if deleted_count == 0 {
        return Err(ApiError::NotFound("No answers to reset".to_string()));
    }

    users::reset_questionnaire_completed(&state.db, &auth.guid).await?;
    info!("Reset {} answers for {}", deleted_count, auth.guid);

    Ok(Json(ResetResponse {
        message: "Answers reset".to_string(),
        deleted_count,
    }))
}
