//! Recommendation endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use roadmap_common::db::get_setting_i64;
use roadmap_common::time;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::AuthUser;
use crate::db::recommendations::{self, Feedback};
use crate::db::{responses, users};
use crate::engine::{
    Difficulty, PathId, Recommendation, ScoredPath, UserRecommendationData,
};
use crate::{ApiError, ApiResult, AppState};

pub const DEFAULT_MIN_ANSWERS_FOR_GENERATE: i64 = 5;
pub const DEFAULT_MIN_ANSWERS_FOR_REGENERATE: i64 = 3;

#[derive(Debug, Serialize)]
pub struct MyRecommendationResponse {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub expired: bool,
    pub stored_at: String,
}

#[derive(Debug, Serialize)]
pub struct PathSummary {
    pub path_name: PathId,
    pub name: String,
    pub description: String,
    pub duration_weeks: u32,
    pub difficulty: Difficulty,
    pub core_technologies: Vec<String>,
    pub stages_count: usize,
}

#[derive(Debug, Serialize)]
pub struct LearningPathsResponse {
    pub paths: Vec<PathSummary>,
    pub total_paths: usize,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<Value>,
    #[serde(default, alias = "feedback_text")]
    pub feedback: String,
    #[serde(default = "default_helpful")]
    pub is_helpful: bool,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

fn default_helpful() -> bool {
    true
}

/// Score the caller's stored answers and persist the result
async fn generate_and_store(state: &AppState, user_guid: &str) -> ApiResult<Recommendation> {
    let answers = responses::load_answer_records(&state.db, user_guid).await?;
    let data = UserRecommendationData {
        user_id: user_guid.to_string(),
        response_count: answers.len(),
        answers,
    };

    let recommendation = state.engine.generate(&data);
    recommendations::save(&state.db, user_guid, &recommendation).await?;

    let progress = responses::progress(&state.db, user_guid).await?;
    if progress.is_completed {
        users::mark_questionnaire_completed(&state.db, user_guid).await?;
    }

    Ok(recommendation)
}

async fn require_answers(state: &AppState, user_guid: &str, setting: &str, fallback: i64) -> ApiResult<()> {
    let minimum = get_setting_i64(&state.db, setting, fallback).await?;
    let answered = responses::count_for_user(&state.db, user_guid).await?;
    if answered < minimum {
        return Err(ApiError::BadRequest(format!(
            "At least {} answers are required, {} given",
            minimum, answered
        )));
    }
    Ok(())
}

/// POST /api/recommendations/generate
pub async fn generate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Recommendation>> {
    require_answers(
        &state,
        &auth.guid,
        "min_answers_for_generate",
        DEFAULT_MIN_ANSWERS_FOR_GENERATE,
    )
    .await?;

    let recommendation = generate_and_store(&state, &auth.guid).await?;
    Ok(Json(recommendation))
}

/// GET /api/recommendations/my-recommendation
pub async fn my_recommendation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<MyRecommendationResponse>> {
    let stored = recommendations::latest(&state.db, &auth.guid)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("No recommendation yet, generate one first".to_string())
        })?;

    let expiry_days = recommendations::expiry_days(&state.db).await?;
    let expired = recommendations::is_expired(
        &stored.recommendation.generated_at,
        expiry_days,
        time::now(),
    );

    Ok(Json(MyRecommendationResponse {
        recommendation: stored.recommendation,
        expired,
        stored_at: stored.created_at,
    }))
}

/// GET /api/recommendations/learning-paths
pub async fn learning_paths(State(state): State<AppState>) -> Json<LearningPathsResponse> {
    let paths: Vec<PathSummary> = state
        .engine
        .catalog()
        .iter()
        .map(|(path_name, template)| PathSummary {
            path_name,
            name: template.name.clone(),
            description: template.description.clone(),
            duration_weeks: template.duration_weeks,
            difficulty: template.difficulty,
            core_technologies: template.core_technologies.clone(),
            stages_count: template.stages.len(),
        })
        .collect();

    Json(LearningPathsResponse {
        total_paths: paths.len(),
        paths,
    })
}

/// GET /api/recommendations/path-details/:path_name
pub async fn path_details(
    State(state): State<AppState>,
    Path(path_name): Path<String>,
) -> ApiResult<Json<ScoredPath>> {
    let path = path_name
        .parse::<PathId>()
        .map_err(|_| ApiError::NotFound(format!("Learning path '{}' not found", path_name)))?;

    Ok(Json(ScoredPath {
        path_name: path,
        score: None,
        template: state.engine.catalog().get(path).clone(),
    }))
}

/// POST /api/recommendations/regenerate
pub async fn regenerate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Recommendation>> {
    require_answers(
        &state,
        &auth.guid,
        "min_answers_for_regenerate",
        DEFAULT_MIN_ANSWERS_FOR_REGENERATE,
    )
    .await?;

    if recommendations::delete(&state.db, &auth.guid).await? {
        info!("Discarded previous recommendation for {}", auth.guid);
    }

    let recommendation = generate_and_store(&state, &auth.guid).await?;
    Ok(Json(recommendation))
}

/// POST /api/recommendations/feedback
pub async fn feedback(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<Json<Value>> {
    let rating = req
        .rating
        .as_ref()
        .and_then(Value::as_i64)
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| ApiError::BadRequest("Rating must be an integer from 1 to 5".to_string()))?;

    let feedback = Feedback {
        rating,
        feedback_text: req.feedback,
        is_helpful: req.is_helpful,
        suggestions: req.suggestions,
    };
    let id = recommendations::save_feedback(&state.db, &auth.guid, &feedback).await?;

    Ok(Json(json!({
        "feedback_id": id,
        "rating": rating,
        "feedback_saved": true,
    })))
}
