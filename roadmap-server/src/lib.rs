//! roadmap-server library
//!
//! Questionnaire collection and learning-path recommendation over HTTP.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod engine;
pub mod error;

pub use engine::RecommendationEngine;
pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    /// Create new application state with the built-in path catalog
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            engine: Arc::new(RecommendationEngine::new()),
        }
    }
}

/// Build application router
///
/// Protected routes require `Authorization: Bearer <token>`; the rest are
/// public, with the question listing personalised when a token is present.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/api/auth/profile", get(api::users::profile))
        .route("/api/auth/logout", post(api::users::logout))
        .route("/api/questionnaire/status", get(api::questionnaire::status))
        .route("/api/responses/submit", post(api::responses::submit))
        .route("/api/responses/batch", post(api::responses::batch_submit))
        .route("/api/responses/my-answers", get(api::responses::my_answers))
        .route("/api/responses/profile", get(api::responses::answer_profile))
        .route(
            "/api/responses/recommendation-data",
            get(api::responses::recommendation_data),
        )
        .route("/api/responses/reset", delete(api::responses::reset))
        .route("/api/recommendations/generate", post(api::recommendations::generate))
        .route(
            "/api/recommendations/my-recommendation",
            get(api::recommendations::my_recommendation),
        )
        .route(
            "/api/recommendations/regenerate",
            post(api::recommendations::regenerate),
        )
        .route("/api/recommendations/feedback", post(api::recommendations::feedback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/auth/register", post(api::users::register))
        .route("/api/auth/login", post(api::users::login))
        .route("/api/questionnaire/questions", get(api::questionnaire::questions))
        .route("/api/questionnaire/categories", get(api::questionnaire::categories))
        .route(
            "/api/recommendations/learning-paths",
            get(api::recommendations::learning_paths),
        )
        .route(
            "/api/recommendations/path-details/:path_name",
            get(api::recommendations::path_details),
        )
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
