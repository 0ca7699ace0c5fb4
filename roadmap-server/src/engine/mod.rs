//! Recommendation engine
//!
//! Pure, synchronous pipeline over answers already loaded from storage:
//! aggregate -> profile -> score -> plan -> confidence -> supplements.
//! Any failure inside the pipeline is recovered by returning the static
//! default recommendation.

pub mod answers;
pub mod catalog;
pub mod confidence;
pub mod plan;
pub mod profile;
pub mod scorer;
pub mod supplement;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use answers::{AnswerPayload, AnswerRecord, Category, QuestionOption, SkillTarget};
pub use catalog::{Difficulty, PathCatalog, PathId, PathTemplate, PerPath, Priority, Stage, StageSkill};
pub use confidence::confidence_score;
pub use plan::{build_plan, time_multiplier, LearningPlan};
pub use profile::{aggregate, CategorySummaries, ExperienceLevel, UserProfile};
pub use scorer::{best_path, score_paths, PathScores};
pub use supplement::{supplementary_skills, SupplementarySkill};

/// Confidence reported for the fallback recommendation
pub const DEFAULT_CONFIDENCE: f64 = 0.3;

pub const DEFAULT_MESSAGE: &str =
    "Recommendation based on default settings; answer more questions for a personalised path";

/// Errors raised inside the scoring pipeline. Never escapes `generate`.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("non-finite value for '{field}' in answer to {question_id}")]
    NonFinite { question_id: String, field: String },
}

/// Everything the engine needs about one user
#[derive(Debug, Clone, Default)]
pub struct UserRecommendationData {
    pub user_id: String,
    /// Answers in the order they were given
    pub answers: Vec<AnswerRecord>,
    pub response_count: usize,
}

/// A path template tagged with its id and, when scored, its match score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPath {
    pub path_name: PathId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub template: PathTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    pub primary_path: ScoredPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_scores: Option<PathScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_plan: Option<LearningPlan>,
    #[serde(default)]
    pub supplementary_skills: Vec<SupplementarySkill>,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Stateless recommendation generator over a fixed path catalog.
///
/// Safe to share across request handlers; each call works only on the data
/// passed in.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    catalog: PathCatalog,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &PathCatalog {
        &self.catalog
    }

    /// Generate a recommendation, falling back to the default on any
    /// pipeline failure
    pub fn generate(&self, data: &UserRecommendationData) -> Recommendation {
        match self.try_generate(data) {
            Ok(recommendation) => recommendation,
            Err(e) => {
                warn!(user_id = %data.user_id, "Recommendation pipeline failed, using default: {}", e);
                self.default_recommendation(&data.user_id)
            }
        }
    }

    /// Run the pipeline without the fallback
    pub fn try_generate(&self, data: &UserRecommendationData) -> Result<Recommendation, ScoringError> {
        let summaries = aggregate(&data.answers)?;
        let profile = UserProfile::from_summaries(&summaries);

        let scores = score_paths(&profile);
        let (best, best_score) = best_path(&scores);
        let template = self.catalog.get(best);

        let learning_plan = build_plan(best, template, &profile);
        let confidence = confidence_score(data.response_count, scores.iter().map(|(_, s)| *s));

        debug!(
            user_id = %data.user_id,
            path = %best,
            score = best_score,
            confidence,
            experience = ?profile.experience_level,
            "Recommendation generated"
        );

        Ok(Recommendation {
            user_id: data.user_id.clone(),
            generated_at: Utc::now().to_rfc3339(),
            primary_path: ScoredPath {
                path_name: best,
                score: Some(best_score),
                template: template.clone(),
            },
            path_scores: Some(scores),
            learning_plan: Some(learning_plan),
            supplementary_skills: supplementary_skills(best),
            confidence_score: confidence,
            user_profile: Some(profile),
            is_default: false,
            message: None,
        })
    }

    /// Unmodified frontend template with fixed confidence
    pub fn default_recommendation(&self, user_id: &str) -> Recommendation {
        Recommendation {
            user_id: user_id.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            user_profile: None,
            primary_path: ScoredPath {
                path_name: PathId::Frontend,
                score: None,
                template: self.catalog.get(PathId::Frontend).clone(),
            },
            path_scores: None,
            learning_plan: None,
            supplementary_skills: Vec::new(),
            confidence_score: DEFAULT_CONFIDENCE,
            is_default: true,
            message: Some(DEFAULT_MESSAGE.to_string()),
        }
    }
}
