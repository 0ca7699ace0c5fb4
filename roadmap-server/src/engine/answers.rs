//! Questionnaire answer payloads
//!
//! Every question belongs to one `Category`, and the option a user picks
//! carries the mapping for that category. `AnswerPayload` keeps exactly one
//! strongly-typed mapping per answer so aggregation can match exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::catalog::PathId;

/// Fixed questionnaire groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SkillAssessment,
    InterestPreference,
    CareerGoal,
    LearningStyle,
    TimePlanning,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::SkillAssessment,
        Category::InterestPreference,
        Category::CareerGoal,
        Category::LearningStyle,
        Category::TimePlanning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::SkillAssessment => "skill_assessment",
            Category::InterestPreference => "interest_preference",
            Category::CareerGoal => "career_goal",
            Category::LearningStyle => "learning_style",
            Category::TimePlanning => "time_planning",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown question category: {}", s))
    }
}

/// Key of a skill mapping: one path, or the `all_paths` sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SkillTarget {
    AllPaths,
    Path(PathId),
}

impl TryFrom<String> for SkillTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "all_paths" {
            Ok(SkillTarget::AllPaths)
        } else {
            value.parse().map(SkillTarget::Path)
        }
    }
}

impl From<SkillTarget> for String {
    fn from(target: SkillTarget) -> Self {
        match target {
            SkillTarget::AllPaths => "all_paths".to_string(),
            SkillTarget::Path(path) => path.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillLevels {
    #[serde(default)]
    pub level: f64,
    #[serde(default)]
    pub foundation: f64,
}

pub type SkillMapping = BTreeMap<SkillTarget, SkillLevels>;

/// Interest weight per path
pub type PathWeights = BTreeMap<PathId, f64>;

/// Free-form goal tags (`timeline`, `focus`, `priority`, ...)
pub type TagMap = BTreeMap<String, Value>;

/// Learning style name to preference strength
pub type StyleMapping = BTreeMap<String, f64>;

/// Time-planning tags; unrecognised keys are kept verbatim in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_week: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TimeMapping {
    pub fn is_empty(&self) -> bool {
        self.hours_per_week.is_none()
            && self.schedule.is_none()
            && self.intensity.is_none()
            && self.extra.is_empty()
    }
}

/// Category-specific data attached to one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "mapping", rename_all = "snake_case")]
pub enum AnswerPayload {
    SkillAssessment(SkillMapping),
    InterestPreference(PathWeights),
    CareerGoal(TagMap),
    LearningStyle(StyleMapping),
    TimePlanning(TimeMapping),
}

impl AnswerPayload {
    pub fn category(&self) -> Category {
        match self {
            AnswerPayload::SkillAssessment(_) => Category::SkillAssessment,
            AnswerPayload::InterestPreference(_) => Category::InterestPreference,
            AnswerPayload::CareerGoal(_) => Category::CareerGoal,
            AnswerPayload::LearningStyle(_) => Category::LearningStyle,
            AnswerPayload::TimePlanning(_) => Category::TimePlanning,
        }
    }
}

/// One stored answer as the engine consumes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub answer_value: String,
    pub answer_text: String,
    pub payload: AnswerPayload,
}

impl AnswerRecord {
    pub fn category(&self) -> Category {
        self.payload.category()
    }
}

/// A selectable option of a question, in its stored JSON shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_mapping: Option<SkillMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_weights: Option<PathWeights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_mapping: Option<TagMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_mapping: Option<StyleMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_mapping: Option<TimeMapping>,
}

impl QuestionOption {
    /// Select the mapping that belongs to `category`; a missing mapping
    /// becomes an empty one.
    pub fn payload_for(&self, category: Category) -> AnswerPayload {
        match category {
            Category::SkillAssessment => {
                AnswerPayload::SkillAssessment(self.skill_mapping.clone().unwrap_or_default())
            }
            Category::InterestPreference => {
                AnswerPayload::InterestPreference(self.path_weights.clone().unwrap_or_default())
            }
            Category::CareerGoal => {
                AnswerPayload::CareerGoal(self.goal_mapping.clone().unwrap_or_default())
            }
            Category::LearningStyle => {
                AnswerPayload::LearningStyle(self.style_mapping.clone().unwrap_or_default())
            }
            Category::TimePlanning => {
                AnswerPayload::TimePlanning(self.time_mapping.clone().unwrap_or_default())
            }
        }
    }
}
