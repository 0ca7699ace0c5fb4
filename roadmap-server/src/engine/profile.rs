//! Profile aggregation
//!
//! Folds a user's raw answers into five category summaries, then derives the
//! `UserProfile` the scorer works from.

use serde::{Deserialize, Serialize};

use super::answers::{AnswerPayload, AnswerRecord, SkillTarget, StyleMapping, TagMap, TimeMapping};
use super::catalog::{PathId, PerPath};
use super::ScoringError;

/// Weight of an `all_paths` skill answer relative to a path-specific one
pub const ALL_PATHS_FACTOR: f64 = 0.5;

/// Default study time when no answer states one
pub const DEFAULT_HOURS_PER_WEEK: f64 = 10.0;

/// Accumulated skill evidence for one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSkill {
    pub level: f64,
    pub foundation: f64,
    pub evidence: Vec<String>,
}

impl PathSkill {
    pub fn combined_score(&self) -> f64 {
        combined_score(self.level, self.foundation)
    }
}

/// 0.6 x level + 0.4 x foundation
pub fn combined_score(level: f64, foundation: f64) -> f64 {
    level * 0.6 + foundation * 0.4
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub goals: Vec<TagMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSummary {
    pub styles: Vec<StyleMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSummary {
    pub plans: Vec<TimeMapping>,
}

/// All five category summaries for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummaries {
    pub skill_assessment: PerPath<PathSkill>,
    pub interest_preference: PerPath<f64>,
    pub career_goal: GoalSummary,
    pub learning_style: StyleSummary,
    pub time_planning: TimeSummary,
}

/// Fold raw answers, in answer order, into category summaries.
///
/// Skill level and foundation saturate at 1.0 after summing; repeated answers
/// are not averaged. Interest weights are summed without a cap.
pub fn aggregate(answers: &[AnswerRecord]) -> Result<CategorySummaries, ScoringError> {
    let mut summaries = CategorySummaries::default();

    for answer in answers {
        match &answer.payload {
            AnswerPayload::SkillAssessment(mapping) => {
                for (target, levels) in mapping {
                    ensure_finite(answer, "level", levels.level)?;
                    ensure_finite(answer, "foundation", levels.foundation)?;

                    match target {
                        SkillTarget::AllPaths => {
                            for path in PathId::ALL {
                                let skill = summaries.skill_assessment.get_mut(path);
                                skill.level += levels.level * ALL_PATHS_FACTOR;
                                skill.foundation += levels.foundation * ALL_PATHS_FACTOR;
                                skill.evidence.push(answer.answer_text.clone());
                            }
                        }
                        SkillTarget::Path(path) => {
                            let skill = summaries.skill_assessment.get_mut(*path);
                            skill.level += levels.level;
                            skill.foundation += levels.foundation;
                            skill.evidence.push(answer.answer_text.clone());
                        }
                    }
                }
            }
            AnswerPayload::InterestPreference(weights) => {
                for (path, weight) in weights {
                    ensure_finite(answer, path.as_str(), *weight)?;
                    *summaries.interest_preference.get_mut(*path) += weight;
                }
            }
            AnswerPayload::CareerGoal(tags) => {
                if !tags.is_empty() {
                    summaries.career_goal.goals.push(tags.clone());
                }
            }
            AnswerPayload::LearningStyle(styles) => {
                for (name, value) in styles {
                    ensure_finite(answer, name, *value)?;
                }
                if !styles.is_empty() {
                    summaries.learning_style.styles.push(styles.clone());
                }
            }
            AnswerPayload::TimePlanning(plan) => {
                if let Some(hours) = plan.hours_per_week {
                    ensure_finite(answer, "hours_per_week", hours)?;
                }
                if !plan.is_empty() {
                    summaries.time_planning.plans.push(plan.clone());
                }
            }
        }
    }

    for path in PathId::ALL {
        let skill = summaries.skill_assessment.get_mut(path);
        skill.level = skill.level.clamp(0.0, 1.0);
        skill.foundation = skill.foundation.clamp(0.0, 1.0);
    }

    Ok(summaries)
}

fn ensure_finite(answer: &AnswerRecord, field: &str, value: f64) -> Result<(), ScoringError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoringError::NonFinite {
            question_id: answer.question_id.clone(),
            field: field.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// Bucket an average combined score: <0.3 beginner, <0.7 intermediate
    pub fn from_average(avg: f64) -> Self {
        if avg < 0.3 {
            ExperienceLevel::Beginner
        } else if avg < 0.7 {
            ExperienceLevel::Intermediate
        } else {
            ExperienceLevel::Advanced
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub level: f64,
    pub foundation: f64,
    pub combined_score: f64,
}

/// Summed preference per known learning style dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePreferences {
    pub hands_on: f64,
    pub theoretical: f64,
    pub video: f64,
    pub reading: f64,
    pub interactive: f64,
}

impl StylePreferences {
    pub fn get(&self, style: &str) -> Option<f64> {
        match style {
            "hands_on" => Some(self.hands_on),
            "theoretical" => Some(self.theoretical),
            "video" => Some(self.video),
            "reading" => Some(self.reading),
            "interactive" => Some(self.interactive),
            _ => None,
        }
    }

    fn slot(&mut self, style: &str) -> Option<&mut f64> {
        match style {
            "hands_on" => Some(&mut self.hands_on),
            "theoretical" => Some(&mut self.theoretical),
            "video" => Some(&mut self.video),
            "reading" => Some(&mut self.reading),
            "interactive" => Some(&mut self.interactive),
            _ => None,
        }
    }

    /// Sum every style answer; unknown style names are ignored
    pub fn from_styles(styles: &[StyleMapping]) -> Self {
        let mut prefs = Self::default();
        for mapping in styles {
            for (name, value) in mapping {
                if let Some(slot) = prefs.slot(name) {
                    *slot += value;
                }
            }
        }
        prefs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAvailability {
    pub hours_per_week: f64,
    pub preferred_schedule: String,
    pub intensity: String,
}

impl Default for TimeAvailability {
    fn default() -> Self {
        Self {
            hours_per_week: DEFAULT_HOURS_PER_WEEK,
            preferred_schedule: "flexible".to_string(),
            intensity: "medium".to_string(),
        }
    }
}

impl TimeAvailability {
    /// Last plan to mention a field wins
    pub fn from_plans(plans: &[TimeMapping]) -> Self {
        let mut availability = Self::default();
        for plan in plans {
            if let Some(hours) = plan.hours_per_week {
                availability.hours_per_week = hours;
            }
            if let Some(schedule) = &plan.schedule {
                availability.preferred_schedule = schedule.clone();
            }
            if let Some(intensity) = &plan.intensity {
                availability.intensity = intensity.clone();
            }
        }
        availability
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub skill_levels: PerPath<SkillLevel>,
    pub interests: PerPath<f64>,
    pub goals: Vec<TagMap>,
    pub learning_preferences: StylePreferences,
    pub time_availability: TimeAvailability,
    pub experience_level: ExperienceLevel,
}

impl UserProfile {
    pub fn from_summaries(summaries: &CategorySummaries) -> Self {
        let skill_levels = summaries.skill_assessment.map(|skill| SkillLevel {
            level: skill.level,
            foundation: skill.foundation,
            combined_score: skill.combined_score(),
        });

        let average = skill_levels
            .iter()
            .map(|(_, s)| s.combined_score)
            .sum::<f64>()
            / PathId::ALL.len() as f64;

        Self {
            skill_levels,
            interests: summaries.interest_preference.clone(),
            goals: summaries.career_goal.goals.clone(),
            learning_preferences: StylePreferences::from_styles(&summaries.learning_style.styles),
            time_availability: TimeAvailability::from_plans(&summaries.time_planning.plans),
            experience_level: ExperienceLevel::from_average(average),
        }
    }
}
