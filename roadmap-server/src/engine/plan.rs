//! Learning plan construction
//!
//! Scales a path template's durations by the user's weekly study time and
//! trims beginner skills for intermediate users.

use serde::{Deserialize, Serialize};

use super::catalog::{Difficulty, PathId, PathTemplate, Stage};
use super::profile::{ExperienceLevel, UserProfile};

/// Duration multiplier for a weekly time budget; more hours, shorter plan
pub fn time_multiplier(hours_per_week: f64) -> f64 {
    if hours_per_week >= 20.0 {
        0.8
    } else if hours_per_week >= 15.0 {
        1.0
    } else if hours_per_week >= 10.0 {
        1.3
    } else {
        1.6
    }
}

/// Round `weeks * multiplier` to the nearest whole week
pub fn scale_weeks(weeks: u32, multiplier: f64) -> u32 {
    (weeks as f64 * multiplier).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    pub path_name: PathId,
    pub total_duration_weeks: u32,
    pub difficulty_level: Difficulty,
    pub stages: Vec<Stage>,
}

/// Build the duration-adjusted plan for `template`.
///
/// The total and each stage are rounded independently, so the stage sum may
/// differ from the total by a week or two.
pub fn build_plan(path: PathId, template: &PathTemplate, profile: &UserProfile) -> LearningPlan {
    let multiplier = time_multiplier(profile.time_availability.hours_per_week);

    let stages = template
        .stages
        .iter()
        .map(|stage| {
            let skills = match profile.experience_level {
                ExperienceLevel::Intermediate => stage
                    .skills
                    .iter()
                    .filter(|skill| skill.level > 1)
                    .cloned()
                    .collect(),
                ExperienceLevel::Beginner | ExperienceLevel::Advanced => stage.skills.clone(),
            };

            Stage {
                name: stage.name.clone(),
                duration_weeks: scale_weeks(stage.duration_weeks, multiplier),
                skills,
            }
        })
        .collect();

    LearningPlan {
        path_name: path,
        total_duration_weeks: scale_weeks(template.duration_weeks, multiplier),
        difficulty_level: template.difficulty,
        stages,
    }
}
