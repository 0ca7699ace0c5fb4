//! Path scoring
//!
//! Linear blend of four terms per path, capped to [0, 1]:
//!
//! ```text
//! score = 0.3 * skill_combined + 0.4 * interest + 0.2 * goal_match + 0.1 * style_match
//! ```

use super::answers::TagMap;
use super::catalog::{PathId, PerPath};
use super::profile::{StylePreferences, UserProfile};

pub const SKILL_WEIGHT: f64 = 0.3;
pub const INTEREST_WEIGHT: f64 = 0.4;
pub const GOAL_WEIGHT: f64 = 0.2;
pub const STYLE_WEIGHT: f64 = 0.1;

/// Goal term when the user stated no goals
pub const GOAL_MATCH_DEFAULT: f64 = 0.5;
/// Goal term when at least one goal exists, independent of the path
pub const GOAL_MATCH_WITH_GOALS: f64 = 0.6;

pub type PathScores = PerPath<f64>;

/// Score every path in canonical order
pub fn score_paths(profile: &UserProfile) -> PathScores {
    PerPath::from_fn(|path| {
        let score = SKILL_WEIGHT * profile.skill_levels.get(path).combined_score
            + INTEREST_WEIGHT * profile.interests.get(path)
            + GOAL_WEIGHT * goal_match(path, &profile.goals)
            + STYLE_WEIGHT * learning_style_match(path, &profile.learning_preferences);
        score.clamp(0.0, 1.0)
    })
}

/// Placeholder goal heuristic: constant per presence of goals.
// TODO: map goal `focus`/`priority` tags onto paths once product defines the table
pub fn goal_match(_path: PathId, goals: &[TagMap]) -> f64 {
    if goals.is_empty() {
        GOAL_MATCH_DEFAULT
    } else {
        GOAL_MATCH_WITH_GOALS
    }
}

/// Affinity of each path for the learning styles it rewards
pub fn style_affinities(path: PathId) -> &'static [(&'static str, f64)] {
    match path {
        PathId::Frontend => &[("hands_on", 0.8), ("interactive", 0.7), ("video", 0.6)],
        PathId::Backend => &[("theoretical", 0.6), ("hands_on", 0.8), ("reading", 0.7)],
        PathId::Mobile => &[("hands_on", 0.9), ("interactive", 0.6), ("video", 0.5)],
        PathId::DataScience => &[("theoretical", 0.8), ("reading", 0.7), ("hands_on", 0.6)],
    }
}

/// Mean of `preference * affinity` over the path's style table, capped at 1.0.
///
/// Only styles with a positive preference contribute.
pub fn learning_style_match(path: PathId, preferences: &StylePreferences) -> f64 {
    let table = style_affinities(path);
    let total: f64 = table
        .iter()
        .filter_map(|(style, affinity)| {
            preferences
                .get(style)
                .filter(|pref| *pref > 0.0)
                .map(|pref| pref * affinity)
        })
        .sum();
    (total / table.len() as f64).min(1.0)
}

/// First path holding the maximum score, in canonical order
pub fn best_path(scores: &PathScores) -> (PathId, f64) {
    let mut best = (PathId::Frontend, *scores.get(PathId::Frontend));
    for (path, score) in scores.iter().skip(1) {
        if *score > best.1 {
            best = (path, *score);
        }
    }
    best
}
