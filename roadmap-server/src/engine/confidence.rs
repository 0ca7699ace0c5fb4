//! Recommendation confidence

/// Number of answers treated as a complete questionnaire
pub const COMPLETE_RESPONSE_COUNT: f64 = 20.0;

/// `0.6 * completeness + 0.4 * top_score`, rounded to two decimals.
///
/// Returns 0.0 when there are no responses or no scores.
pub fn confidence_score(response_count: usize, scores: impl IntoIterator<Item = f64>) -> f64 {
    let max_score = scores.into_iter().reduce(f64::max);
    let Some(max_score) = max_score else {
        return 0.0;
    };
    if response_count == 0 {
        return 0.0;
    }

    let completeness = (response_count as f64 / COMPLETE_RESPONSE_COUNT).min(1.0);
    round2(completeness * 0.6 + max_score * 0.4)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
