//! Recommendation engine properties
//!
//! Exercises the full pipeline through `RecommendationEngine::generate` with
//! answers built the same way the answer store builds them.

use roadmap_server::engine::answers::{SkillLevels, SkillMapping, TimeMapping};
use roadmap_server::engine::{
    aggregate, best_path, score_paths, AnswerPayload, AnswerRecord, PathId, RecommendationEngine,
    SkillTarget, UserProfile, UserRecommendationData, DEFAULT_CONFIDENCE,
};
use std::collections::BTreeMap;

fn answer(question_id: &str, payload: AnswerPayload) -> AnswerRecord {
    AnswerRecord {
        question_id: question_id.to_string(),
        answer_value: "value".to_string(),
        answer_text: format!("text for {}", question_id),
        payload,
    }
}

fn skill(target: SkillTarget, level: f64, foundation: f64) -> AnswerPayload {
    let mut mapping = SkillMapping::new();
    mapping.insert(target, SkillLevels { level, foundation });
    AnswerPayload::SkillAssessment(mapping)
}

fn interest(weights: &[(PathId, f64)]) -> AnswerPayload {
    AnswerPayload::InterestPreference(weights.iter().copied().collect())
}

fn hours(hours_per_week: f64) -> AnswerPayload {
    AnswerPayload::TimePlanning(TimeMapping {
        hours_per_week: Some(hours_per_week),
        ..TimeMapping::default()
    })
}

fn data(answers: Vec<AnswerRecord>) -> UserRecommendationData {
    UserRecommendationData {
        user_id: "user-1".to_string(),
        response_count: answers.len(),
        answers,
    }
}

fn backend_leaning_answers() -> Vec<AnswerRecord> {
    vec![
        answer("skill_001", skill(SkillTarget::AllPaths, 0.5, 0.6)),
        answer("skill_003", skill(SkillTarget::Path(PathId::Backend), 0.6, 0.7)),
        answer(
            "interest_001",
            interest(&[
                (PathId::Frontend, 0.2),
                (PathId::Backend, 0.9),
                (PathId::Mobile, 0.2),
                (PathId::DataScience, 0.3),
            ]),
        ),
        answer(
            "style_001",
            AnswerPayload::LearningStyle(BTreeMap::from([
                ("hands_on".to_string(), 0.4),
                ("theoretical".to_string(), 0.8),
                ("reading".to_string(), 0.8),
            ])),
        ),
        answer("time_001", hours(25.0)),
    ]
}

#[test]
fn test_scores_within_unit_interval() {
    let engine = RecommendationEngine::new();
    let mut answers = backend_leaning_answers();
    // Push interest far beyond 1.0
    for i in 0..5 {
        answers.push(answer(
            &format!("extra_{}", i),
            interest(&[(PathId::Mobile, 3.0), (PathId::Frontend, -2.0)]),
        ));
    }

    let rec = engine.generate(&data(answers));
    let scores = rec.path_scores.expect("scored recommendation");
    for (_, score) in scores.iter() {
        assert!((0.0..=1.0).contains(score), "score {} out of range", score);
    }
}

#[test]
fn test_primary_path_is_argmax() {
    let engine = RecommendationEngine::new();
    let rec = engine.generate(&data(backend_leaning_answers()));

    let scores = rec.path_scores.as_ref().unwrap();
    let max = scores.iter().map(|(_, s)| *s).fold(f64::MIN, f64::max);
    assert_eq!(rec.primary_path.path_name, PathId::Backend);
    assert_eq!(rec.primary_path.score, Some(max));
    assert_eq!(*scores.get(PathId::Backend), max);
    assert!(!rec.is_default);
}

#[test]
fn test_generation_is_deterministic() {
    let engine = RecommendationEngine::new();
    let input = data(backend_leaning_answers());

    let first = engine.generate(&input);
    let second = engine.generate(&input);
    assert_eq!(first.path_scores, second.path_scores);
    assert_eq!(first.primary_path, second.primary_path);
    assert_eq!(first.learning_plan, second.learning_plan);
    assert_eq!(first.confidence_score, second.confidence_score);
}

#[test]
fn test_all_paths_answer_adds_half_to_every_path() {
    let summaries = aggregate(&[answer("skill_001", skill(SkillTarget::AllPaths, 0.8, 0.9))]).unwrap();

    for (_, skill) in summaries.skill_assessment.iter() {
        assert!((skill.level - 0.4).abs() < 1e-9);
        assert!((skill.foundation - 0.45).abs() < 1e-9);
        assert_eq!(skill.evidence, vec!["text for skill_001".to_string()]);
    }
}

#[test]
fn test_repeated_skill_answers_saturate() {
    let answers: Vec<AnswerRecord> = (0..4)
        .map(|i| answer(&format!("s{}", i), skill(SkillTarget::Path(PathId::Mobile), 0.6, 0.7)))
        .collect();
    let summaries = aggregate(&answers).unwrap();

    assert_eq!(summaries.skill_assessment.mobile.level, 1.0);
    assert_eq!(summaries.skill_assessment.mobile.foundation, 1.0);
    assert_eq!(summaries.skill_assessment.frontend.level, 0.0);
}

#[test]
fn test_blank_profile_scores_goal_default_only() {
    let summaries = aggregate(&[]).unwrap();
    let profile = UserProfile::from_summaries(&summaries);
    let scores = score_paths(&profile);

    for (_, score) in scores.iter() {
        assert!((score - 0.10).abs() < 1e-9);
    }
    assert_eq!(best_path(&scores).0, PathId::Frontend);
}

#[test]
fn test_plan_duration_follows_weekly_hours() {
    let engine = RecommendationEngine::new();
    let answers = vec![
        answer("interest_001", interest(&[(PathId::Frontend, 0.9)])),
        answer("time_001", hours(25.0)),
    ];

    let rec = engine.generate(&data(answers));
    let plan = rec.learning_plan.unwrap();
    assert_eq!(plan.path_name, PathId::Frontend);
    assert_eq!(plan.total_duration_weeks, 19);
}

#[test]
fn test_last_hours_answer_wins() {
    let engine = RecommendationEngine::new();
    let answers = vec![
        answer("interest_001", interest(&[(PathId::Frontend, 0.9)])),
        answer("time_001", hours(50.0)),
        answer("time_001b", hours(7.5)),
    ];

    let rec = engine.generate(&data(answers));
    // 24 * 1.6 = 38.4
    assert_eq!(rec.learning_plan.unwrap().total_duration_weeks, 38);
    assert_eq!(rec.user_profile.unwrap().time_availability.hours_per_week, 7.5);
}

#[test]
fn test_confidence_blends_completeness_and_top_score() {
    let engine = RecommendationEngine::new();
    let input = data(backend_leaning_answers());
    let rec = engine.generate(&input);

    let top = rec.primary_path.score.unwrap();
    let expected = ((5.0 / 20.0) * 0.6 + top * 0.4) * 100.0;
    assert_eq!(rec.confidence_score, expected.round() / 100.0);
}

#[test]
fn test_supplementary_skills_follow_primary_path() {
    let engine = RecommendationEngine::new();
    let rec = engine.generate(&data(backend_leaning_answers()));

    assert!(!rec.supplementary_skills.is_empty());
    assert!(rec.supplementary_skills.iter().any(|s| s.name == "DevOps basics"));
}

#[test]
fn test_non_finite_answer_falls_back_to_default() {
    let engine = RecommendationEngine::new();
    let mut answers = backend_leaning_answers();
    answers.push(answer("broken", interest(&[(PathId::Backend, f64::NAN)])));

    let rec = engine.generate(&data(answers));
    assert!(rec.is_default);
    assert_eq!(rec.confidence_score, DEFAULT_CONFIDENCE);
    assert_eq!(rec.primary_path.path_name, PathId::Frontend);
    assert_eq!(rec.primary_path.score, None);
    assert_eq!(&rec.primary_path.template, engine.catalog().get(PathId::Frontend));
    assert!(rec.learning_plan.is_none());
    assert!(rec.path_scores.is_none());
    assert!(rec.message.is_some());
    assert_eq!(rec.user_id, "user-1");
}

#[test]
fn test_try_generate_reports_failing_answer() {
    let engine = RecommendationEngine::new();
    let answers = vec![answer("time_009", hours(f64::INFINITY))];

    let err = engine.try_generate(&data(answers)).unwrap_err();
    assert!(err.to_string().contains("time_009"));
}

#[test]
fn test_recommendation_document_shape() {
    let engine = RecommendationEngine::new();
    let rec = engine.generate(&data(backend_leaning_answers()));
    let doc = serde_json::to_value(&rec).unwrap();

    for key in [
        "user_id",
        "generated_at",
        "user_profile",
        "primary_path",
        "path_scores",
        "learning_plan",
        "supplementary_skills",
        "confidence_score",
    ] {
        assert!(doc.get(key).is_some(), "missing {}", key);
    }
    assert!(doc.get("is_default").is_none());
    assert_eq!(doc["primary_path"]["path_name"], "backend");
    assert_eq!(doc["primary_path"]["name"], "Backend Development");
    assert!(doc["path_scores"]["data_science"].is_number());
    assert!(chrono::DateTime::parse_from_rfc3339(doc["generated_at"].as_str().unwrap()).is_ok());

    let back: roadmap_server::engine::Recommendation = serde_json::from_value(doc).unwrap();
    assert_eq!(back.primary_path.path_name, PathId::Backend);
}
