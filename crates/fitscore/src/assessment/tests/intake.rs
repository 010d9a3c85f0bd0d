use super::common::*;
use crate::assessment::domain::{AssessmentId, ScoreField};
use crate::assessment::intake::IntakeViolation;

fn rejected(responses: Vec<crate::assessment::domain::ResponseSubmission>) -> IntakeViolation {
    guard()
        .responses_from_submission(&responses)
        .expect_err("responses rejected")
}

#[test]
fn submission_becomes_an_unscored_assessment() {
    let assessment = assessment(submission());

    assert_eq!(assessment.id, AssessmentId("asm-test".to_string()));
    assert_eq!(assessment.responses.len(), 8);
    assert!(!assessment.archived);
    assert!(assessment.scores.manual_fields().is_empty());
    assert_eq!(assessment.scores.overall.value(), None);
}

#[test]
fn response_points_are_capped_per_question() {
    let assessment = assessment(submission());
    let components = assessment
        .responses
        .iter()
        .find(|response| response.question_id.0 == "knowledge_components")
        .expect("answer kept");
    assert_eq!(components.points_earned, 2.0);
}

#[test]
fn unknown_questions_are_rejected() {
    let violation = rejected(vec![response("favourite_colour", &["a"])]);
    assert_eq!(
        violation,
        IntakeViolation::UnknownQuestion("favourite_colour".to_string())
    );
}

#[test]
fn choices_from_another_question_are_rejected() {
    let violation = rejected(vec![response("readiness_motivation", &["a"])]);
    assert!(matches!(violation, IntakeViolation::ForeignChoice { .. }));
}

#[test]
fn single_choice_questions_accept_one_selection() {
    let violation = rejected(vec![response("knowledge_warmup", &["a", "b"])]);
    assert_eq!(
        violation,
        IntakeViolation::MultipleSelections {
            question: "knowledge_warmup".to_string(),
            selected: 2,
        }
    );
}

#[test]
fn repeated_choices_are_rejected() {
    let violation = rejected(vec![response("knowledge_components", &["a", "a"])]);
    assert!(matches!(violation, IntakeViolation::RepeatedChoice { .. }));
}

#[test]
fn free_text_questions_cannot_carry_choices() {
    let violation = rejected(vec![response("readiness_goals", &["a"])]);
    assert_eq!(
        violation,
        IntakeViolation::ChoicesOnFreeText("readiness_goals".to_string())
    );
}

#[test]
fn a_question_can_only_be_answered_once() {
    let violation = rejected(vec![
        response("lifestyle_sleep", &["a"]),
        response("lifestyle_sleep", &["c"]),
    ]);
    assert_eq!(
        violation,
        IntakeViolation::DuplicateResponse("lifestyle_sleep".to_string())
    );
}

#[test]
fn manual_test_scores_must_sit_on_the_scale() {
    let guard = guard();
    assert!(guard.validate_manual_score(ScoreField::PushUp, 5.0).is_ok());
    assert!(guard.validate_manual_score(ScoreField::OverheadSquat, 0.0).is_ok());
    assert!(guard.validate_manual_score(ScoreField::OverheadSquat, 4.0).is_err());
    assert!(guard.validate_manual_score(ScoreField::PushUp, 0.0).is_err());
    assert!(guard.validate_manual_score(ScoreField::PushUp, 2.5).is_err());
}

#[test]
fn manual_percentages_must_sit_between_zero_and_one_hundred() {
    let guard = guard();
    assert!(guard.validate_manual_score(ScoreField::Overall, 72.25).is_ok());
    assert!(guard.validate_manual_score(ScoreField::Knowledge, 100.5).is_err());
    assert!(guard.validate_manual_score(ScoreField::Cardio, f64::NAN).is_err());
}

#[test]
fn manual_scores_on_submission_are_pinned() {
    let mut submission = submission();
    submission.manual_scores.insert(ScoreField::Strength, 88.0);
    let assessment = assessment(submission);

    assert!(assessment.scores.is_manual(ScoreField::Strength));
    assert_eq!(assessment.scores.value(ScoreField::Strength), Some(88.0));
}

#[test]
fn negative_durations_are_rejected() {
    let mut submission = submission();
    submission.measurements.farmer_carry_seconds = Some(-3.0);
    let result = guard().assessment_from_submission(submission, AssessmentId("x".to_string()));
    assert_eq!(
        result.expect_err("invalid"),
        IntakeViolation::InvalidMeasurement {
            field: "farmer_carry_seconds",
            value: -3.0,
        }
    );
}

#[test]
fn negative_reach_is_a_valid_measurement() {
    let mut submission = submission();
    submission.measurements.toe_touch_reach_cm = Some(-8.0);
    assert!(guard()
        .assessment_from_submission(submission, AssessmentId("x".to_string()))
        .is_ok());
}
