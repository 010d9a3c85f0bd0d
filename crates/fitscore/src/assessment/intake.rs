use std::collections::HashSet;
use std::sync::Arc;

use super::domain::{
    Assessment, AssessmentId, AssessmentScores, AssessmentSubmission, Measurements,
    ResponseSubmission, ScoreField,
};
use super::questionnaire::{points_earned, McqResponse, QuestionBank, QuestionKind};
use super::scoring::ScoringConfig;

/// Data-integrity failures rejected before anything reaches the scoring pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("response references unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("choice '{choice}' does not belong to question '{question}'")]
    ForeignChoice { question: String, choice: String },
    #[error("choice '{choice}' selected more than once for question '{question}'")]
    RepeatedChoice { question: String, choice: String },
    #[error("question '{question}' accepts a single selection, got {selected}")]
    MultipleSelections { question: String, selected: usize },
    #[error("free-text question '{0}' cannot carry choice selections")]
    ChoicesOnFreeText(String),
    #[error("question '{0}' answered more than once")]
    DuplicateResponse(String),
    #[error("manual value {value} for {field:?} is outside its allowed range")]
    ManualScoreOutOfRange { field: ScoreField, value: f64 },
    #[error("measurement '{field}' has invalid value {value}")]
    InvalidMeasurement { field: &'static str, value: f64 },
}

const PERCENT_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Ingestion guard validating raw submissions against the question bank and scales.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    questions: Arc<QuestionBank>,
    config: ScoringConfig,
}

impl IntakeGuard {
    pub fn new(questions: Arc<QuestionBank>, config: ScoringConfig) -> Self {
        Self { questions, config }
    }

    /// Build an unscored assessment from a submission, pinning any trainer-entered values.
    pub fn assessment_from_submission(
        &self,
        submission: AssessmentSubmission,
        id: AssessmentId,
    ) -> Result<Assessment, IntakeViolation> {
        self.validate_measurements(&submission.measurements)?;
        let responses = self.responses_from_submission(&submission.responses)?;

        let mut scores = AssessmentScores::default();
        for (field, value) in &submission.manual_scores {
            self.validate_manual_score(*field, *value)?;
            scores.pin(*field, *value);
        }

        Ok(Assessment {
            id,
            client_id: submission.client_id,
            evaluator_id: submission.evaluator_id,
            assessed_on: submission.assessed_on,
            client: submission.client,
            measurements: submission.measurements,
            responses,
            scores,
            risk_factors: Vec::new(),
            archived: false,
        })
    }

    /// Resolve raw answers against the bank and compute each one's capped points.
    pub fn responses_from_submission(
        &self,
        submissions: &[ResponseSubmission],
    ) -> Result<Vec<McqResponse>, IntakeViolation> {
        let mut answered = HashSet::new();
        let mut responses = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let question_id = &submission.question_id;
            let question = self
                .questions
                .question(question_id)
                .ok_or_else(|| IntakeViolation::UnknownQuestion(question_id.0.clone()))?;

            if !answered.insert(question_id.clone()) {
                return Err(IntakeViolation::DuplicateResponse(question_id.0.clone()));
            }

            if question.kind == QuestionKind::FreeText {
                if !submission.selected.is_empty() {
                    return Err(IntakeViolation::ChoicesOnFreeText(question_id.0.clone()));
                }
            } else if !question.kind.allows_multiple() && submission.selected.len() > 1 {
                return Err(IntakeViolation::MultipleSelections {
                    question: question_id.0.clone(),
                    selected: submission.selected.len(),
                });
            }

            let mut seen = HashSet::new();
            for choice in &submission.selected {
                if question.choice(choice).is_none() {
                    return Err(IntakeViolation::ForeignChoice {
                        question: question_id.0.clone(),
                        choice: choice.0.clone(),
                    });
                }
                if !seen.insert(choice) {
                    return Err(IntakeViolation::RepeatedChoice {
                        question: question_id.0.clone(),
                        choice: choice.0.clone(),
                    });
                }
            }

            responses.push(McqResponse {
                question_id: question_id.clone(),
                selected: submission.selected.clone(),
                points_earned: points_earned(question, &submission.selected),
            });
        }

        Ok(responses)
    }

    /// Durations must be finite and non-negative; signed reaches only finite.
    pub fn validate_measurements(
        &self,
        measurements: &Measurements,
    ) -> Result<(), IntakeViolation> {
        let durations = [
            ("farmer_carry_seconds", measurements.farmer_carry_seconds),
            ("balance.left_eyes_open", measurements.balance.left_eyes_open),
            ("balance.right_eyes_open", measurements.balance.right_eyes_open),
            ("balance.left_eyes_closed", measurements.balance.left_eyes_closed),
            ("balance.right_eyes_closed", measurements.balance.right_eyes_closed),
            ("step_test.duration_seconds", measurements.step_test.duration_seconds),
        ];
        for (field, value) in durations {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(IntakeViolation::InvalidMeasurement { field, value });
                }
            }
        }

        let reaches = [
            ("toe_touch_reach_cm", measurements.toe_touch_reach_cm),
            ("shoulder_reach_cm", measurements.shoulder_reach_cm),
        ];
        for (field, value) in reaches {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(IntakeViolation::InvalidMeasurement { field, value });
                }
            }
        }

        Ok(())
    }

    /// Test scores must be whole numbers on the test's scale; everything else
    /// is a 0-100 percentage.
    pub fn validate_manual_score(
        &self,
        field: ScoreField,
        value: f64,
    ) -> Result<(), IntakeViolation> {
        let valid = match field.as_test() {
            Some(kind) => self.config.scale_for(kind).contains(value),
            None => value.is_finite() && PERCENT_RANGE.contains(&value),
        };
        if valid {
            Ok(())
        } else {
            Err(IntakeViolation::ManualScoreOutOfRange { field, value })
        }
    }
}
