use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::assessment::domain::{
    Assessment, AssessmentId, AssessmentScores, AssessmentSubmission, BalanceInput, ClientId,
    ClientProfile, EvaluatorId, Gender, Measurements, ResponseSubmission, SquatCompensations,
    SquatInput, StepTestInput,
};
use crate::assessment::intake::IntakeGuard;
use crate::assessment::questionnaire::{ChoiceId, QuestionId};
use crate::assessment::repository::{AssessmentRecord, AssessmentRepository, RepositoryError};
use crate::assessment::{AssessmentScoringService, ScoringEngine};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn male(age: u8) -> ClientProfile {
    ClientProfile {
        gender: Some(Gender::Male),
        age: Some(age),
    }
}

pub(super) fn female(age: u8) -> ClientProfile {
    ClientProfile {
        gender: Some(Gender::Female),
        age: Some(age),
    }
}

/// Every test measured. With a 35 year old male this scores squat 3, push-up 3,
/// carry 4, toe touch 4, shoulder 3, balance 4, step test 3.
pub(super) fn full_measurements() -> Measurements {
    Measurements {
        overhead_squat: Some(SquatInput::Compensations(SquatCompensations::default())),
        push_up_reps: Some(25),
        farmer_carry_seconds: Some(65.0),
        toe_touch_reach_cm: Some(2.0),
        shoulder_reach_cm: Some(-5.0),
        balance: BalanceInput {
            left_eyes_open: Some(32.0),
            right_eyes_open: Some(28.0),
            left_eyes_closed: Some(8.0),
            right_eyes_closed: Some(12.0),
        },
        step_test: StepTestInput {
            duration_seconds: Some(300.0),
            recovery_pulses: Some([80, 70, 60]),
        },
    }
}

pub(super) fn response(question: &str, choices: &[&str]) -> ResponseSubmission {
    ResponseSubmission {
        question_id: QuestionId(question.to_string()),
        selected: choices
            .iter()
            .map(|choice| ChoiceId(choice.to_string()))
            .collect(),
    }
}

/// Knowledge 6/7, lifestyle 3/4, readiness 3/5; two risk answers (sleep, then pain).
pub(super) fn questionnaire_answers() -> Vec<ResponseSubmission> {
    vec![
        response("knowledge_warmup", &["a"]),
        response("knowledge_weekly_activity", &["b"]),
        response("knowledge_components", &["a", "b"]),
        response("lifestyle_sleep", &["b"]),
        response("lifestyle_smoking", &["c"]),
        response("readiness_pain", &["a"]),
        response("readiness_motivation", &["4"]),
        response("readiness_goals", &[]),
    ]
}

pub(super) fn submission() -> AssessmentSubmission {
    AssessmentSubmission {
        client_id: ClientId("client-7".to_string()),
        evaluator_id: EvaluatorId("trainer-2".to_string()),
        assessed_on: date(2024, 3, 4),
        client: male(35),
        measurements: full_measurements(),
        responses: questionnaire_answers(),
        manual_scores: BTreeMap::new(),
    }
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard()
}

pub(super) fn guard() -> IntakeGuard {
    let engine = engine();
    IntakeGuard::new(engine.shared_questions(), engine.config().clone())
}

/// An assessment built through intake without any scores yet.
pub(super) fn assessment(submission: AssessmentSubmission) -> Assessment {
    guard()
        .assessment_from_submission(submission, AssessmentId("asm-test".to_string()))
        .expect("valid submission")
}

pub(super) fn bare_assessment(client: ClientProfile, measurements: Measurements) -> Assessment {
    Assessment {
        id: AssessmentId("asm-bare".to_string()),
        client_id: ClientId("client-1".to_string()),
        evaluator_id: EvaluatorId("trainer-1".to_string()),
        assessed_on: date(2024, 1, 15),
        client,
        measurements,
        responses: Vec::new(),
        scores: AssessmentScores::default(),
        risk_factors: Vec::new(),
        archived: false,
    }
}

pub(super) fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn build_service() -> (
    AssessmentScoringService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentScoringService::new(repository.clone(), engine());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.assessment.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_client(&self, client_id: &ClientId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| &record.assessment.client_id == client_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_client(&self, _client_id: &ClientId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
