use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use fitscore::assessment::domain::{
    AssessmentSubmission, BalanceInput, CategoryKind, ClientId, ClientProfile, EvaluatorId, Gender,
    Measurements, ResponseSubmission, ScoreField, SquatCompensations, SquatInput, StepTestInput,
};
use fitscore::assessment::questionnaire::{ChoiceId, QuestionId};
use fitscore::assessment::{
    AgeInterpretation, AssessmentId, AssessmentRecord, AssessmentRepository,
    AssessmentScoringService, NormativeTable, OverrideRequest, QuestionBank, RepositoryError,
    ScoringConfig, ScoringEngine,
};

const REFERENCE_NORMS: &[u8] = include_bytes!("../data/reference_norms.csv");
const QUESTION_BANK: &[u8] = include_bytes!("../data/question_bank.json");

#[derive(Default)]
struct InMemoryRepository {
    records: Mutex<HashMap<AssessmentId, AssessmentRecord>>,
}

impl AssessmentRepository for InMemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut records = self.records.lock().expect("lock");
        if records.contains_key(&record.assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(record.assessment.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("lock");
        match records.get_mut(&record.assessment.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self.records.lock().expect("lock").get(id).cloned())
    }

    fn for_client(&self, client_id: &ClientId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .values()
            .filter(|record| &record.assessment.client_id == client_id)
            .cloned()
            .collect())
    }
}

fn service() -> AssessmentScoringService<InMemoryRepository> {
    let norms = NormativeTable::from_csv_reader(REFERENCE_NORMS).expect("norms load");
    let questions = QuestionBank::from_json_reader(QUESTION_BANK).expect("question bank loads");
    let engine = ScoringEngine::new(
        ScoringConfig::default(),
        Arc::new(norms),
        Arc::new(questions),
    );
    AssessmentScoringService::new(Arc::new(InMemoryRepository::default()), engine)
}

fn answer(question: &str, choice: &str) -> ResponseSubmission {
    ResponseSubmission {
        question_id: QuestionId(question.to_string()),
        selected: vec![ChoiceId(choice.to_string())],
    }
}

fn submission(assessed_on: NaiveDate, push_up_reps: u32) -> AssessmentSubmission {
    AssessmentSubmission {
        client_id: ClientId("client-42".to_string()),
        evaluator_id: EvaluatorId("coach-1".to_string()),
        assessed_on,
        client: ClientProfile {
            gender: Some(Gender::Male),
            age: Some(35),
        },
        measurements: Measurements {
            overhead_squat: Some(SquatInput::Compensations(SquatCompensations::default())),
            push_up_reps: Some(push_up_reps),
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
        },
        responses: vec![
            answer("k_rest_days", "a"),
            answer("l_alcohol", "b"),
            answer("r_clearance", "b"),
            ResponseSubmission {
                question_id: QuestionId("r_notes".to_string()),
                selected: Vec::new(),
            },
        ],
        manual_scores: BTreeMap::new(),
    }
}

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).expect("valid date")
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

#[test]
fn submitted_assessment_is_scored_ranked_and_aged() {
    let service = service();

    let record = service
        .submit(submission(day(2024, 5, 6), 25))
        .expect("submission succeeds");
    let report = record.report();

    assert_eq!(report.status, "scored");
    assert_eq!(report.scores.tests.push_up.value(), Some(3));
    assert!(close(report.scores.overall.value().expect("overall"), 70.5));
    // 70.5 * 0.60 + 100 * 0.15 + 50 * 0.15 + 100 * 0.10
    assert!(close(
        report.scores.comprehensive.value().expect("comprehensive"),
        74.8
    ));
    assert!(report.risk_factors.is_empty());

    let push_up = report.percentiles["push_up"]
        .percentile()
        .expect("push-up ranked");
    assert!(push_up > 50.0, "25 reps beats the 30-39 male median");
    assert!(close(push_up, 62.5));
    assert!(close(
        report.percentiles["strength"].percentile().expect("strength"),
        55.0
    ));
    assert!(report.percentiles["shoulder_mobility"].percentile().is_none());

    let age = report.performance_age.expect("performance age");
    assert_eq!((age.matched_age_min, age.matched_age_max), (30, 39));
    assert_eq!(age.interpretation, AgeInterpretation::Average);
}

#[test]
fn risk_answers_surface_on_the_report() {
    let service = service();
    let mut submission = submission(day(2024, 5, 6), 25);
    submission.responses[2] = answer("r_clearance", "a");

    let record = service.submit(submission).expect("submission succeeds");

    assert_eq!(record.assessment.risk_factors.len(), 1);
    let risk = &record.assessment.risk_factors[0];
    assert_eq!(risk.category_name, "Training readiness");
    assert!(close(risk.weight, 1.0));
    assert_eq!(record.assessment.scores.questionnaire.readiness.value(), Some(0.0));
}

#[test]
fn trainer_overrides_survive_input_changes() {
    let service = service();
    let record = service
        .submit(submission(day(2024, 5, 6), 25))
        .expect("submission succeeds");
    let id = record.assessment.id.clone();

    let mut pin = BTreeMap::new();
    pin.insert(ScoreField::Overall, 80.0);
    let pinned = service
        .set_overrides(
            &id,
            OverrideRequest {
                pin,
                release: Vec::new(),
            },
        )
        .expect("override applied");
    assert!(pinned.assessment.scores.overall.is_manual());
    assert!(close(
        pinned.assessment.scores.comprehensive.value().expect("comprehensive"),
        80.0 * 0.60 + 32.5
    ));

    let recomputed = service.recompute(&id).expect("recompute succeeds");
    assert_eq!(recomputed.assessment.scores.overall.value(), Some(80.0));
    assert_eq!(
        recomputed.report().manual_fields,
        vec![ScoreField::Overall]
    );
}

#[test]
fn progress_tracks_change_between_visits() {
    let service = service();
    service
        .submit(submission(day(2024, 1, 8), 12))
        .expect("first visit");
    service
        .submit(submission(day(2024, 4, 8), 25))
        .expect("second visit");

    let progress = service
        .client_progress(&ClientId("client-42".to_string()))
        .expect("progress available");

    assert_eq!(progress.days_between, 91);
    let strength = &progress.categories[&CategoryKind::Strength];
    assert!(close(strength.change.expect("change"), 10.0));
    assert!(strength.improved());
    assert!(progress.overall.improved());
}
