use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{
    AssessmentId, AssessmentSubmission, ClientId, ClientProfile, InputUpdate, ScoreField,
};
use super::intake::{IntakeGuard, IntakeViolation};
use super::norms::PercentileResult;
use super::progress::{self, ProgressReport};
use super::repository::{AssessmentRecord, AssessmentRepository, RepositoryError};
use super::scoring::ScoringEngine;

/// Trainer override edits: values to pin and fields to hand back to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideRequest {
    #[serde(default)]
    pub pin: BTreeMap<ScoreField, f64>,
    #[serde(default)]
    pub release: Vec<ScoreField>,
}

/// Service composing the intake guard, repository, and scoring engine.
pub struct AssessmentScoringService<R> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
    engine: Arc<ScoringEngine>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

impl<R> AssessmentScoringService<R>
where
    R: AssessmentRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: ScoringEngine) -> Self {
        let guard = IntakeGuard::new(engine.shared_questions(), engine.config().clone());
        Self {
            guard: Arc::new(guard),
            repository,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Validate, store and score a newly recorded session.
    pub fn submit(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let assessment = self
            .guard
            .assessment_from_submission(submission, next_assessment_id())?;
        let mut record = self.repository.insert(AssessmentRecord {
            assessment,
            outcome: None,
        })?;

        self.apply_scoring(&mut record);
        self.repository.update(record.clone())?;

        tracing::info!(
            assessment = %record.assessment.id.0,
            client = %record.assessment.client_id.0,
            "assessment submitted"
        );
        Ok(record)
    }

    /// Replace raw inputs and recompute. Pinned fields survive the recompute.
    pub fn update_inputs(
        &self,
        id: &AssessmentId,
        update: InputUpdate,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let mut record = self.fetch_mutable(id)?;

        if let Some(measurements) = update.measurements {
            self.guard.validate_measurements(&measurements)?;
            record.assessment.measurements = measurements;
        }
        if let Some(responses) = update.responses {
            record.assessment.responses = self.guard.responses_from_submission(&responses)?;
        }
        if let Some(client) = update.client {
            record.assessment.client = client;
        }

        self.apply_scoring(&mut record);
        self.repository.update(record.clone())?;
        Ok(record)
    }

    pub fn recompute(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let mut record = self.fetch_mutable(id)?;
        self.apply_scoring(&mut record);
        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Pin or release score fields, then recompute everything left unpinned.
    pub fn set_overrides(
        &self,
        id: &AssessmentId,
        request: OverrideRequest,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let mut record = self.fetch_mutable(id)?;

        for (field, value) in &request.pin {
            self.guard.validate_manual_score(*field, *value)?;
        }
        for field in &request.release {
            record.assessment.scores.release(*field);
        }
        for (field, value) in request.pin {
            record.assessment.scores.pin(field, value);
        }

        self.apply_scoring(&mut record);
        self.repository.update(record.clone())?;

        tracing::info!(
            assessment = %id.0,
            manual = record.assessment.scores.manual_fields().len(),
            "manual overrides updated"
        );
        Ok(record)
    }

    /// Freeze an assessment. Archiving twice is a no-op.
    pub fn archive(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let mut record = self.get(id)?;
        if record.assessment.archived {
            return Ok(record);
        }

        record.assessment.archived = true;
        self.repository.update(record.clone())?;
        tracing::info!(assessment = %id.0, "assessment archived");
        Ok(record)
    }

    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// A client's assessments, oldest first.
    pub fn history(
        &self,
        client_id: &ClientId,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        let mut records = self.repository.for_client(client_id)?;
        records.sort_by(|a, b| {
            (a.assessment.assessed_on, &a.assessment.id)
                .cmp(&(b.assessment.assessed_on, &b.assessment.id))
        });
        Ok(records)
    }

    /// Compare the client's two most recent scored assessments.
    pub fn client_progress(
        &self,
        client_id: &ClientId,
    ) -> Result<ProgressReport, AssessmentServiceError> {
        let scored: Vec<AssessmentRecord> = self
            .history(client_id)?
            .into_iter()
            .filter(|record| record.outcome.is_some())
            .collect();

        match scored.as_slice() {
            [.., previous, current] => Ok(progress::compare(previous, current)),
            _ => Err(AssessmentServiceError::InsufficientHistory {
                client_id: client_id.clone(),
                found: scored.len(),
            }),
        }
    }

    pub fn rank(&self, identifier: &str, score: f64, client: &ClientProfile) -> PercentileResult {
        self.engine.percentiles().rank(identifier, score, client)
    }

    fn fetch_mutable(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self.get(id)?;
        if record.assessment.archived {
            return Err(AssessmentServiceError::Archived(id.clone()));
        }
        Ok(record)
    }

    fn apply_scoring(&self, record: &mut AssessmentRecord) {
        let outcome = self.engine.score(&record.assessment);
        record.assessment.scores = outcome.scores;
        record.assessment.risk_factors = outcome.risk_factors.clone();
        record.outcome = Some(outcome);
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("assessment '{0}' is archived and can no longer change")]
    Archived(AssessmentId),
    #[error("client '{client_id}' needs two scored assessments to compare, found {found}")]
    InsufficientHistory { client_id: ClientId, found: usize },
}
