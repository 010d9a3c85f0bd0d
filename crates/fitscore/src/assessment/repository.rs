use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Assessment, AssessmentId, AssessmentScores, ClientId, ScoreField};
use super::norms::{PercentileResult, PerformanceAge};
use super::questionnaire::{CategoryResult, McqCategoryId, RiskFactor};
use super::scoring::ScoringOutcome;

/// Repository record: the assessment plus the analytics of its latest scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub assessment: Assessment,
    pub outcome: Option<ScoringOutcome>,
}

impl AssessmentRecord {
    pub fn status(&self) -> &'static str {
        if self.assessment.archived {
            "archived"
        } else if self.outcome.is_some() {
            "scored"
        } else {
            "pending"
        }
    }

    pub fn report(&self) -> AssessmentReport {
        let assessment = &self.assessment;
        let outcome = self.outcome.as_ref();

        AssessmentReport {
            assessment_id: assessment.id.clone(),
            client_id: assessment.client_id.clone(),
            assessed_on: assessment.assessed_on,
            status: self.status(),
            scores: assessment.scores,
            manual_fields: assessment.scores.manual_fields(),
            questionnaire: outcome
                .map(|outcome| outcome.questionnaire.categories.clone())
                .unwrap_or_default(),
            risk_factors: assessment.risk_factors.clone(),
            percentiles: outcome
                .map(|outcome| outcome.percentiles.clone())
                .unwrap_or_default(),
            performance_age: outcome.and_then(|outcome| outcome.performance_age),
        }
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn for_client(&self, client_id: &ClientId) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// The output contract handed to report renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub assessment_id: AssessmentId,
    pub client_id: ClientId,
    pub assessed_on: NaiveDate,
    pub status: &'static str,
    pub scores: AssessmentScores,
    pub manual_fields: Vec<ScoreField>,
    pub questionnaire: BTreeMap<McqCategoryId, CategoryResult>,
    pub risk_factors: Vec<RiskFactor>,
    pub percentiles: BTreeMap<String, PercentileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_age: Option<PerformanceAge>,
}
