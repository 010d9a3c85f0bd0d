//! Fitness assessment scoring: raw measurements and questionnaire answers in,
//! gated scores, percentile rankings and performance age out.

pub mod domain;
pub mod intake;
pub mod norms;
pub mod overrides;
pub mod progress;
pub mod questionnaire;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Assessment, AssessmentId, AssessmentScores, AssessmentSubmission, BalanceInput, CategoryKind,
    CategoryScores, ClientId, ClientProfile, EvaluatorId, Gender, InputUpdate, Measurements,
    QuestionnaireDomain, QuestionnaireScores, ResponseSubmission, ScoreField, SquatCompensations,
    SquatInput, StepTestInput, TestKind, TestScores, ALL_SCORE_FIELDS, OVERALL_IDENTIFIER,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use norms::{
    AgeInterpretation, NormativeRecord, NormativeTable, NormsError, PercentileEngine,
    PercentileRank, PercentileResult, PerformanceAge,
};
pub use overrides::{GateOutcome, GateReport, Scored};
pub use progress::{ProgressReport, ScoreDelta};
pub use questionnaire::{McqSummary, QuestionBank, QuestionBankError, RiskFactor};
pub use repository::{AssessmentRecord, AssessmentReport, AssessmentRepository, RepositoryError};
pub use router::{assessment_router, PercentileQuery};
pub use scoring::{ScoringConfig, ScoringConfigError, ScoringEngine, ScoringOutcome};
pub use service::{AssessmentScoringService, AssessmentServiceError, OverrideRequest};
