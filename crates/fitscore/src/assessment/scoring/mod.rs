mod aggregate;
mod blend;
mod config;
mod measures;

pub use aggregate::{category_score, overall_score};
pub use blend::comprehensive_score;
pub use config::{
    BalanceConfig, CategoryWeights, ComprehensiveWeights, DurationBands, MovementQualityConfig,
    PerformanceAgeCutoffs, ScoreScale, ScoringConfig, ScoringConfigError, ThresholdBand,
    ThresholdTable,
};
pub use measures::{
    balance_averages, raw_metric, score_balance, score_farmer_carry, score_overhead_squat,
    score_push_up, score_shoulder_mobility, score_squat_compensations, score_squat_legacy,
    score_step_test, score_test, score_toe_touch, step_test_recovery_index,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{
    Assessment, AssessmentId, AssessmentScores, CategoryKind, QuestionnaireDomain, ScoreField,
    TestKind,
};
use super::norms::{
    estimate_performance_age, NormativeTable, PercentileEngine, PercentileResult, PerformanceAge,
};
use super::overrides::GateReport;
use super::questionnaire::{score_responses, McqSummary, QuestionBank, RiskFactor};

/// Stateless pipeline applying the scoring configuration and reference data to one assessment.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
    norms: Arc<NormativeTable>,
    questions: Arc<QuestionBank>,
    percentiles: PercentileEngine,
}

impl ScoringEngine {
    pub fn new(
        config: ScoringConfig,
        norms: Arc<NormativeTable>,
        questions: Arc<QuestionBank>,
    ) -> Self {
        let percentiles = PercentileEngine::new(norms.clone());
        Self {
            config,
            norms,
            questions,
            percentiles,
        }
    }

    /// Default configuration with the built-in normative table and question bank.
    pub fn standard() -> Self {
        Self::new(
            ScoringConfig::default(),
            Arc::new(NormativeTable::standard()),
            Arc::new(QuestionBank::standard()),
        )
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn norms(&self) -> &NormativeTable {
        &self.norms
    }

    pub fn questions(&self) -> &QuestionBank {
        &self.questions
    }

    pub fn shared_questions(&self) -> Arc<QuestionBank> {
        self.questions.clone()
    }

    pub fn percentiles(&self) -> &PercentileEngine {
        &self.percentiles
    }

    /// Recompute every non-pinned score field from the assessment's raw inputs.
    ///
    /// Pinned fields are read as inputs by downstream stages: a manual push-up
    /// score feeds strength, a manual strength score feeds overall, and so on.
    pub fn score(&self, assessment: &Assessment) -> ScoringOutcome {
        let mut scores = assessment.scores;
        let mut gate = GateReport::default();

        for kind in TestKind::ALL {
            let computed = score_test(
                kind,
                &assessment.measurements,
                &assessment.client,
                &self.config,
            );
            let outcome = scores.tests.get_mut(kind).apply(computed);
            gate.record(ScoreField::test(kind), outcome);
        }

        for kind in CategoryKind::ALL {
            let computed = category_score(kind, &scores.tests, &self.config);
            let outcome = scores.categories.get_mut(kind).apply(Some(computed));
            gate.record(ScoreField::category(kind), outcome);
        }

        let overall = has_physical_data(&scores)
            .then(|| overall_score(&scores.categories, &self.config.overall_weights));
        gate.record(ScoreField::Overall, scores.overall.apply(overall));

        let questionnaire = score_responses(&assessment.responses, &self.questions);
        for domain in QuestionnaireDomain::ALL {
            let computed = questionnaire.percentage(domain.category_id());
            let outcome = scores.questionnaire.get_mut(domain).apply(Some(computed));
            gate.record(ScoreField::questionnaire(domain), outcome);
        }

        let has_responses = questionnaire.has_responses()
            || QuestionnaireDomain::ALL
                .iter()
                .any(|domain| scores.questionnaire.get(*domain).is_manual());
        let comprehensive = comprehensive_score(
            scores.overall.value(),
            &scores.questionnaire,
            has_responses,
            &self.config.comprehensive_weights,
        );
        gate.record(
            ScoreField::Comprehensive,
            scores.comprehensive.apply(comprehensive),
        );

        let percentiles = self.percentiles.rank_assessment(
            &assessment.measurements,
            &scores,
            &assessment.client,
        );
        let performance_age = estimate_performance_age(
            scores.overall.value(),
            &assessment.client,
            &self.norms,
            &self.config.performance_age,
        );

        tracing::debug!(
            assessment = %assessment.id.0,
            written = gate.written.len(),
            preserved = gate.preserved.len(),
            ranked = percentiles.len(),
            "assessment scored"
        );

        ScoringOutcome {
            assessment_id: assessment.id.clone(),
            scores,
            gate,
            risk_factors: questionnaire.risk_factors.clone(),
            questionnaire,
            percentiles,
            performance_age,
        }
    }
}

/// Overall stays empty until some physical input exists, so "not assessed"
/// is not reported as a zero.
fn has_physical_data(scores: &AssessmentScores) -> bool {
    scores.tests.any_present()
        || CategoryKind::ALL
            .iter()
            .any(|kind| scores.categories.get(*kind).is_manual())
}

/// Result of one scoring run: the gated score set plus derived analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub assessment_id: AssessmentId,
    pub scores: AssessmentScores,
    pub gate: GateReport,
    pub questionnaire: McqSummary,
    pub risk_factors: Vec<RiskFactor>,
    pub percentiles: BTreeMap<String, PercentileResult>,
    pub performance_age: Option<PerformanceAge>,
}
