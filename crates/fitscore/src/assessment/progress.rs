//! Change between two assessments of the same client.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, CategoryKind, ClientId, QuestionnaireDomain};
use super::repository::AssessmentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub previous: Option<f64>,
    pub current: Option<f64>,
    /// `current - previous`; absent unless both sides were scored.
    pub change: Option<f64>,
}

impl ScoreDelta {
    pub fn between(previous: Option<f64>, current: Option<f64>) -> Self {
        let change = match (previous, current) {
            (Some(previous), Some(current)) => Some(current - previous),
            _ => None,
        };
        Self {
            previous,
            current,
            change,
        }
    }

    pub fn improved(&self) -> bool {
        self.change.is_some_and(|change| change > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub client_id: ClientId,
    pub previous_assessment: AssessmentId,
    pub current_assessment: AssessmentId,
    pub previous_date: NaiveDate,
    pub current_date: NaiveDate,
    pub days_between: i64,
    pub categories: BTreeMap<CategoryKind, ScoreDelta>,
    pub overall: ScoreDelta,
    pub questionnaire: BTreeMap<QuestionnaireDomain, ScoreDelta>,
    pub comprehensive: ScoreDelta,
    /// Change in (chronological - performance) age; positive means the client
    /// now performs relatively younger.
    pub age_difference_change: Option<i16>,
}

pub fn compare(previous: &AssessmentRecord, current: &AssessmentRecord) -> ProgressReport {
    let before = &previous.assessment.scores;
    let after = &current.assessment.scores;

    let categories = CategoryKind::ALL
        .iter()
        .map(|kind| {
            let delta = ScoreDelta::between(
                before.categories.get(*kind).value(),
                after.categories.get(*kind).value(),
            );
            (*kind, delta)
        })
        .collect();

    let questionnaire = QuestionnaireDomain::ALL
        .iter()
        .map(|domain| {
            let delta = ScoreDelta::between(
                before.questionnaire.get(*domain).value(),
                after.questionnaire.get(*domain).value(),
            );
            (*domain, delta)
        })
        .collect();

    let age_difference = |record: &AssessmentRecord| {
        record
            .outcome
            .as_ref()
            .and_then(|outcome| outcome.performance_age)
            .map(|age| age.age_difference)
    };
    let age_difference_change = match (age_difference(previous), age_difference(current)) {
        (Some(before), Some(after)) => Some(after - before),
        _ => None,
    };

    ProgressReport {
        client_id: current.assessment.client_id.clone(),
        previous_assessment: previous.assessment.id.clone(),
        current_assessment: current.assessment.id.clone(),
        previous_date: previous.assessment.assessed_on,
        current_date: current.assessment.assessed_on,
        days_between: (current.assessment.assessed_on - previous.assessment.assessed_on)
            .num_days(),
        categories,
        overall: ScoreDelta::between(before.overall.value(), after.overall.value()),
        questionnaire,
        comprehensive: ScoreDelta::between(
            before.comprehensive.value(),
            after.comprehensive.value(),
        ),
        age_difference_change,
    }
}
