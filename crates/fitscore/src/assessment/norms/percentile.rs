use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::super::domain::{
    AssessmentScores, CategoryKind, ClientProfile, Gender, Measurements, TestKind,
    OVERALL_IDENTIFIER,
};
use super::super::scoring::raw_metric;
use super::parser::normalize_identifier;
use super::{Breakpoints, NormativeTable, Provenance, BREAKPOINT_PERCENTILES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileRank {
    pub identifier: String,
    pub score: f64,
    pub percentile: f64,
    /// Gender key of the record actually used, which may be the pooled fallback.
    pub reference_gender: Gender,
    pub age_min: u8,
    pub age_max: u8,
    pub provenance: Provenance,
}

/// A ranking, or an explicit marker that no reference distribution applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PercentileResult {
    Ranked(PercentileRank),
    NoData,
}

impl PercentileResult {
    pub fn percentile(&self) -> Option<f64> {
        match self {
            PercentileResult::Ranked(rank) => Some(rank.percentile),
            PercentileResult::NoData => None,
        }
    }
}

/// Piecewise-linear percentile for `score`, clamped to the 10th..90th range.
///
/// When neighbouring breakpoints share a score, a score sitting on it takes
/// the highest percentile that score reaches.
pub fn interpolate_percentile(breakpoints: &Breakpoints, score: f64) -> f64 {
    let scores = breakpoints.scores();
    let last = scores.len() - 1;

    if score < scores[0] {
        return BREAKPOINT_PERCENTILES[0];
    }
    if score >= scores[last] {
        return BREAKPOINT_PERCENTILES[last];
    }

    for i in 0..last {
        let (low, high) = (scores[i], scores[i + 1]);
        if score < high {
            let (p_low, p_high) = (BREAKPOINT_PERCENTILES[i], BREAKPOINT_PERCENTILES[i + 1]);
            return p_low + (score - low) / (high - low) * (p_high - p_low);
        }
    }

    BREAKPOINT_PERCENTILES[last]
}

/// Ranks scores against a shared normative table.
#[derive(Debug, Clone)]
pub struct PercentileEngine {
    table: Arc<NormativeTable>,
}

impl PercentileEngine {
    pub fn new(table: Arc<NormativeTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &NormativeTable {
        &self.table
    }

    pub fn rank(&self, identifier: &str, score: f64, client: &ClientProfile) -> PercentileResult {
        let Some(age) = client.age else {
            return PercentileResult::NoData;
        };
        if !score.is_finite() {
            return PercentileResult::NoData;
        }

        let identifier = normalize_identifier(identifier);
        match self.table.find(&identifier, client.lookup_gender(), age) {
            Some(record) => PercentileResult::Ranked(PercentileRank {
                identifier,
                score,
                percentile: interpolate_percentile(&record.breakpoints, score),
                reference_gender: record.gender,
                age_min: record.age_min,
                age_max: record.age_max,
                provenance: record.provenance.clone(),
            }),
            None => PercentileResult::NoData,
        }
    }

    /// Rank every available test raw metric, category score and the overall score.
    pub fn rank_assessment(
        &self,
        measurements: &Measurements,
        scores: &AssessmentScores,
        client: &ClientProfile,
    ) -> BTreeMap<String, PercentileResult> {
        ranking_inputs(measurements, scores)
            .into_iter()
            .map(|(identifier, score)| {
                let result = self.rank(identifier, score, client);
                (identifier.to_string(), result)
            })
            .collect()
    }
}

fn ranking_inputs(
    measurements: &Measurements,
    scores: &AssessmentScores,
) -> Vec<(&'static str, f64)> {
    let tests = TestKind::ALL.iter().filter_map(|kind| {
        raw_metric(*kind, measurements).map(|value| (kind.identifier(), value))
    });
    let categories = CategoryKind::ALL.iter().filter_map(|kind| {
        scores
            .categories
            .get(*kind)
            .value()
            .map(|value| (kind.identifier(), value))
    });
    let overall = scores
        .overall
        .value()
        .map(|value| (OVERALL_IDENTIFIER, value));

    tests.chain(categories).chain(overall).collect()
}
