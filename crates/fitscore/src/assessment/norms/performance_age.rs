use serde::{Deserialize, Serialize};

use super::super::domain::{ClientProfile, OVERALL_IDENTIFIER};
use super::super::scoring::PerformanceAgeCutoffs;
use super::NormativeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeInterpretation {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
    NeedsImmediateImprovement,
}

impl AgeInterpretation {
    /// Bucket an age difference (chronological minus performance).
    pub fn from_difference(difference: i16, cutoffs: &PerformanceAgeCutoffs) -> Self {
        if difference >= cutoffs.excellent_at {
            AgeInterpretation::Excellent
        } else if difference >= cutoffs.good_at {
            AgeInterpretation::Good
        } else if difference > cutoffs.average_above {
            AgeInterpretation::Average
        } else if difference > cutoffs.needs_improvement_above {
            AgeInterpretation::NeedsImprovement
        } else {
            AgeInterpretation::NeedsImmediateImprovement
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AgeInterpretation::Excellent => "performing well below chronological age",
            AgeInterpretation::Good => "performing younger than chronological age",
            AgeInterpretation::Average => "performing at chronological age",
            AgeInterpretation::NeedsImprovement => "performing older than chronological age",
            AgeInterpretation::NeedsImmediateImprovement => "needs immediate improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceAge {
    pub chronological_age: u8,
    pub performance_age: u8,
    /// Positive when the client performs younger than their age.
    pub age_difference: i16,
    pub matched_age_min: u8,
    pub matched_age_max: u8,
    pub interpretation: AgeInterpretation,
}

/// Find the overall-score age band whose median sits closest to `overall`.
///
/// Ties go to the younger band. Returns `None` without an overall score, a
/// chronological age, or any overall bands for the client's gender chain.
pub fn estimate_performance_age(
    overall: Option<f64>,
    client: &ClientProfile,
    table: &NormativeTable,
    cutoffs: &PerformanceAgeCutoffs,
) -> Option<PerformanceAge> {
    let overall = overall.filter(|score| score.is_finite())?;
    let chronological_age = client.age?;

    let bands = table.age_bands(OVERALL_IDENTIFIER, client.lookup_gender());
    let mut best = None;
    let mut best_distance = f64::INFINITY;
    for record in bands {
        let distance = (record.breakpoints.p50 - overall).abs();
        if distance < best_distance {
            best_distance = distance;
            best = Some(record);
        }
    }
    let matched = best?;

    let performance_age = matched.age_midpoint();
    let age_difference = i16::from(chronological_age) - i16::from(performance_age);

    Some(PerformanceAge {
        chronological_age,
        performance_age,
        age_difference,
        matched_age_min: matched.age_min,
        matched_age_max: matched.age_max,
        interpretation: AgeInterpretation::from_difference(age_difference, cutoffs),
    })
}
