use super::super::domain::{CategoryKind, CategoryScores, TestScores};
use super::config::{CategoryWeights, ScoringConfig};

/// Normalize a category's test-score sum to 0-100.
///
/// Absent tests add nothing but the denominator stays at the category's full
/// maximum, so missing data lowers the score without blocking it. A category
/// with no tests present scores 0.
pub fn category_score(kind: CategoryKind, tests: &TestScores, config: &ScoringConfig) -> f64 {
    let maximum = config.category_maximum(kind);
    if maximum == 0 {
        return 0.0;
    }

    let earned: u32 = kind
        .members()
        .iter()
        .filter_map(|test| tests.get(*test).value())
        .map(u32::from)
        .sum();

    100.0 * f64::from(earned) / f64::from(maximum)
}

/// Weighted sum of the category scores; categories without a value contribute 0.
pub fn overall_score(categories: &CategoryScores, weights: &CategoryWeights) -> f64 {
    CategoryKind::ALL
        .iter()
        .map(|kind| categories.get(*kind).value().unwrap_or(0.0) * weights.weight(*kind))
        .sum()
}
