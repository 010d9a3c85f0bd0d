use super::common::*;
use crate::assessment::domain::{ClientProfile, Gender};
use crate::assessment::norms::{
    estimate_performance_age, AgeInterpretation, Breakpoints, NormativeRecord, NormativeTable,
    Provenance,
};
use crate::assessment::scoring::{PerformanceAgeCutoffs, ScoringConfig};

fn cutoffs() -> PerformanceAgeCutoffs {
    ScoringConfig::default().performance_age
}

fn overall_band(age_min: u8, age_max: u8, p50: f64) -> NormativeRecord {
    NormativeRecord {
        identifier: "overall".to_string(),
        gender: Gender::Average,
        age_min,
        age_max,
        breakpoints: Breakpoints {
            p10: p50 - 20.0,
            p25: p50 - 10.0,
            p50,
            p75: p50 + 10.0,
            p90: p50 + 20.0,
        },
        provenance: Provenance {
            source: "test".to_string(),
            year: None,
        },
    }
}

#[test]
fn score_matching_a_band_median_lands_in_that_band() {
    let table = NormativeTable::standard();
    let result =
        estimate_performance_age(Some(62.0), &male(35), &table, &cutoffs()).expect("estimate");

    assert_eq!((result.matched_age_min, result.matched_age_max), (40, 49));
    assert!((40..=49).contains(&result.performance_age));
    assert_eq!(result.chronological_age, 35);
    assert_eq!(result.age_difference, 35 - i16::from(result.performance_age));
}

#[test]
fn age_difference_sign_tracks_younger_and_older_performance() {
    let table = NormativeTable::standard();

    let younger =
        estimate_performance_age(Some(74.0), &male(60), &table, &cutoffs()).expect("estimate");
    assert!(younger.age_difference > 0);
    assert_eq!(younger.interpretation, AgeInterpretation::Excellent);

    let older =
        estimate_performance_age(Some(40.0), &male(30), &table, &cutoffs()).expect("estimate");
    assert!(older.age_difference < 0);
    assert_eq!(
        older.interpretation,
        AgeInterpretation::NeedsImmediateImprovement
    );
}

#[test]
fn interpretation_buckets_follow_the_configured_cutoffs() {
    let cutoffs = cutoffs();
    let cases = [
        (10, AgeInterpretation::Excellent),
        (9, AgeInterpretation::Good),
        (3, AgeInterpretation::Good),
        (2, AgeInterpretation::Average),
        (0, AgeInterpretation::Average),
        (-2, AgeInterpretation::Average),
        (-3, AgeInterpretation::NeedsImprovement),
        (-9, AgeInterpretation::NeedsImprovement),
        (-10, AgeInterpretation::NeedsImmediateImprovement),
    ];
    for (difference, expected) in cases {
        assert_eq!(
            AgeInterpretation::from_difference(difference, &cutoffs),
            expected,
            "difference {difference}"
        );
    }
}

#[test]
fn gender_selects_its_own_age_bands() {
    let table = NormativeTable::standard();
    let female_result =
        estimate_performance_age(Some(58.0), &female(45), &table, &cutoffs()).expect("estimate");
    assert_eq!(female_result.matched_age_min, 40);

    let pooled = ClientProfile {
        gender: None,
        age: Some(45),
    };
    let pooled_result =
        estimate_performance_age(Some(60.0), &pooled, &table, &cutoffs()).expect("estimate");
    assert_eq!(pooled_result.matched_age_min, 40);
}

#[test]
fn ties_resolve_to_the_younger_band() {
    let table = NormativeTable::new(vec![
        overall_band(40, 49, 60.0),
        overall_band(30, 39, 70.0),
    ])
    .expect("valid table");
    let result =
        estimate_performance_age(Some(65.0), &male(40), &table, &cutoffs()).expect("estimate");
    assert_eq!(result.matched_age_min, 30);
}

#[test]
fn missing_inputs_produce_no_estimate() {
    let table = NormativeTable::standard();
    let no_age = ClientProfile {
        gender: Some(Gender::Male),
        age: None,
    };
    assert!(estimate_performance_age(None, &male(35), &table, &cutoffs()).is_none());
    assert!(estimate_performance_age(Some(60.0), &no_age, &table, &cutoffs()).is_none());

    let no_overall = NormativeTable::new(Vec::new()).expect("empty table");
    assert!(estimate_performance_age(Some(60.0), &male(35), &no_overall, &cutoffs()).is_none());
}

#[test]
fn engine_reports_performance_age_for_scored_assessments() {
    let outcome = engine().score(&bare_assessment(male(35), full_measurements()));
    let estimate = outcome.performance_age.expect("estimate");
    // overall 70.5 sits closest to the 30-39 median of 68
    assert_eq!(estimate.matched_age_min, 30);
    assert_eq!(estimate.interpretation, AgeInterpretation::Average);
}
