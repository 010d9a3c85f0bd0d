use super::common::*;
use crate::assessment::domain::{
    BalanceInput, ClientProfile, Gender, Measurements, SquatCompensations, StepTestInput,
    TestKind,
};
use crate::assessment::scoring::{
    raw_metric, score_balance, score_push_up, score_squat_compensations, score_squat_legacy,
    score_step_test, score_test, score_toe_touch, step_test_recovery_index, ScoringConfig,
};

fn flags(knee_valgus: bool, forward_lean: bool, heel_lift: bool, pain: bool) -> SquatCompensations {
    SquatCompensations {
        knee_valgus,
        forward_lean,
        heel_lift,
        pain,
    }
}

#[test]
fn clean_squat_scores_the_scale_maximum() {
    let config = ScoringConfig::default();
    let score =
        score_squat_compensations(&flags(false, false, false, false), &config.overhead_squat);
    assert_eq!(score, 3);
}

#[test]
fn each_single_compensation_costs_one_step() {
    let config = ScoringConfig::default().overhead_squat;
    for single in [
        flags(true, false, false, false),
        flags(false, true, false, false),
        flags(false, false, true, false),
    ] {
        assert_eq!(score_squat_compensations(&single, &config), 2);
    }
}

#[test]
fn squat_score_never_increases_as_compensations_accumulate() {
    let config = ScoringConfig::default().overhead_squat;
    let mut previous = u8::MAX;
    for combination in [
        flags(false, false, false, false),
        flags(true, false, false, false),
        flags(true, true, false, false),
        flags(true, true, true, false),
    ] {
        let score = score_squat_compensations(&combination, &config);
        assert!(score <= previous, "{combination:?} scored {score} above {previous}");
        assert!(score >= config.compensation_floor);
        previous = score;
    }
}

#[test]
fn pain_forces_the_minimum_regardless_of_other_flags() {
    let config = ScoringConfig::default().overhead_squat;
    assert_eq!(score_squat_compensations(&flags(false, false, false, true), &config), 0);
    assert_eq!(score_squat_compensations(&flags(true, true, true, true), &config), 0);
}

#[test]
fn legacy_quality_is_clamped_into_the_scale() {
    let config = ScoringConfig::default().overhead_squat;
    assert_eq!(score_squat_legacy(7, &config), 3);
    assert_eq!(score_squat_legacy(-2, &config), 0);
    assert_eq!(score_squat_legacy(2, &config), 2);
}

#[test]
fn push_up_bands_use_inclusive_lower_bounds() {
    let config = ScoringConfig::default();
    let client = male(35);
    assert_eq!(score_push_up(Some(0), &client, &config), Some(1));
    assert_eq!(score_push_up(Some(19), &client, &config), Some(2));
    assert_eq!(score_push_up(Some(20), &client, &config), Some(3));
    assert_eq!(score_push_up(Some(25), &client, &config), Some(3));
    assert_eq!(score_push_up(Some(40), &client, &config), Some(5));
}

#[test]
fn push_up_thresholds_depend_on_gender() {
    let config = ScoringConfig::default();
    assert_eq!(score_push_up(Some(25), &male(35), &config), Some(3));
    assert_eq!(score_push_up(Some(25), &female(35), &config), Some(4));
}

#[test]
fn unknown_age_scores_against_the_default_age_band() {
    let config = ScoringConfig::default();
    let younger = male(25);
    let unknown_age = ClientProfile {
        gender: Some(Gender::Male),
        age: None,
    };
    assert_eq!(score_push_up(Some(31), &younger, &config), Some(3));
    assert_eq!(score_push_up(Some(31), &unknown_age, &config), Some(4));
}

#[test]
fn unknown_gender_scores_against_pooled_thresholds() {
    let config = ScoringConfig::default();
    let client = ClientProfile {
        gender: None,
        age: Some(35),
    };
    assert_eq!(score_push_up(Some(25), &client, &config), Some(4));
}

#[test]
fn reach_scores_are_non_decreasing_in_distance() {
    let config = ScoringConfig::default();
    let client = male(35);
    let mut previous = 0;
    for reach in -20..=20 {
        let score = score_toe_touch(Some(f64::from(reach)), &client, &config)
            .expect("reach scored");
        assert!(score >= previous, "reach {reach} scored {score} below {previous}");
        previous = score;
    }
    assert_eq!(score_toe_touch(Some(-12.0), &client, &config), Some(1));
    assert_eq!(score_toe_touch(Some(5.0), &client, &config), Some(5));
}

#[test]
fn balance_blends_eyes_open_and_eyes_closed_sub_scores() {
    let config = ScoringConfig::default().balance;
    let input = BalanceInput {
        left_eyes_open: Some(30.0),
        right_eyes_open: Some(30.0),
        left_eyes_closed: Some(3.0),
        right_eyes_closed: Some(5.0),
    };
    // open 4, closed 2: 0.4 * 4 + 0.6 * 2 = 2.8
    assert_eq!(score_balance(&input, &config), Some(3));
}

#[test]
fn balance_with_one_eyes_state_uses_that_state_alone() {
    let config = ScoringConfig::default().balance;
    let open_only = BalanceInput {
        left_eyes_open: Some(30.0),
        right_eyes_open: Some(30.0),
        ..BalanceInput::default()
    };
    let closed_only = BalanceInput {
        left_eyes_closed: Some(16.0),
        ..BalanceInput::default()
    };
    assert_eq!(score_balance(&open_only, &config), Some(4));
    assert_eq!(score_balance(&closed_only, &config), Some(5));
    assert_eq!(score_balance(&BalanceInput::default(), &config), None);
}

#[test]
fn step_test_index_follows_the_recovery_formula() {
    let input = StepTestInput {
        duration_seconds: Some(300.0),
        recovery_pulses: Some([80, 70, 60]),
    };
    let index = step_test_recovery_index(&input).expect("index");
    approx(index, 100.0 * 300.0 / 420.0);
    assert_eq!(
        score_step_test(&input, &male(35), &ScoringConfig::default()),
        Some(3)
    );
}

#[test]
fn step_test_without_pulses_is_not_scored() {
    let missing = StepTestInput {
        duration_seconds: Some(300.0),
        recovery_pulses: None,
    };
    let zero = StepTestInput {
        duration_seconds: Some(300.0),
        recovery_pulses: Some([0, 0, 0]),
    };
    assert_eq!(step_test_recovery_index(&missing), None);
    assert_eq!(step_test_recovery_index(&zero), None);
}

#[test]
fn missing_measurements_yield_no_score_rather_than_a_default() {
    let config = ScoringConfig::default();
    let empty = Measurements::default();
    for kind in TestKind::ALL {
        assert_eq!(score_test(kind, &empty, &male(35), &config), None, "{kind:?}");
    }
}

#[test]
fn raw_metrics_feed_percentile_ranking() {
    let measurements = full_measurements();
    assert_eq!(raw_metric(TestKind::PushUp, &measurements), Some(25.0));
    assert_eq!(raw_metric(TestKind::SingleLegBalance, &measurements), Some(20.0));
    assert_eq!(raw_metric(TestKind::OverheadSquat, &measurements), None);
}
