//! Per-test scorers. Each maps raw measurements to a bounded ordinal score and
//! returns `None` when the measurement was not taken.

use super::super::domain::{
    BalanceInput, ClientProfile, Measurements, SquatCompensations, SquatInput, StepTestInput,
    TestKind,
};
use super::config::{BalanceConfig, MovementQualityConfig, ScoringConfig, ThresholdTable};

pub fn score_overhead_squat(
    input: Option<&SquatInput>,
    config: &MovementQualityConfig,
) -> Option<u8> {
    match input? {
        SquatInput::Compensations(flags) => Some(score_squat_compensations(flags, config)),
        SquatInput::LegacyQuality { quality } => Some(score_squat_legacy(*quality, config)),
    }
}

/// Start at the scale maximum and step down per compensation, never below the
/// floor. Pain drops straight to the scale minimum.
pub fn score_squat_compensations(flags: &SquatCompensations, config: &MovementQualityConfig) -> u8 {
    let scale = config.scale;
    if flags.pain {
        return scale.min;
    }

    let penalty = i64::from(flags.count()) * i64::from(config.penalty_per_compensation);
    let floor = i64::from(config.compensation_floor.clamp(scale.min, scale.max));
    scale.clamp((i64::from(scale.max) - penalty).max(floor))
}

/// Older records captured a single quality grade directly.
pub fn score_squat_legacy(quality: i32, config: &MovementQualityConfig) -> u8 {
    config.scale.clamp(i64::from(quality))
}

fn score_threshold(
    value: Option<f64>,
    table: &ThresholdTable,
    client: &ClientProfile,
    default_age: u8,
) -> Option<u8> {
    let value = value.filter(|value| value.is_finite())?;
    let age = client.age.unwrap_or(default_age);
    table.score(value, client.lookup_gender(), age)
}

pub fn score_push_up(
    reps: Option<u32>,
    client: &ClientProfile,
    config: &ScoringConfig,
) -> Option<u8> {
    score_threshold(
        reps.map(f64::from),
        &config.push_up,
        client,
        config.default_age,
    )
}

pub fn score_farmer_carry(
    seconds: Option<f64>,
    client: &ClientProfile,
    config: &ScoringConfig,
) -> Option<u8> {
    score_threshold(seconds, &config.farmer_carry, client, config.default_age)
}

pub fn score_toe_touch(
    reach_cm: Option<f64>,
    client: &ClientProfile,
    config: &ScoringConfig,
) -> Option<u8> {
    score_threshold(reach_cm, &config.toe_touch, client, config.default_age)
}

pub fn score_shoulder_mobility(
    reach_cm: Option<f64>,
    client: &ClientProfile,
    config: &ScoringConfig,
) -> Option<u8> {
    score_threshold(reach_cm, &config.shoulder_mobility, client, config.default_age)
}

/// Mean of the present left/right durations for each eyes state.
pub fn balance_averages(input: &BalanceInput) -> (Option<f64>, Option<f64>) {
    (
        mean(&[input.left_eyes_open, input.right_eyes_open]),
        mean(&[input.left_eyes_closed, input.right_eyes_closed]),
    )
}

/// Weighted blend of the eyes-open and eyes-closed sub-scores. A missing state
/// defers entirely to the other one.
pub fn score_balance(input: &BalanceInput, config: &BalanceConfig) -> Option<u8> {
    let (open, closed) = balance_averages(input);
    let open = open.map(|seconds| f64::from(config.eyes_open.score(seconds)));
    let closed = closed.map(|seconds| f64::from(config.eyes_closed.score(seconds)));

    let blended = match (open, closed) {
        (Some(open), Some(closed)) => {
            let total = config.eyes_open_weight + config.eyes_closed_weight;
            if total <= 0.0 {
                (open + closed) / 2.0
            } else {
                (open * config.eyes_open_weight + closed * config.eyes_closed_weight) / total
            }
        }
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => return None,
    };

    Some(config.scale.clamp(blended.round() as i64))
}

/// Harvard-style fitness index: `100 * duration / (2 * sum of recovery pulses)`.
pub fn step_test_recovery_index(input: &StepTestInput) -> Option<f64> {
    let duration = input
        .duration_seconds
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)?;
    let pulses = input.recovery_pulses?;
    let pulse_total: u32 = pulses.iter().map(|pulse| u32::from(*pulse)).sum();
    if pulse_total == 0 {
        return None;
    }
    Some(100.0 * duration / (2.0 * f64::from(pulse_total)))
}

pub fn score_step_test(
    input: &StepTestInput,
    client: &ClientProfile,
    config: &ScoringConfig,
) -> Option<u8> {
    score_threshold(
        step_test_recovery_index(input),
        &config.step_test,
        client,
        config.default_age,
    )
}

pub fn score_test(
    kind: TestKind,
    measurements: &Measurements,
    client: &ClientProfile,
    config: &ScoringConfig,
) -> Option<u8> {
    match kind {
        TestKind::OverheadSquat => {
            score_overhead_squat(measurements.overhead_squat.as_ref(), &config.overhead_squat)
        }
        TestKind::PushUp => score_push_up(measurements.push_up_reps, client, config),
        TestKind::FarmerCarry => {
            score_farmer_carry(measurements.farmer_carry_seconds, client, config)
        }
        TestKind::ToeTouch => score_toe_touch(measurements.toe_touch_reach_cm, client, config),
        TestKind::ShoulderMobility => {
            score_shoulder_mobility(measurements.shoulder_reach_cm, client, config)
        }
        TestKind::SingleLegBalance => score_balance(&measurements.balance, &config.balance),
        TestKind::StepTest => score_step_test(&measurements.step_test, client, config),
    }
}

/// The raw quantity each test is ranked on against normative tables. Squat
/// quality has no raw quantity and is not ranked.
pub fn raw_metric(kind: TestKind, measurements: &Measurements) -> Option<f64> {
    match kind {
        TestKind::OverheadSquat => None,
        TestKind::PushUp => measurements.push_up_reps.map(f64::from),
        TestKind::FarmerCarry => measurements.farmer_carry_seconds,
        TestKind::ToeTouch => measurements.toe_touch_reach_cm,
        TestKind::ShoulderMobility => measurements.shoulder_reach_cm,
        TestKind::SingleLegBalance => mean(&measurements.balance.durations()),
        TestKind::StepTest => step_test_recovery_index(&measurements.step_test),
    }
    .filter(|value| value.is_finite())
}

fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|value| value.is_finite())
        .collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}
