use super::super::domain::Gender;
use super::{Breakpoints, NormativeRecord, Provenance};

const SOURCE: &str = "fitscore reference cohort";
const SOURCE_YEAR: u16 = 2024;

const AGE_BANDS: [(u8, u8); 6] = [(18, 29), (30, 39), (40, 49), (50, 59), (60, 69), (70, 99)];

/// Spread around the median for 0-100 scores: p10, p25, p75, p90 offsets.
const SCORE_SPREAD: [f64; 4] = [-24.0, -12.0, 10.0, 18.0];

/// Multipliers around the median for raw-duration tests.
const DURATION_SPREAD: [f64; 4] = [0.45, 0.7, 1.3, 1.6];

pub(super) fn standard_records() -> Vec<NormativeRecord> {
    let mut records = Vec::new();

    push_gendered(
        &mut records,
        "push_up",
        &[
            [14.0, 20.0, 26.0, 33.0, 40.0],
            [11.0, 16.0, 22.0, 28.0, 34.0],
            [8.0, 12.0, 18.0, 23.0, 28.0],
            [6.0, 9.0, 14.0, 18.0, 23.0],
            [4.0, 7.0, 11.0, 15.0, 19.0],
            [2.0, 4.0, 8.0, 11.0, 14.0],
        ],
        &[
            [7.0, 12.0, 18.0, 24.0, 30.0],
            [5.0, 9.0, 15.0, 20.0, 25.0],
            [3.0, 7.0, 12.0, 16.0, 21.0],
            [2.0, 5.0, 9.0, 13.0, 17.0],
            [1.0, 3.0, 7.0, 10.0, 14.0],
            [0.0, 2.0, 5.0, 8.0, 11.0],
        ],
    );

    push_gendered(
        &mut records,
        "farmer_carry",
        &durations(&[70.0, 65.0, 58.0, 50.0, 40.0, 30.0]),
        &durations(&[50.0, 46.0, 40.0, 34.0, 28.0, 20.0]),
    );

    let score_medians: [(&str, [f64; 6], [f64; 6]); 5] = [
        (
            "strength",
            [72.0, 66.0, 60.0, 52.0, 44.0, 36.0],
            [64.0, 58.0, 52.0, 46.0, 40.0, 32.0],
        ),
        (
            "mobility",
            [62.0, 58.0, 54.0, 50.0, 46.0, 42.0],
            [70.0, 66.0, 62.0, 58.0, 54.0, 50.0],
        ),
        (
            "balance",
            [80.0, 74.0, 66.0, 58.0, 50.0, 42.0],
            [80.0, 74.0, 66.0, 58.0, 50.0, 42.0],
        ),
        (
            "cardio",
            [70.0, 64.0, 58.0, 52.0, 46.0, 40.0],
            [66.0, 60.0, 54.0, 48.0, 42.0, 36.0],
        ),
        (
            "overall",
            [74.0, 68.0, 62.0, 55.0, 48.0, 40.0],
            [70.0, 64.0, 58.0, 52.0, 45.0, 38.0],
        ),
    ];
    for (identifier, male, female) in score_medians {
        push_gendered(&mut records, identifier, &scores(&male), &scores(&female));
    }

    records
}

fn scores(medians: &[f64; 6]) -> [[f64; 5]; 6] {
    (*medians).map(|p50| {
        let [p10, p25, p75, p90] = SCORE_SPREAD.map(|offset| (p50 + offset).clamp(0.0, 100.0));
        [p10, p25, p50, p75, p90]
    })
}

fn durations(medians: &[f64; 6]) -> [[f64; 5]; 6] {
    (*medians).map(|p50| {
        let [p10, p25, p75, p90] = DURATION_SPREAD.map(|factor| (p50 * factor).round());
        [p10, p25, p50, p75, p90]
    })
}

/// Push male and female bands plus the pooled average of the two.
fn push_gendered(
    records: &mut Vec<NormativeRecord>,
    identifier: &str,
    male: &[[f64; 5]; 6],
    female: &[[f64; 5]; 6],
) {
    for (band, (age_min, age_max)) in AGE_BANDS.iter().enumerate() {
        let pooled: [f64; 5] = std::array::from_fn(|i| (male[band][i] + female[band][i]) / 2.0);
        for (gender, values) in [
            (Gender::Male, male[band]),
            (Gender::Female, female[band]),
            (Gender::Average, pooled),
        ] {
            records.push(record(identifier, gender, *age_min, *age_max, values));
        }
    }
}

fn record(
    identifier: &str,
    gender: Gender,
    age_min: u8,
    age_max: u8,
    values: [f64; 5],
) -> NormativeRecord {
    let [p10, p25, p50, p75, p90] = values;
    NormativeRecord {
        identifier: identifier.to_string(),
        gender,
        age_min,
        age_max,
        breakpoints: Breakpoints {
            p10,
            p25,
            p50,
            p75,
            p90,
        },
        provenance: Provenance {
            source: SOURCE.to_string(),
            year: Some(SOURCE_YEAR),
        },
    }
}
