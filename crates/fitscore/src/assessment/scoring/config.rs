use std::io::Read;

use serde::{Deserialize, Serialize};

use super::super::domain::{CategoryKind, Gender, QuestionnaireDomain, TestKind};

/// Ordinal range of a test score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: u8,
    pub max: u8,
}

impl ScoreScale {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: i64) -> u8 {
        value.clamp(i64::from(self.min), i64::from(self.max)) as u8
    }

    pub fn contains(&self, value: f64) -> bool {
        value.fract() == 0.0 && value >= f64::from(self.min) && value <= f64::from(self.max)
    }
}

/// Score cut-offs for one gender and inclusive age range.
///
/// `cutoffs[i]` is the inclusive lower bound of score `scale.min + i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub gender: Gender,
    pub age_min: u8,
    pub age_max: u8,
    pub cutoffs: Vec<f64>,
}

impl ThresholdBand {
    pub fn covers(&self, gender: Gender, age: u8) -> bool {
        self.gender == gender && (self.age_min..=self.age_max).contains(&age)
    }
}

/// Gender- and age-conditioned thresholds for a repetition, time or distance test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub scale: ScoreScale,
    pub bands: Vec<ThresholdBand>,
}

impl ThresholdTable {
    pub fn band_for(&self, gender: Gender, age: u8) -> Option<&ThresholdBand> {
        gender
            .lookup_chain()
            .iter()
            .find_map(|key| self.bands.iter().find(|band| band.covers(*key, age)))
    }

    /// Values on a boundary land in the higher band.
    pub fn score(&self, value: f64, gender: Gender, age: u8) -> Option<u8> {
        let band = self.band_for(gender, age)?;
        Some(band_score(self.scale, &band.cutoffs, value))
    }
}

/// Duration thresholds that do not vary with demographics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationBands {
    pub scale: ScoreScale,
    pub cutoffs: Vec<f64>,
}

impl DurationBands {
    pub fn score(&self, seconds: f64) -> u8 {
        band_score(self.scale, &self.cutoffs, seconds)
    }
}

fn band_score(scale: ScoreScale, cutoffs: &[f64], value: f64) -> u8 {
    let reached = cutoffs.iter().filter(|cutoff| value >= **cutoff).count() as i64;
    scale.clamp(i64::from(scale.min) + reached)
}

/// Compensation checklist scoring for movement-quality tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementQualityConfig {
    pub scale: ScoreScale,
    pub penalty_per_compensation: u8,
    /// Lowest score reachable through compensations alone; only pain goes below it.
    pub compensation_floor: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub scale: ScoreScale,
    pub eyes_open: DurationBands,
    pub eyes_closed: DurationBands,
    pub eyes_open_weight: f64,
    pub eyes_closed_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub strength: f64,
    pub mobility: f64,
    pub balance: f64,
    pub cardio: f64,
}

impl CategoryWeights {
    pub fn weight(&self, kind: CategoryKind) -> f64 {
        match kind {
            CategoryKind::Strength => self.strength,
            CategoryKind::Mobility => self.mobility,
            CategoryKind::Balance => self.balance,
            CategoryKind::Cardio => self.cardio,
        }
    }

    fn total(&self) -> f64 {
        self.strength + self.mobility + self.balance + self.cardio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveWeights {
    pub physical: f64,
    pub knowledge: f64,
    pub lifestyle: f64,
    pub readiness: f64,
}

impl ComprehensiveWeights {
    pub fn questionnaire(&self, domain: QuestionnaireDomain) -> f64 {
        match domain {
            QuestionnaireDomain::Knowledge => self.knowledge,
            QuestionnaireDomain::Lifestyle => self.lifestyle,
            QuestionnaireDomain::Readiness => self.readiness,
        }
    }

    fn total(&self) -> f64 {
        self.physical + self.knowledge + self.lifestyle + self.readiness
    }
}

/// Age-difference cut-offs (chronological minus performance age) for interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceAgeCutoffs {
    /// Difference at or above this reads as excellent.
    pub excellent_at: i16,
    pub good_at: i16,
    /// Difference strictly above this (and below `good_at`) reads as average.
    pub average_above: i16,
    pub needs_improvement_above: i16,
}

/// Every weight and threshold the engine consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Age used for threshold lookups when the client's age is unknown.
    pub default_age: u8,
    pub overhead_squat: MovementQualityConfig,
    pub push_up: ThresholdTable,
    pub farmer_carry: ThresholdTable,
    pub toe_touch: ThresholdTable,
    pub shoulder_mobility: ThresholdTable,
    pub balance: BalanceConfig,
    pub step_test: ThresholdTable,
    pub overall_weights: CategoryWeights,
    pub comprehensive_weights: ComprehensiveWeights,
    pub performance_age: PerformanceAgeCutoffs,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("invalid scoring config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{test:?} scale is inverted ({min} > {max})")]
    InvertedScale { test: TestKind, min: u8, max: u8 },
    #[error("{test:?} thresholds must be finite and non-decreasing")]
    UnorderedCutoffs { test: TestKind },
    #[error("{test:?} has a band with age_min above age_max")]
    InvertedAgeBand { test: TestKind },
    #[error("{0} weights must be finite, non-negative and sum to 1.0")]
    Weights(&'static str),
    #[error("performance-age cut-offs must be strictly descending")]
    PerformanceAgeCutoffs,
}

const WEIGHT_TOLERANCE: f64 = 1e-6;

impl ScoringConfig {
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ScoringConfigError> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn scale_for(&self, kind: TestKind) -> ScoreScale {
        match kind {
            TestKind::OverheadSquat => self.overhead_squat.scale,
            TestKind::PushUp => self.push_up.scale,
            TestKind::FarmerCarry => self.farmer_carry.scale,
            TestKind::ToeTouch => self.toe_touch.scale,
            TestKind::ShoulderMobility => self.shoulder_mobility.scale,
            TestKind::SingleLegBalance => self.balance.scale,
            TestKind::StepTest => self.step_test.scale,
        }
    }

    /// Highest attainable raw-score sum for a category; the normalization denominator.
    pub fn category_maximum(&self, kind: CategoryKind) -> u32 {
        kind.members()
            .iter()
            .map(|test| u32::from(self.scale_for(*test).max))
            .sum()
    }

    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for test in TestKind::ALL {
            let scale = self.scale_for(test);
            if scale.min > scale.max {
                return Err(ScoringConfigError::InvertedScale {
                    test,
                    min: scale.min,
                    max: scale.max,
                });
            }
        }

        let tables = [
            (TestKind::PushUp, &self.push_up),
            (TestKind::FarmerCarry, &self.farmer_carry),
            (TestKind::ToeTouch, &self.toe_touch),
            (TestKind::ShoulderMobility, &self.shoulder_mobility),
            (TestKind::StepTest, &self.step_test),
        ];
        for (test, table) in tables {
            for band in &table.bands {
                if band.age_min > band.age_max {
                    return Err(ScoringConfigError::InvertedAgeBand { test });
                }
                if !is_ordered(&band.cutoffs) {
                    return Err(ScoringConfigError::UnorderedCutoffs { test });
                }
            }
        }
        if !is_ordered(&self.balance.eyes_open.cutoffs)
            || !is_ordered(&self.balance.eyes_closed.cutoffs)
        {
            return Err(ScoringConfigError::UnorderedCutoffs {
                test: TestKind::SingleLegBalance,
            });
        }

        let balance_weights = [self.balance.eyes_open_weight, self.balance.eyes_closed_weight];
        if !weights_valid(&balance_weights, balance_weights.iter().sum()) {
            return Err(ScoringConfigError::Weights("balance"));
        }

        let overall = &self.overall_weights;
        let overall_parts = [
            overall.strength,
            overall.mobility,
            overall.balance,
            overall.cardio,
        ];
        if !weights_valid(&overall_parts, overall.total()) {
            return Err(ScoringConfigError::Weights("overall"));
        }

        let blend = &self.comprehensive_weights;
        let blend_parts = [
            blend.physical,
            blend.knowledge,
            blend.lifestyle,
            blend.readiness,
        ];
        if !weights_valid(&blend_parts, blend.total()) {
            return Err(ScoringConfigError::Weights("comprehensive"));
        }

        let age = &self.performance_age;
        if !(age.excellent_at > age.good_at
            && age.good_at > age.average_above
            && age.average_above > age.needs_improvement_above)
        {
            return Err(ScoringConfigError::PerformanceAgeCutoffs);
        }

        Ok(())
    }
}

fn is_ordered(cutoffs: &[f64]) -> bool {
    cutoffs.iter().all(|value| value.is_finite())
        && cutoffs.windows(2).all(|pair| pair[0] <= pair[1])
}

fn weights_valid(parts: &[f64], total: f64) -> bool {
    parts.iter().all(|weight| weight.is_finite() && *weight >= 0.0)
        && (total - 1.0).abs() < WEIGHT_TOLERANCE
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_age: 35,
            overhead_squat: MovementQualityConfig {
                scale: ScoreScale::new(0, 3),
                penalty_per_compensation: 1,
                compensation_floor: 1,
            },
            push_up: ThresholdTable {
                scale: ScoreScale::new(1, 5),
                bands: push_up_bands(),
            },
            farmer_carry: ThresholdTable {
                scale: ScoreScale::new(1, 5),
                bands: vec![
                    all_ages(Gender::Male, &[20.0, 40.0, 60.0, 90.0]),
                    all_ages(Gender::Female, &[15.0, 30.0, 45.0, 70.0]),
                    all_ages(Gender::Average, &[18.0, 35.0, 52.0, 80.0]),
                ],
            },
            toe_touch: ThresholdTable {
                scale: ScoreScale::new(1, 5),
                bands: vec![all_ages(Gender::Average, &[-10.0, -5.0, 0.0, 5.0])],
            },
            shoulder_mobility: ThresholdTable {
                scale: ScoreScale::new(1, 5),
                bands: vec![all_ages(Gender::Average, &[-15.0, -8.0, -3.0, 0.0])],
            },
            balance: BalanceConfig {
                scale: ScoreScale::new(1, 5),
                eyes_open: DurationBands {
                    scale: ScoreScale::new(1, 5),
                    cutoffs: vec![10.0, 20.0, 30.0, 45.0],
                },
                eyes_closed: DurationBands {
                    scale: ScoreScale::new(1, 5),
                    cutoffs: vec![3.0, 6.0, 10.0, 15.0],
                },
                eyes_open_weight: 0.4,
                eyes_closed_weight: 0.6,
            },
            step_test: ThresholdTable {
                scale: ScoreScale::new(1, 5),
                bands: vec![all_ages(Gender::Average, &[55.0, 65.0, 80.0, 90.0])],
            },
            overall_weights: CategoryWeights {
                strength: 0.30,
                mobility: 0.20,
                balance: 0.20,
                cardio: 0.30,
            },
            comprehensive_weights: ComprehensiveWeights {
                physical: 0.60,
                knowledge: 0.15,
                lifestyle: 0.15,
                readiness: 0.10,
            },
            performance_age: PerformanceAgeCutoffs {
                excellent_at: 10,
                good_at: 3,
                average_above: -3,
                needs_improvement_above: -10,
            },
        }
    }
}

fn all_ages(gender: Gender, cutoffs: &[f64]) -> ThresholdBand {
    band(gender, 0, u8::MAX, cutoffs)
}

fn band(gender: Gender, age_min: u8, age_max: u8, cutoffs: &[f64]) -> ThresholdBand {
    ThresholdBand {
        gender,
        age_min,
        age_max,
        cutoffs: cutoffs.to_vec(),
    }
}

fn push_up_bands() -> Vec<ThresholdBand> {
    vec![
        band(Gender::Male, 0, 29, &[12.0, 24.0, 34.0, 44.0]),
        band(Gender::Male, 30, 39, &[10.0, 20.0, 30.0, 40.0]),
        band(Gender::Male, 40, 49, &[8.0, 16.0, 24.0, 32.0]),
        band(Gender::Male, 50, 59, &[6.0, 12.0, 18.0, 26.0]),
        band(Gender::Male, 60, u8::MAX, &[4.0, 10.0, 15.0, 22.0]),
        band(Gender::Female, 0, 29, &[8.0, 16.0, 24.0, 32.0]),
        band(Gender::Female, 30, 39, &[6.0, 13.0, 20.0, 28.0]),
        band(Gender::Female, 40, 49, &[4.0, 10.0, 16.0, 24.0]),
        band(Gender::Female, 50, 59, &[3.0, 8.0, 13.0, 20.0]),
        band(Gender::Female, 60, u8::MAX, &[2.0, 6.0, 10.0, 16.0]),
        band(Gender::Average, 0, 29, &[10.0, 20.0, 29.0, 38.0]),
        band(Gender::Average, 30, 39, &[8.0, 16.0, 25.0, 34.0]),
        band(Gender::Average, 40, 49, &[6.0, 13.0, 20.0, 28.0]),
        band(Gender::Average, 50, 59, &[4.0, 10.0, 15.0, 23.0]),
        band(Gender::Average, 60, u8::MAX, &[3.0, 8.0, 12.0, 19.0]),
    ]
}
