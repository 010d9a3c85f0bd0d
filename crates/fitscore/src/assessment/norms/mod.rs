//! Normative reference tables, percentile ranking and performance-age estimation.

mod parser;
mod percentile;
mod performance_age;
mod seed;

pub use percentile::{interpolate_percentile, PercentileEngine, PercentileRank, PercentileResult};
pub use performance_age::{estimate_performance_age, AgeInterpretation, PerformanceAge};

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::Gender;

/// Percentile ranks of the five breakpoints, in order.
pub const BREAKPOINT_PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Scores at the 10th, 25th, 50th, 75th and 90th percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Breakpoints {
    pub fn scores(&self) -> [f64; 5] {
        [self.p10, self.p25, self.p50, self.p75, self.p90]
    }

    pub fn is_ordered(&self) -> bool {
        let scores = self.scores();
        scores.iter().all(|score| score.is_finite())
            && scores.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    #[serde(default)]
    pub year: Option<u16>,
}

/// One reference distribution for an identifier, gender and inclusive age band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormativeRecord {
    pub identifier: String,
    pub gender: Gender,
    pub age_min: u8,
    pub age_max: u8,
    pub breakpoints: Breakpoints,
    pub provenance: Provenance,
}

impl NormativeRecord {
    pub fn covers_age(&self, age: u8) -> bool {
        (self.age_min..=self.age_max).contains(&age)
    }

    pub fn age_midpoint(&self) -> u8 {
        self.age_min + (self.age_max - self.age_min) / 2
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormsError {
    #[error("failed to read normative data: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid normative CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown gender '{value}' on normative row {row}")]
    UnknownGender { row: usize, value: String },
    #[error("breakpoints for '{identifier}' ({gender:?}, {age_min}-{age_max}) decrease")]
    UnorderedBreakpoints {
        identifier: String,
        gender: Gender,
        age_min: u8,
        age_max: u8,
    },
    #[error("age range {age_min}-{age_max} for '{identifier}' is inverted")]
    InvertedAgeRange {
        identifier: String,
        age_min: u8,
        age_max: u8,
    },
}

/// Validated, read-only collection of normative records.
#[derive(Debug, Clone, Default)]
pub struct NormativeTable {
    records: Vec<NormativeRecord>,
}

impl NormativeTable {
    pub fn new(mut records: Vec<NormativeRecord>) -> Result<Self, NormsError> {
        for record in &mut records {
            record.identifier = parser::normalize_identifier(&record.identifier);
            if record.age_min > record.age_max {
                return Err(NormsError::InvertedAgeRange {
                    identifier: record.identifier.clone(),
                    age_min: record.age_min,
                    age_max: record.age_max,
                });
            }
            if !record.breakpoints.is_ordered() {
                return Err(NormsError::UnorderedBreakpoints {
                    identifier: record.identifier.clone(),
                    gender: record.gender,
                    age_min: record.age_min,
                    age_max: record.age_max,
                });
            }
        }
        Ok(Self { records })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, NormsError> {
        let records = parser::parse_records(reader)?;
        let table = Self::new(records)?;
        tracing::debug!(records = table.records.len(), "normative table loaded");
        Ok(table)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, NormsError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Built-in reference cohort for push-ups, farmer's carry, categories and overall.
    pub fn standard() -> Self {
        Self {
            records: seed::standard_records(),
        }
    }

    pub fn records(&self) -> &[NormativeRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve the record for an identifier and age, trying genders in fallback order.
    pub fn find(&self, identifier: &str, gender: Gender, age: u8) -> Option<&NormativeRecord> {
        gender.lookup_chain().iter().find_map(|key| {
            self.records.iter().find(|record| {
                record.identifier == identifier && record.gender == *key && record.covers_age(age)
            })
        })
    }

    /// All age bands for an identifier under the first gender key that has any,
    /// sorted youngest first.
    pub fn age_bands(&self, identifier: &str, gender: Gender) -> Vec<&NormativeRecord> {
        for key in gender.lookup_chain() {
            let mut bands: Vec<&NormativeRecord> = self
                .records
                .iter()
                .filter(|record| record.identifier == identifier && record.gender == *key)
                .collect();
            if !bands.is_empty() {
                bands.sort_by_key(|record| (record.age_min, record.age_max));
                return bands;
            }
        }
        Vec::new()
    }
}
