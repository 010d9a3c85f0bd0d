use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::super::domain::Gender;
use super::{Breakpoints, NormativeRecord, NormsError, Provenance};

/// Parse `identifier,gender,age_min,age_max,p10,p25,p50,p75,p90,source,year` rows.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<NormativeRecord>, NormsError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<NormativeRow>().enumerate() {
        let row = row?;
        // header is line 1
        let line = index + 2;
        let gender = Gender::parse(&row.gender).ok_or_else(|| NormsError::UnknownGender {
            row: line,
            value: row.gender.clone(),
        })?;

        records.push(NormativeRecord {
            identifier: row.identifier,
            gender,
            age_min: row.age_min,
            age_max: row.age_max,
            breakpoints: Breakpoints {
                p10: row.p10,
                p25: row.p25,
                p50: row.p50,
                p75: row.p75,
                p90: row.p90,
            },
            provenance: Provenance {
                source: row.source.unwrap_or_else(|| "unspecified".to_string()),
                year: row.year,
            },
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct NormativeRow {
    identifier: String,
    gender: String,
    age_min: u8,
    age_max: u8,
    p10: f64,
    p25: f64,
    p50: f64,
    p75: f64,
    p90: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
    #[serde(default)]
    year: Option<u16>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// `Push Up`, `push-up` and `push_up` all address the same identifier.
pub(crate) fn normalize_identifier(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
