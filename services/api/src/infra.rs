use fitscore::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRepository, ClientId, Gender, NormativeTable,
    QuestionBank, RepositoryError, ScoringConfig, ScoringEngine,
};
use fitscore::config::ReferenceDataConfig;
use fitscore::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type RecordMap = HashMap<AssessmentId, AssessmentRecord>;

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<RecordMap>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.assessment.id) {
            guard.insert(record.assessment.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn for_client(&self, client_id: &ClientId) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|record| &record.assessment.client_id == client_id)
            .cloned()
            .collect())
    }
}

impl InMemoryAssessmentRepository {
    fn lock(&self) -> Result<MutexGuard<'_, RecordMap>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

/// Build the scoring engine from the configured reference data, falling back
/// to the built-in normative table, question bank and weights.
pub(crate) fn load_engine(reference: &ReferenceDataConfig) -> Result<ScoringEngine, AppError> {
    let norms = match &reference.norms_csv {
        Some(path) => {
            let table = NormativeTable::from_path(path)?;
            info!(
                path = %path.display(),
                records = table.records().len(),
                "normative table loaded"
            );
            table
        }
        None => NormativeTable::standard(),
    };

    let questions = match &reference.question_bank {
        Some(path) => {
            let bank = QuestionBank::from_path(path)?;
            info!(
                path = %path.display(),
                questions = bank.questions().len(),
                "question bank loaded"
            );
            bank
        }
        None => QuestionBank::standard(),
    };

    let config = match &reference.scoring_config {
        Some(path) => {
            let config = ScoringConfig::from_json_reader(BufReader::new(File::open(path)?))?;
            info!(path = %path.display(), "scoring config loaded");
            config
        }
        None => ScoringConfig::default(),
    };

    Ok(ScoringEngine::new(config, Arc::new(norms), Arc::new(questions)))
}

pub(crate) fn parse_gender(raw: &str) -> Result<Gender, String> {
    Gender::parse(raw).ok_or_else(|| format!("'{raw}' is not one of male, female or average"))
}
