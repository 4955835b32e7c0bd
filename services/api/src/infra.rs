use metrics_exporter_prometheus::PrometheusHandle;
use oala::assessment::{
    AssessmentId, AssessmentQuery, AssessmentRecord, AssessmentRepository, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local assessment store used until a database is wired in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl InMemoryAssessmentRepository {
    fn records(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<AssessmentId, AssessmentRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("assessment store poisoned".to_string()))
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records()?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self, query: &AssessmentQuery) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records()?;
        Ok(query.apply(guard.values()))
    }
}
