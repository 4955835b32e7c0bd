use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::domain::HouseholdDeclaration;
use super::evaluation::{EligibilityEngine, EvaluationResult, ThresholdTable};
use super::intake::{IntakeGuard, IntakeViolation};
use super::report::{render_csv, ReportError};
use super::repository::{
    AssessmentId, AssessmentQuery, AssessmentRecord, AssessmentRepository, AssessmentSubmission,
    AssessmentSummaryView, RepositoryError,
};

/// Service composing intake validation, the means-test engine, and storage.
pub struct AssessmentService<R> {
    guard: Arc<IntakeGuard>,
    repository: Arc<R>,
    engine: Arc<EligibilityEngine>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    AssessmentId(ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Stored record together with a fresh evaluation of its declaration.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentDetail {
    pub record: AssessmentRecord,
    pub evaluation: EvaluationResult,
}

impl<R> AssessmentService<R>
where
    R: AssessmentRepository + 'static,
{
    pub fn new(repository: Arc<R>, thresholds: ThresholdTable) -> Self {
        Self::with_guard(IntakeGuard::default(), repository, thresholds)
    }

    pub fn with_guard(guard: IntakeGuard, repository: Arc<R>, thresholds: ThresholdTable) -> Self {
        Self {
            guard: Arc::new(guard),
            repository,
            engine: Arc::new(EligibilityEngine::new(thresholds)),
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    /// Live evaluation for the wizard; nothing is stored.
    pub fn preview(&self, declaration: &HouseholdDeclaration) -> EvaluationResult {
        let result = self.engine.evaluate(declaration);
        debug!(
            household = result.household_type.label(),
            eligible = result.is_eligible,
            "previewed assessment"
        );
        result
    }

    /// Validate, evaluate and store a submission.
    pub fn submit(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        self.guard.validate(&submission)?;

        let evaluation = self.engine.evaluate(&submission.declaration);
        let record =
            AssessmentRecord::new(next_assessment_id(), Utc::now(), submission, &evaluation);

        let stored = self.repository.insert(record)?;
        info!(
            id = %stored.id,
            eligible = stored.is_eligible,
            household = evaluation.household_type.label(),
            "stored assessment"
        );
        Ok(stored)
    }

    /// Fetch a stored assessment and re-run the engine on its declaration.
    pub fn get(&self, id: AssessmentId) -> Result<AssessmentDetail, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let evaluation = self.engine.evaluate(&record.declaration);

        if evaluation.is_eligible != record.is_eligible {
            info!(
                id = %record.id,
                cached = record.is_eligible,
                current = evaluation.is_eligible,
                "stored verdict differs from current evaluation"
            );
        }

        Ok(AssessmentDetail { record, evaluation })
    }

    pub fn list(
        &self,
        query: &AssessmentQuery,
    ) -> Result<Vec<AssessmentSummaryView>, AssessmentServiceError> {
        let records = self.repository.list(query)?;
        Ok(records.iter().map(AssessmentRecord::summary_view).collect())
    }

    pub fn export_csv(&self, id: AssessmentId) -> Result<String, AssessmentServiceError> {
        let detail = self.get(id)?;
        let csv = render_csv(&detail.evaluation, &detail.record.declaration)?;
        Ok(csv)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
