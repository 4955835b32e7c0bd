//! Old age living allowance self-assessment: declaration model, means-test
//! engine, intake validation, storage seam, reports, and HTTP routes.
//!
//! [`EligibilityEngine`] is pure and holds nothing but its threshold table,
//! so one instance can be shared across request handlers.

pub mod domain;
pub mod evaluation;
pub(crate) mod intake;
pub mod legacy;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DeclarationGroup, DeclaredItem, FundStatus, HouseholdDeclaration, HouseholdType,
    ItemCategory, ItemKind, Member, PersonDeclaration,
};
pub use evaluation::{
    aggregate_person, evaluate_item, EligibilityEngine, EvaluationResult, Exemption, LineItem,
    PersonAssessment, Shortfall, ThresholdPair, ThresholdTable,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use legacy::{household_from_legacy, household_from_legacy_str, LegacyImportError};
pub use report::{render_csv, render_summary, write_csv, HolderNames, ReportError};
pub use repository::{
    AssessmentId, AssessmentQuery, AssessmentRecord, AssessmentRepository, AssessmentSubmission,
    AssessmentSummaryView, RepositoryError,
};
pub use router::assessment_router;
pub use service::{AssessmentDetail, AssessmentService, AssessmentServiceError};
