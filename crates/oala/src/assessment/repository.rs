use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::HouseholdDeclaration;
use super::evaluation::EvaluationResult;

/// Identifier of a stored assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub u64);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload posted by the wizard when the user saves an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    #[serde(default)]
    pub user_email: String,
    pub declaration: HouseholdDeclaration,
}

/// Stored assessment. The totals and verdict are a cache for listings; the
/// declaration is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub created_at: DateTime<Utc>,
    pub user_email: String,
    pub primary_name: String,
    pub secondary_name: Option<String>,
    pub user_phone: Option<String>,
    pub is_couple: bool,
    pub countable_asset_total: f64,
    pub countable_income_total: f64,
    pub is_eligible: bool,
    pub declaration: HouseholdDeclaration,
}

impl AssessmentRecord {
    pub fn new(
        id: AssessmentId,
        created_at: DateTime<Utc>,
        submission: AssessmentSubmission,
        evaluation: &EvaluationResult,
    ) -> Self {
        let AssessmentSubmission {
            user_email,
            declaration,
        } = submission;

        let primary_name = declaration.primary.name.trim().to_string();
        let secondary_name = declaration
            .assessed_spouse()
            .map(|spouse| spouse.name.trim().to_string())
            .filter(|name| !name.is_empty());
        let user_phone = declaration
            .primary
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(str::to_string);

        Self {
            id,
            created_at,
            user_email,
            primary_name,
            secondary_name,
            user_phone,
            is_couple: declaration.is_couple,
            countable_asset_total: evaluation.countable_asset_total,
            countable_income_total: evaluation.countable_income_total,
            is_eligible: evaluation.is_eligible,
            declaration,
        }
    }

    pub fn summary_view(&self) -> AssessmentSummaryView {
        AssessmentSummaryView {
            id: self.id,
            created_at: self.created_at,
            primary_name: self.primary_name.clone(),
            secondary_name: self.secondary_name.clone(),
            user_phone: self.user_phone.clone(),
            is_couple: self.is_couple,
            countable_asset_total: self.countable_asset_total,
            countable_income_total: self.countable_income_total,
            is_eligible: self.is_eligible,
        }
    }
}

/// Listing row exposed by the search screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummaryView {
    pub id: AssessmentId,
    pub created_at: DateTime<Utc>,
    pub primary_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    pub is_couple: bool,
    pub countable_asset_total: f64,
    pub countable_income_total: f64,
    pub is_eligible: bool,
}

const DEFAULT_PAGE_SIZE: usize = 100;

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Filter and paging for assessment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuery {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for AssessmentQuery {
    fn default() -> Self {
        Self {
            user_email: None,
            search: None,
            skip: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AssessmentQuery {
    /// Exact owner match plus a case-insensitive substring search over the
    /// primary name and phone.
    pub fn matches(&self, record: &AssessmentRecord) -> bool {
        if let Some(email) = self.user_email.as_deref().filter(|email| !email.is_empty()) {
            if record.user_email != email {
                return false;
            }
        }

        match self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            Some(term) => {
                let term = term.to_lowercase();
                record.primary_name.to_lowercase().contains(&term)
                    || record
                        .user_phone
                        .as_deref()
                        .map(|phone| phone.to_lowercase().contains(&term))
                        .unwrap_or(false)
            }
            None => true,
        }
    }

    /// Applies the filter, newest first, then paging.
    pub fn apply<'a, I>(&self, records: I) -> Vec<AssessmentRecord>
    where
        I: IntoIterator<Item = &'a AssessmentRecord>,
    {
        let mut matched: Vec<&AssessmentRecord> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        matched
            .into_iter()
            .skip(self.skip)
            .take(self.limit)
            .cloned()
            .collect()
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn list(&self, query: &AssessmentQuery) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
