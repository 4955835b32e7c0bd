use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::domain::{
    DeclaredItem, FundStatus, HouseholdDeclaration, ItemCategory, PersonDeclaration,
};
use crate::assessment::evaluation::{subtype, EligibilityEngine, ThresholdTable};
use crate::assessment::repository::{
    AssessmentId, AssessmentQuery, AssessmentRecord, AssessmentRepository, AssessmentSubmission,
    RepositoryError,
};
use crate::assessment::{assessment_router, AssessmentService};

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(ThresholdTable::program_year_2025())
}

pub(super) fn bank_deposit(amount: f64) -> DeclaredItem {
    DeclaredItem::new(ItemCategory::BankDeposit, amount)
}

pub(super) fn property(kind: &str, amount: f64) -> DeclaredItem {
    DeclaredItem::new(ItemCategory::Property, amount).with_subtype(kind)
}

pub(super) fn retirement(kind: &str, amount: f64) -> DeclaredItem {
    DeclaredItem::new(ItemCategory::RetirementFund, amount).with_subtype(kind)
}

pub(super) fn provident_fund(status: FundStatus, amount: f64) -> DeclaredItem {
    retirement(subtype::PROVIDENT_FUND, amount).with_status(status)
}

pub(super) fn policy(kind: &str, amount: f64) -> DeclaredItem {
    DeclaredItem::new(ItemCategory::InsurancePolicy, amount).with_subtype(kind)
}

pub(super) fn income(category: ItemCategory, amount: f64) -> DeclaredItem {
    DeclaredItem::new(category, amount)
}

pub(super) fn applicant(age: u32) -> PersonDeclaration {
    PersonDeclaration::new(age)
        .named("Chan Tai Man")
        .with_phone("91234567")
}

pub(super) fn spouse(age: u32) -> PersonDeclaration {
    PersonDeclaration::new(age)
        .named("Wong Siu Ling")
        .with_phone("98765432")
}

/// Couple with assets and income on both sides plus a few exempt items.
pub(super) fn mixed_couple() -> HouseholdDeclaration {
    let primary = applicant(70)
        .with_item(income(ItemCategory::WorkIncome, 4_000.0))
        .with_item(bank_deposit(120_000.0))
        .with_item(property(subtype::SELF_OCCUPIED, 3_500_000.0))
        .with_item(retirement(subtype::MANDATORY_CONTRIBUTION, 80_000.0))
        .with_item(policy("medical", 40_000.0));
    let spouse = spouse(63)
        .with_item(retirement(subtype::MANDATORY_CONTRIBUTION, 90_000.0))
        .with_item(DeclaredItem::new(ItemCategory::Stock, 60_000.0))
        .with_item(income(ItemCategory::PropertyReverseMortgageIncome, 9_000.0))
        .with_item(income(ItemCategory::PensionIncome, 3_000.0));
    HouseholdDeclaration::couple(primary, spouse)
}

pub(super) fn submission() -> AssessmentSubmission {
    AssessmentSubmission {
        user_email: "agent@example.com".to_string(),
        declaration: HouseholdDeclaration::single(
            applicant(72).with_item(bank_deposit(300_000.0)),
        ),
    }
}

pub(super) fn submission_for(name: &str, phone: &str, email: &str) -> AssessmentSubmission {
    AssessmentSubmission {
        user_email: email.to_string(),
        declaration: HouseholdDeclaration::single(
            PersonDeclaration::new(68)
                .named(name)
                .with_phone(phone)
                .with_item(bank_deposit(50_000.0)),
        ),
    }
}

pub(super) fn build_service() -> (AssessmentService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(repository.clone(), ThresholdTable::program_year_2025());
    (service, repository)
}

pub(super) fn router_with_service(service: AssessmentService<MemoryRepository>) -> axum::Router {
    assessment_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl MemoryRepository {
    pub(super) fn overwrite(&self, record: AssessmentRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id, record);
    }
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self, query: &AssessmentQuery) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(query.apply(guard.values()))
    }
}

pub(super) struct ConflictRepository;

impl AssessmentRepository for ConflictRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _query: &AssessmentQuery) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _query: &AssessmentQuery) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}
