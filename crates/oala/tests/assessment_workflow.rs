//! End-to-end behavior of the self-assessment workflow through the public service facade and
//! HTTP router: preview, submission, listing, and stored-record re-evaluation.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use oala::assessment::evaluation::subtype;
    use oala::assessment::{
        AssessmentId, AssessmentQuery, AssessmentRecord, AssessmentRepository,
        AssessmentService, AssessmentSubmission, DeclaredItem, FundStatus, HouseholdDeclaration,
        ItemCategory, PersonDeclaration, RepositoryError, ThresholdTable,
    };

    pub(super) fn household() -> HouseholdDeclaration {
        let primary = PersonDeclaration::new(71)
            .named("Leung Chi Keung")
            .with_phone("92345678")
            .with_item(DeclaredItem::new(ItemCategory::BankDeposit, 210_000.0))
            .with_item(
                DeclaredItem::new(ItemCategory::Property, 4_200_000.0)
                    .with_subtype(subtype::SELF_OCCUPIED),
            )
            .with_item(
                DeclaredItem::new(ItemCategory::RetirementFund, 180_000.0)
                    .with_subtype(subtype::PROVIDENT_FUND)
                    .with_status(FundStatus::Retained),
            )
            .with_item(DeclaredItem::new(ItemCategory::PensionIncome, 6_500.0));
        let spouse = PersonDeclaration::new(64)
            .named("Ng Mei Fong")
            .with_phone("63456789")
            .with_item(
                DeclaredItem::new(ItemCategory::RetirementFund, 220_000.0)
                    .with_subtype(subtype::MANDATORY_CONTRIBUTION),
            )
            .with_item(
                DeclaredItem::new(ItemCategory::InsurancePolicy, 150_000.0)
                    .with_subtype(subtype::SAVINGS),
            )
            .with_item(DeclaredItem::new(ItemCategory::WorkIncome, 5_000.0));

        HouseholdDeclaration::couple(primary, spouse)
    }

    pub(super) fn submission(email: &str) -> AssessmentSubmission {
        AssessmentSubmission {
            user_email: email.to_string(),
            declaration: household(),
        }
    }

    pub(super) fn service() -> Arc<AssessmentService<InMemoryRepository>> {
        Arc::new(AssessmentService::new(
            Arc::new(InMemoryRepository::default()),
            ThresholdTable::program_year_2025(),
        ))
    }

    #[derive(Default)]
    pub(super) struct InMemoryRepository {
        records: Mutex<HashMap<AssessmentId, AssessmentRecord>>,
    }

    impl AssessmentRepository for InMemoryRepository {
        fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            if guard.contains_key(&record.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.id, record.clone());
            Ok(record)
        }

        fn fetch(&self, id: AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("repository mutex poisoned")
                .get(&id)
                .cloned())
        }

        fn list(
            &self,
            query: &AssessmentQuery,
        ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(query.apply(guard.values()))
        }
    }
}

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use oala::assessment::{assessment_router, AssessmentQuery, EligibilityEngine, Member};
use serde_json::Value;
use tower::ServiceExt;

#[test]
fn couple_household_is_assessed_against_couple_limits() {
    let result = EligibilityEngine::default().evaluate(&common::household());

    // bank 210000 + spouse mandatory 220000 (exempt below 65) + savings policy 150000
    assert_eq!(result.countable_asset_total, 360_000.0);
    assert_eq!(result.countable_income_total, 11_500.0);
    assert_eq!(result.asset_limit, 616_000.0);
    assert_eq!(result.income_limit, 16_440.0);
    assert!(result.is_eligible);
    assert_eq!(result.items_for(Member::Spouse).count(), 3);
}

#[test]
fn submitted_assessment_can_be_listed_and_exported() {
    let service = common::service();
    let record = service
        .submit(common::submission("worker@example.com"))
        .expect("submission stored");

    assert_eq!(record.secondary_name.as_deref(), Some("Ng Mei Fong"));

    let listed = service
        .list(&AssessmentQuery {
            user_email: Some("worker@example.com".to_string()),
            search: Some("9234".to_string()),
            ..AssessmentQuery::default()
        })
        .expect("listing");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record.id);

    let csv = service.export_csv(record.id).expect("csv export");
    // seven line items, header, two totals and the verdict
    assert_eq!(csv.lines().count(), 11);
    assert!(csv.contains("Ng Mei Fong"));
}

#[tokio::test]
async fn router_previews_and_stores_assessments() {
    let app = assessment_router(common::service());
    let declaration = serde_json::to_string(&common::household()).expect("serialize");

    let preview = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/assessments/evaluate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(declaration))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(preview.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(preview.into_body(), 64 * 1024)
        .await
        .expect("body");
    let preview: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(preview["household_type"], "couple");
    assert_eq!(preview["is_eligible"], true);

    let submission =
        serde_json::to_string(&common::submission("worker@example.com")).expect("serialize");
    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/assessments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(submission))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::CREATED);

    let listed = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/assessments?user_email=worker%40example.com")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let bytes = axum::body::to_bytes(listed.into_body(), 64 * 1024)
        .await
        .expect("body");
    let listed: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["primary_name"], "Leung Chi Keung");
}
