//! Tests for OnboardingService: draft loading, replay and submission

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;

use onboard::application::error::REMOTE_FALLBACK_MESSAGE;
use onboard::application::services::OnboardingService;
use onboard::application::{ApplicationError, Principal, Scope, Wizard};
use onboard::domain::{
    AmenityCatalog, BranchField, BranchRecord, BranchRequest, BranchUpdate, CompanyRecord,
    CompanyRequest, CompanyUpdate, DomainError, FlowVariant, Step,
};
use onboard::infrastructure::traits::{ApiError, CompanyApi, DryRunApi, RealFileSystem};

/// API fake that records requests and answers from a scripted outcome.
#[derive(Default)]
struct FakeApi {
    failure: Option<ApiError>,
    received: Mutex<Vec<Vec<CompanyRequest>>>,
}

impl FakeApi {
    fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.received.lock().expect("lock").len()
    }
}

impl CompanyApi for FakeApi {
    fn create_companies(&self, companies: &[CompanyRequest]) -> Result<Vec<CompanyRecord>, ApiError> {
        self.received.lock().expect("lock").push(companies.to_vec());
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => DryRunApi::new().create_companies(companies),
        }
    }

    fn create_branch(&self, _: &str, _: &BranchRequest) -> Result<BranchRecord, ApiError> {
        Err(ApiError::silent())
    }

    fn update_company(&self, _: &str, _: &CompanyUpdate) -> Result<(), ApiError> {
        Ok(())
    }

    fn update_branch(&self, _: &str, _: &BranchUpdate) -> Result<(), ApiError> {
        Ok(())
    }
}

fn write_draft(dir: &TempDir, body: serde_json::Value) -> PathBuf {
    let path = dir.path().join("draft.json");
    std::fs::write(&path, body.to_string()).expect("write draft");
    path
}

fn room(number: &str) -> serde_json::Value {
    json!({"roomNumber": number, "type": "Double", "capacity": 2, "amenities": ["Wi-Fi"]})
}

fn franchise_draft(second_branch: &str) -> serde_json::Value {
    json!([{
        "type": "Franchise",
        "name": "Acme",
        "branches": [
            {"name": "North", "address": "1 Main St",
             "locations": [{"name": "Main", "rooms": [room("101")]}]},
            {"name": second_branch, "address": "2 Main St",
             "locations": [{"name": "Main", "rooms": [room("101")]}]}
        ]
    }])
}

fn service(api: Arc<dyn CompanyApi>, scope: Scope) -> OnboardingService {
    OnboardingService::new(Arc::new(RealFileSystem), api, Principal::new("tester", scope))
}

fn load(service: &OnboardingService, path: &PathBuf) -> Wizard {
    service
        .load_draft(path, FlowVariant::Onboarding, AmenityCatalog::default())
        .expect("load draft")
}

#[test]
fn given_valid_draft_when_replaying_then_reaches_last_step() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);
    let mut wizard = load(&service, &path);

    let reports = service.replay(&mut wizard);

    assert_eq!(reports.len(), Step::ALL.len());
    assert!(reports.iter().all(|r| r.passed()));
    assert_eq!(wizard.step(), Step::LAST);
}

#[test]
fn given_duplicate_branch_draft_when_replaying_then_stops_at_branch_step() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("north "));
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);
    let mut wizard = load(&service, &path);

    let reports = service.replay(&mut wizard);

    let last = reports.last().expect("at least one report");
    assert_eq!(last.step, Step::Branch);
    assert_eq!(last.issues.len(), 2);
    assert_eq!(wizard.step(), Step::Branch);
}

#[test]
fn given_missing_draft_when_loading_then_operation_failed() {
    let temp = TempDir::new().unwrap();
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);

    let err = service
        .load_draft(
            &temp.path().join("nope.json"),
            FlowVariant::Onboarding,
            AmenityCatalog::default(),
        )
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

#[test]
fn given_empty_draft_when_loading_then_domain_error() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, json!([]));
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);

    let err = service
        .load_draft(&path, FlowVariant::Onboarding, AmenityCatalog::default())
        .unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(DomainError::EmptyDraft)));
}

#[test]
fn given_ready_wizard_when_submitting_then_tree_replaced_by_persisted_one() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let api = Arc::new(FakeApi::default());
    let service = service(api.clone(), Scope::Admin);
    let mut wizard = load(&service, &path);
    let _ = service.replay(&mut wizard);

    let records = service.submit(&mut wizard).expect("submit");

    assert_eq!(api.calls(), 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].branches.len(), 2);
    let company = wizard.tree().company(0).expect("company");
    assert_eq!(company.id.persisted(), Some(records[0].id.as_str()));
    assert!(!wizard.is_submitting());
}

#[test]
fn given_server_message_when_submission_fails_then_message_surfaced_and_tree_kept() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let service = service(
        Arc::new(FakeApi::failing(ApiError::new("Company name already taken"))),
        Scope::Admin,
    );
    let mut wizard = load(&service, &path);
    let _ = service.replay(&mut wizard);
    let before = wizard.tree().clone();

    let err = service.submit(&mut wizard).unwrap_err();

    match err {
        ApplicationError::Remote { message } => assert_eq!(message, "Company name already taken"),
        other => panic!("expected remote error, got {:?}", other),
    }
    assert_eq!(wizard.tree(), &before);
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.step(), Step::LAST);
}

#[test]
fn given_silent_failure_when_submitting_then_fallback_message() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let service = service(Arc::new(FakeApi::failing(ApiError::silent())), Scope::Admin);
    let mut wizard = load(&service, &path);
    let _ = service.replay(&mut wizard);

    let err = service.submit(&mut wizard).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Remote { ref message } if message == REMOTE_FALLBACK_MESSAGE
    ));
}

#[test]
fn given_failed_submission_when_fixed_and_resubmitted_then_accepted() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let failing = service(Arc::new(FakeApi::failing(ApiError::silent())), Scope::Admin);
    let working = service(Arc::new(FakeApi::default()), Scope::Admin);
    let mut wizard = load(&failing, &path);
    let _ = failing.replay(&mut wizard);

    assert!(failing.submit(&mut wizard).is_err());
    let _ = wizard.update_branch(0, 1, BranchField::Name("South Wing".into()));

    assert!(working.submit(&mut wizard).is_ok());
}

#[test]
fn given_viewer_when_submitting_then_forbidden_without_calling_api() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let api = Arc::new(FakeApi::default());
    let service = service(api.clone(), Scope::Viewer);
    let mut wizard = load(&service, &path);
    let _ = service.replay(&mut wizard);

    let err = service.submit(&mut wizard).unwrap_err();

    assert!(matches!(err, ApplicationError::Forbidden { .. }));
    assert_eq!(api.calls(), 0);
}

#[test]
fn given_submission_in_flight_when_submitting_again_then_refused() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let api = Arc::new(FakeApi::default());
    let service = service(api.clone(), Scope::Admin);
    let mut wizard = load(&service, &path);
    let _ = service.replay(&mut wizard);
    let _payload = wizard.begin_submit().expect("lock");

    let err = service.submit(&mut wizard).unwrap_err();

    assert!(matches!(err, ApplicationError::SubmissionInFlight));
    assert_eq!(api.calls(), 0);
}

#[test]
fn given_wizard_before_last_step_when_submitting_then_step_incomplete() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, franchise_draft("South"));
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);
    let mut wizard = load(&service, &path);

    let err = service.submit(&mut wizard).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::StepIncomplete { step: Step::BusinessType, .. }
    ));
}

fn mismatched_capacity_draft() -> serde_json::Value {
    json!([{
        "type": "Franchise",
        "name": "Acme",
        "branches": [{"name": "North", "address": "1 Main St", "locations": [{"name": "Main", "rooms": [
            {"roomNumber": "1", "type": "Single", "capacity": 7, "amenities": ["Wi-Fi"]}
        ]}]}]
    }])
}

#[test]
fn given_draft_with_mismatched_capacity_when_loaded_for_onboarding_then_payload_uses_type_capacity() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, mismatched_capacity_draft());
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);
    let mut wizard = load(&service, &path);

    let _ = service.replay(&mut wizard);
    let payload = wizard.prepare_submission().expect("ready to submit");

    assert_eq!(wizard.tree().room(0, 0, 0, 0).map(|r| r.capacity), Some(1));
    assert_eq!(payload[0].branches[0].locations[0].rooms[0].capacity, 1);
}

#[test]
fn given_draft_with_custom_capacity_when_loaded_for_standalone_branch_then_capacity_kept() {
    let temp = TempDir::new().unwrap();
    let path = write_draft(&temp, mismatched_capacity_draft());
    let service = service(Arc::new(FakeApi::default()), Scope::Admin);

    let wizard = service
        .load_draft(&path, FlowVariant::StandaloneBranch, AmenityCatalog::default())
        .expect("load draft");

    assert_eq!(wizard.tree().room(0, 0, 0, 0).map(|r| r.capacity), Some(7));
}
