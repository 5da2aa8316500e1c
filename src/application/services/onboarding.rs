//! Onboarding service
//!
//! Loads drafts into a wizard, walks the step gates and submits the
//! finished tree to the persistence API.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::error::REMOTE_FALLBACK_MESSAGE;
use crate::application::session::Principal;
use crate::application::wizard::{Transition, Wizard};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    common_business_type, parse_requests, AmenityCatalog, CompanyRecord, FlowVariant, Issue, Step,
    Tree,
};
use crate::infrastructure::traits::{CompanyApi, FileSystem};

/// Result of evaluating one step gate during a replay.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: Step,
    pub issues: Vec<Issue>,
}

impl StepReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Service driving the company onboarding wizard.
pub struct OnboardingService {
    fs: Arc<dyn FileSystem>,
    api: Arc<dyn CompanyApi>,
    principal: Principal,
}

impl OnboardingService {
    pub fn new(fs: Arc<dyn FileSystem>, api: Arc<dyn CompanyApi>, principal: Principal) -> Self {
        Self { fs, api, principal }
    }

    /// Load a draft (a JSON create-request body) into a wizard at step 1.
    #[instrument(level = "debug", skip(self, catalog))]
    pub fn load_draft(
        &self,
        path: &Path,
        flow: FlowVariant,
        catalog: AmenityCatalog,
    ) -> ApplicationResult<Wizard> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read draft", path)?;
        let requests = parse_requests(&content)?;
        let business_type = common_business_type(&requests)?;
        let tree = Tree::from_requests(requests)?;
        debug!(
            "load_draft: {} companies, {} rooms, type {}",
            tree.company_count(),
            tree.total_rooms(),
            business_type
        );
        Ok(Wizard::with_tree(flow, catalog, business_type, tree))
    }

    /// Advance the wizard as far as the step gates allow.
    ///
    /// Returns one report per evaluated step; the walk stops at the first
    /// rejected step, which stays current.
    pub fn replay(&self, wizard: &mut Wizard) -> Vec<StepReport> {
        let mut reports = Vec::new();
        loop {
            let step = wizard.step();
            let issues = wizard.step_issues();
            let passed = issues.is_empty();
            reports.push(StepReport { step, issues });
            if !passed || step == Step::LAST {
                break;
            }
            match wizard.next() {
                Transition::Moved(_) => continue,
                Transition::Rejected(_) | Transition::Stayed => break,
            }
        }
        reports
    }

    /// Submit the finished tree.
    ///
    /// On success the wizard adopts the persisted tree. On failure the
    /// working copy is untouched so the user can fix it and resubmit.
    #[instrument(level = "debug", skip(self, wizard))]
    pub fn submit(&self, wizard: &mut Wizard) -> ApplicationResult<Vec<CompanyRecord>> {
        self.principal.require_write()?;
        let payload = wizard.begin_submit()?;
        info!("submitting {} companies for {}", payload.len(), self.principal);

        let result = self.api.create_companies(&payload);
        match result {
            Ok(records) => {
                wizard.finish_submit(Some(Tree::from_records(records.clone())));
                Ok(records)
            }
            Err(e) => {
                warn!("submission rejected: {}", e);
                wizard.finish_submit(None);
                Err(ApplicationError::Remote {
                    message: e
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| REMOTE_FALLBACK_MESSAGE.to_string()),
                })
            }
        }
    }
}
