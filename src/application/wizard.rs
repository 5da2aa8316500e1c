//! Onboarding wizard: a linear step machine over the company tree.
//!
//! ```text
//! 1 BusinessType -> 2 Company -> 3 Branch -> 4 Location -> 5 Room -> submit
//! ```
//!
//! `next` is guarded by the current step's predicate, `previous` never
//! validates, and submission needs every step to pass.

use tracing::{debug, info};

use crate::application::notice::Notice;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    AmenityCatalog, BranchField, BusinessType, CompanyField, CompanyRequest, FlowVariant, Issue,
    LocationField, Mutation, NodePath, RoomField, Step, StepValidator, Tree, ValidationContext,
};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Moved(Step),
    Rejected(Notice),
    /// Nothing to do, e.g. `previous` on the first step.
    Stayed,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    business_type: Option<BusinessType>,
    flow: FlowVariant,
    catalog: AmenityCatalog,
    tree: Tree,
    submitting: bool,
}

impl Wizard {
    pub fn new(flow: FlowVariant, catalog: AmenityCatalog) -> Self {
        Self {
            step: Step::FIRST,
            business_type: None,
            flow,
            catalog,
            tree: Tree::new(),
            submitting: false,
        }
    }

    /// Wizard over an already populated tree, e.g. a loaded draft.
    ///
    /// A capacity-deriving flow resets room capacities to the type table.
    pub fn with_tree(
        flow: FlowVariant,
        catalog: AmenityCatalog,
        business_type: BusinessType,
        tree: Tree,
    ) -> Self {
        let tree = if flow.derives_capacity() {
            tree.with_derived_capacities()
        } else {
            tree
        };
        Self {
            business_type: Some(business_type),
            tree,
            ..Self::new(flow, catalog)
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn business_type(&self) -> Option<BusinessType> {
        self.business_type
    }

    pub fn flow(&self) -> FlowVariant {
        self.flow
    }

    pub fn catalog(&self) -> &AmenityCatalog {
        &self.catalog
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.tree, self.business_type, self.flow)
    }

    // ============================================================
    // Validation
    // ============================================================

    /// Issues blocking the current step.
    pub fn step_issues(&self) -> Vec<Issue> {
        StepValidator::issues(self.step, &self.context())
    }

    pub fn step_passes(&self, step: Step) -> bool {
        StepValidator::passes(step, &self.context())
    }

    /// Inline field errors for the whole tree, independent of the step gate.
    pub fn field_issues(&self) -> Vec<Issue> {
        StepValidator::field_issues(&self.context())
    }

    pub fn issues_at(&self, path: NodePath) -> Vec<Issue> {
        StepValidator::issues_at(path, &self.context())
    }

    // ============================================================
    // Navigation
    // ============================================================

    pub fn next(&mut self) -> Transition {
        let issues = self.step_issues();
        if !issues.is_empty() {
            debug!("next: step {} rejected with {} issues", self.step, issues.len());
            return Transition::Rejected(Notice::from_issues(&issues));
        }
        match self.step.next() {
            Some(step) => {
                debug!("next: {} -> {}", self.step, step);
                self.step = step;
                Transition::Moved(step)
            }
            None => Transition::Rejected(Notice::info("All steps are complete, submit to create the company")),
        }
    }

    pub fn previous(&mut self) -> Transition {
        match self.step.previous() {
            Some(step) => {
                debug!("previous: {} -> {}", self.step, step);
                self.step = step;
                Transition::Moved(step)
            }
            None => Transition::Stayed,
        }
    }

    // ============================================================
    // Submission
    // ============================================================

    /// Payload for the create call, if the wizard is ready to submit.
    pub fn prepare_submission(&self) -> ApplicationResult<Vec<CompanyRequest>> {
        if self.step != Step::LAST {
            return Err(ApplicationError::StepIncomplete {
                step: self.step,
                message: format!("submission is only possible at step {}", Step::LAST),
            });
        }
        let ctx = self.context();
        if let Some(step) = Step::ALL.into_iter().find(|s| !StepValidator::passes(*s, &ctx)) {
            let issues = StepValidator::issues(step, &ctx);
            return Err(ApplicationError::StepIncomplete {
                step,
                message: Notice::from_issues(&issues).message,
            });
        }
        Ok(self.tree.to_requests())
    }

    /// Lock the wizard for an outgoing submission and hand out the payload.
    pub fn begin_submit(&mut self) -> ApplicationResult<Vec<CompanyRequest>> {
        if self.submitting {
            return Err(ApplicationError::SubmissionInFlight);
        }
        let payload = self.prepare_submission()?;
        self.submitting = true;
        Ok(payload)
    }

    /// Release the submission lock. On success the persisted tree replaces
    /// the working copy; on failure the working copy is kept as is.
    pub fn finish_submit(&mut self, persisted: Option<Tree>) {
        self.submitting = false;
        if let Some(tree) = persisted {
            info!("submission accepted, adopting {} persisted companies", tree.company_count());
            self.tree.adopt(tree);
        }
    }

    // ============================================================
    // Mutations
    // ============================================================

    fn apply(&mut self, mutation: Mutation) -> Option<Notice> {
        self.tree = mutation.tree;
        mutation
            .refusal
            .filter(|r| r.is_user_facing())
            .map(Notice::from)
    }

    /// Choose (or re-choose) the business type.
    ///
    /// The first choice seeds one company. Choosing a different type later
    /// discards the tree built so far, since branch limits depend on it.
    pub fn choose_business_type(&mut self, business_type: BusinessType) -> Option<Notice> {
        if self.business_type == Some(business_type) && !self.tree.is_empty() {
            return None;
        }
        let reset = self.business_type.is_some() && !self.tree.is_empty();
        self.business_type = Some(business_type);
        self.tree = Tree::seeded(business_type);
        if reset {
            info!("business type changed to {}, tree reset", business_type);
            Some(Notice::info(format!(
                "Business type changed to {}; company details were reset",
                business_type
            )))
        } else {
            None
        }
    }

    pub fn add_company(&mut self) -> Option<Notice> {
        match self.business_type {
            Some(bt) => {
                let m = self.tree.add_company(bt);
                self.apply(m)
            }
            None => Some(Notice::warning("Choose a business type first")),
        }
    }

    pub fn update_company(&mut self, ci: usize, field: CompanyField) -> Option<Notice> {
        let m = self.tree.update_company(ci, field);
        self.apply(m)
    }

    pub fn remove_company(&mut self, ci: usize) -> Option<Notice> {
        let m = self.tree.remove_company(ci);
        self.apply(m)
    }

    pub fn add_branch(&mut self, ci: usize) -> Option<Notice> {
        let m = self.tree.add_branch(ci);
        self.apply(m)
    }

    pub fn update_branch(&mut self, ci: usize, bi: usize, field: BranchField) -> Option<Notice> {
        let m = self.tree.update_branch(ci, bi, field);
        self.apply(m)
    }

    pub fn remove_branch(&mut self, ci: usize, bi: usize) -> Option<Notice> {
        let m = self.tree.remove_branch(ci, bi);
        self.apply(m)
    }

    pub fn add_location(&mut self, ci: usize, bi: usize) -> Option<Notice> {
        let m = self.tree.add_location(ci, bi);
        self.apply(m)
    }

    pub fn update_location(&mut self, ci: usize, bi: usize, li: usize, field: LocationField) -> Option<Notice> {
        let m = self.tree.update_location(ci, bi, li, field);
        self.apply(m)
    }

    pub fn remove_location(&mut self, ci: usize, bi: usize, li: usize) -> Option<Notice> {
        let m = self.tree.remove_location(ci, bi, li);
        self.apply(m)
    }

    pub fn add_room(&mut self, ci: usize, bi: usize, li: usize) -> Option<Notice> {
        let m = self.tree.add_room(ci, bi, li);
        self.apply(m)
    }

    pub fn update_room(&mut self, ci: usize, bi: usize, li: usize, ri: usize, field: RoomField) -> Option<Notice> {
        let m = self.tree.update_room(ci, bi, li, ri, field, self.flow);
        self.apply(m)
    }

    pub fn remove_room(&mut self, ci: usize, bi: usize, li: usize, ri: usize) -> Option<Notice> {
        let m = self.tree.remove_room(ci, bi, li, ri);
        self.apply(m)
    }

    pub fn toggle_amenity(&mut self, ci: usize, bi: usize, li: usize, ri: usize, amenity: &str) -> Option<Notice> {
        let m = self.tree.toggle_amenity(ci, bi, li, ri, amenity, &self.catalog);
        self.apply(m)
    }
}
