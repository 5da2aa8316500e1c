//! Branch dialog and edits to persisted companies
//!
//! The dialog drafts one new branch under a company that already exists on
//! the server. Room capacity is edited directly here, unlike the onboarding
//! wizard where it follows the room type.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::notice::Notice;
use crate::application::session::Principal;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validator::{check_text, collides};
use crate::domain::{
    AmenityCatalog, Branch, BranchField, BranchRecord, BranchRequest, BranchUpdate, Company,
    CompanyUpdate, FlowVariant, Issue, IssueKind, LocationField, Mutation, NodeId, RoomField, Step,
    StepValidator, Tree, ValidationContext, BRANCH_ADDRESS_MAX, BRANCH_NAME_MAX,
    COMPANY_NAME_MAX,
};
use crate::infrastructure::traits::{ApiError, CompanyApi};

const COMPANY: usize = 0;

/// Draft of a new branch under a persisted company.
#[derive(Debug, Clone)]
pub struct BranchDialog {
    company_id: String,
    tree: Tree,
    draft: usize,
    catalog: AmenityCatalog,
}

impl BranchDialog {
    const FLOW: FlowVariant = FlowVariant::StandaloneBranch;

    /// Open the dialog for `company`, appending an empty draft branch.
    ///
    /// Refused when the company is not persisted yet or its business type
    /// does not allow another branch.
    pub fn open(company: &Company, catalog: AmenityCatalog) -> ApplicationResult<Self> {
        let company_id = company
            .id
            .persisted()
            .ok_or_else(|| ApplicationError::Refused {
                message: format!("company '{}' has not been saved yet", company.name),
            })?
            .to_string();
        let base = Tree::from_companies([company.clone()]);
        let Mutation { tree, refusal } = base.add_branch(COMPANY);
        if let Some(refusal) = refusal {
            return Err(ApplicationError::Refused {
                message: Notice::from(refusal).message,
            });
        }
        let draft = tree.branch_count(COMPANY) - 1;
        debug!("open branch dialog for {} (draft index {})", company_id, draft);
        Ok(Self {
            company_id,
            tree,
            draft,
            catalog,
        })
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn draft(&self) -> &Branch {
        // The dialog never removes its company or branches, so the index stays valid.
        &self.tree.companies()[COMPANY].branches[self.draft]
    }

    fn apply(&mut self, mutation: Mutation) -> bool {
        self.tree = mutation.tree;
        mutation.refusal.is_none()
    }

    pub fn update_branch(&mut self, field: BranchField) -> bool {
        let m = self.tree.update_branch(COMPANY, self.draft, field);
        self.apply(m)
    }

    pub fn add_location(&mut self) -> bool {
        let m = self.tree.add_location(COMPANY, self.draft);
        self.apply(m)
    }

    pub fn update_location(&mut self, li: usize, field: LocationField) -> bool {
        let m = self.tree.update_location(COMPANY, self.draft, li, field);
        self.apply(m)
    }

    pub fn remove_location(&mut self, li: usize) -> bool {
        let m = self.tree.remove_location(COMPANY, self.draft, li);
        self.apply(m)
    }

    pub fn add_room(&mut self, li: usize) -> bool {
        let m = self.tree.add_room(COMPANY, self.draft, li);
        self.apply(m)
    }

    pub fn update_room(&mut self, li: usize, ri: usize, field: RoomField) -> bool {
        let m = self.tree.update_room(COMPANY, self.draft, li, ri, field, Self::FLOW);
        self.apply(m)
    }

    pub fn remove_room(&mut self, li: usize, ri: usize) -> bool {
        let m = self.tree.remove_room(COMPANY, self.draft, li, ri);
        self.apply(m)
    }

    pub fn toggle_amenity(&mut self, li: usize, ri: usize, amenity: &str) -> bool {
        let m = self
            .tree
            .toggle_amenity(COMPANY, self.draft, li, ri, amenity, &self.catalog);
        self.apply(m)
    }

    /// Issues on the draft branch and its subtree.
    ///
    /// Existing branches only matter as the uniqueness scope for the name.
    pub fn issues(&self) -> Vec<Issue> {
        let ctx = ValidationContext::new(&self.tree, None, Self::FLOW);
        [Step::Branch, Step::Location, Step::Room]
            .into_iter()
            .flat_map(|step| StepValidator::issues(step, &ctx))
            .filter(|i| i.path.and_then(|p| p.branch) == Some(self.draft))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    pub fn to_request(&self) -> BranchRequest {
        BranchRequest::from(self.draft())
    }
}

/// Service for the branch dialog and individual edits of persisted nodes.
pub struct BranchService {
    api: Arc<dyn CompanyApi>,
    principal: Principal,
}

impl BranchService {
    pub fn new(api: Arc<dyn CompanyApi>, principal: Principal) -> Self {
        Self { api, principal }
    }

    /// Create the drafted branch on the server.
    #[instrument(level = "debug", skip(self, dialog), fields(company = dialog.company_id()))]
    pub fn create(&self, dialog: &BranchDialog) -> ApplicationResult<BranchRecord> {
        self.principal.require_write()?;
        let issues = dialog.issues();
        if !issues.is_empty() {
            return Err(ApplicationError::Invalid {
                field: "branch".to_string(),
                message: Notice::from_issues(&issues).message,
            });
        }
        let record = self
            .api
            .create_branch(dialog.company_id(), &dialog.to_request())
            .map_err(remote)?;
        info!("created branch {} under {}", record.id, dialog.company_id());
        Ok(record)
    }

    /// Rename a persisted company; returns the renamed snapshot.
    pub fn rename_company(&self, company: &Company, name: &str) -> ApplicationResult<Company> {
        self.principal.require_write()?;
        require_text("company name", name, COMPANY_NAME_MAX)?;
        let id = persisted_id(&company.id, "company")?;
        self.api
            .update_company(id, &CompanyUpdate {
                name: name.to_string(),
            })
            .map_err(remote)?;
        info!("renamed company {}", id);
        Ok(Company {
            name: name.to_string(),
            ..company.clone()
        })
    }

    /// Rename branch `bi` of a persisted company.
    ///
    /// The new name must not collide with any other branch of the company.
    pub fn rename_branch(&self, company: &Company, bi: usize, name: &str) -> ApplicationResult<Company> {
        self.principal.require_write()?;
        require_text("branch name", name, BRANCH_NAME_MAX)?;
        let branch = company_branch(company, bi)?;
        let others = company
            .branches
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != bi)
            .map(|(_, b)| b.name.as_str());
        if collides(name, others) {
            return Err(ApplicationError::Invalid {
                field: "branch name".to_string(),
                message: format!("a branch named '{}' already exists", name.trim()),
            });
        }
        let id = persisted_id(&branch.id, "branch")?;
        let update = BranchUpdate {
            name: Some(name.to_string()),
            address: None,
        };
        self.api.update_branch(id, &update).map_err(remote)?;
        Ok(replace_branch(company, bi, BranchField::Name(name.to_string())))
    }

    pub fn update_branch_address(&self, company: &Company, bi: usize, address: &str) -> ApplicationResult<Company> {
        self.principal.require_write()?;
        require_text("address", address, BRANCH_ADDRESS_MAX)?;
        let branch = company_branch(company, bi)?;
        let id = persisted_id(&branch.id, "branch")?;
        let update = BranchUpdate {
            name: None,
            address: Some(address.to_string()),
        };
        self.api.update_branch(id, &update).map_err(remote)?;
        Ok(replace_branch(company, bi, BranchField::Address(address.to_string())))
    }
}

fn remote(e: ApiError) -> ApplicationError {
    ApplicationError::Remote {
        message: e
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Request failed. Please try again.".to_string()),
    }
}

fn require_text(field: &str, value: &str, max: usize) -> ApplicationResult<()> {
    match check_text(value, max) {
        None => Ok(()),
        Some(IssueKind::TooLong { max }) => Err(ApplicationError::Invalid {
            field: field.to_string(),
            message: format!("must be at most {} characters", max),
        }),
        Some(_) => Err(ApplicationError::Invalid {
            field: field.to_string(),
            message: "is required".to_string(),
        }),
    }
}

fn persisted_id<'a>(id: &'a NodeId, what: &str) -> ApplicationResult<&'a str> {
    id.persisted().ok_or_else(|| ApplicationError::Refused {
        message: format!("{} has not been saved yet", what),
    })
}

fn company_branch(company: &Company, bi: usize) -> ApplicationResult<&Branch> {
    company
        .branches
        .get(bi)
        .map(|b| b.as_ref())
        .ok_or_else(|| ApplicationError::Refused {
            message: format!("company '{}' has no branch {}", company.name, bi + 1),
        })
}

fn replace_branch(company: &Company, bi: usize, field: BranchField) -> Company {
    let tree = Tree::from_companies([company.clone()]);
    let updated = tree.update_branch(COMPANY, bi, field).tree;
    updated
        .company(COMPANY)
        .cloned()
        .unwrap_or_else(|| company.clone())
}
