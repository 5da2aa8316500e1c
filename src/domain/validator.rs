//! Step gates and field-level issues.
//!
//! Each wizard step owns one predicate over the current snapshot. The
//! predicates are built from the same issue lists the UI uses for inline
//! errors, so a step passes exactly when none of its issues remain.

use std::fmt;

use itertools::Itertools;

use crate::domain::entities::{
    normalize_key, Branch, BusinessType, Company, FlowVariant, Location, Room,
    BRANCH_ADDRESS_MAX, BRANCH_NAME_MAX, COMPANY_NAME_MAX, LOCATION_NAME_MAX, ROOM_NUMBER_MAX,
};
use crate::domain::tree::{NodePath, Tree};

/// Linear wizard steps, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    BusinessType = 1,
    Company = 2,
    Branch = 3,
    Location = 4,
    Room = 5,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::BusinessType,
        Step::Company,
        Step::Branch,
        Step::Location,
        Step::Room,
    ];

    pub const FIRST: Step = Step::BusinessType;
    pub const LAST: Step = Step::Room;

    pub fn number(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Step> {
        Step::ALL.get(self.number()).copied()
    }

    pub fn previous(self) -> Option<Step> {
        self.number().checked_sub(2).map(|i| Step::ALL[i])
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::BusinessType => "Business type",
            Step::Company => "Company details",
            Step::Branch => "Branches",
            Step::Location => "Locations",
            Step::Room => "Rooms",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

/// Field an issue is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BusinessType,
    CompanyName,
    Branches,
    BranchName,
    BranchAddress,
    Locations,
    LocationName,
    Rooms,
    RoomNumber,
    Capacity,
    Amenities,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::BusinessType => "business type",
            Field::CompanyName => "company name",
            Field::Branches => "branches",
            Field::BranchName => "branch name",
            Field::BranchAddress => "address",
            Field::Locations => "locations",
            Field::LocationName => "location name",
            Field::Rooms => "rooms",
            Field::RoomNumber => "room number",
            Field::Capacity => "capacity",
            Field::Amenities => "amenities",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    BusinessTypeMissing,
    Required,
    TooLong { max: usize },
    Duplicate,
    NonPositiveCapacity,
    NoAmenities,
    MissingChildren,
    BranchCount { expected: usize, found: usize },
}

/// A single validation problem, addressed by path and field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Issue {
    pub path: Option<NodePath>,
    pub field: Field,
    pub kind: IssueKind,
}

impl Issue {
    fn at(path: NodePath, field: Field, kind: IssueKind) -> Self {
        Self {
            path: Some(path),
            field,
            kind,
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            IssueKind::BusinessTypeMissing => "Please choose a business type".to_string(),
            IssueKind::Required => format!("{} is required", capitalize(&self.field.to_string())),
            IssueKind::TooLong { max } => format!(
                "{} must be at most {} characters",
                capitalize(&self.field.to_string()),
                max
            ),
            IssueKind::Duplicate => format!("{} already exists", capitalize(&self.field.to_string())),
            IssueKind::NonPositiveCapacity => "Capacity must be greater than 0".to_string(),
            IssueKind::NoAmenities => "Select at least one amenity".to_string(),
            IssueKind::MissingChildren => format!("Add at least one entry to {}", self.field),
            IssueKind::BranchCount { expected, found } => format!(
                "Exactly {} branch allowed for this business type, found {}",
                expected, found
            ),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path, self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything a step predicate looks at, passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub tree: &'a Tree,
    pub business_type: Option<BusinessType>,
    pub flow: FlowVariant,
}

impl<'a> ValidationContext<'a> {
    pub fn new(tree: &'a Tree, business_type: Option<BusinessType>, flow: FlowVariant) -> Self {
        Self {
            tree,
            business_type,
            flow,
        }
    }
}

/// Length/required check for a text field.
pub fn check_text(value: &str, max: usize) -> Option<IssueKind> {
    if value.trim().is_empty() {
        Some(IssueKind::Required)
    } else if value.chars().count() > max {
        Some(IssueKind::TooLong { max })
    } else {
        None
    }
}

/// Indices of siblings whose key collides with another sibling.
///
/// Keys are compared trimmed and lowercased; blank keys never count as
/// duplicates since they are already reported as missing.
pub fn duplicate_indices<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    let keys: Vec<String> = keys.into_iter().map(normalize_key).collect();
    let counts = keys.iter().filter(|k| !k.is_empty()).counts();
    keys.iter()
        .positions(|k| counts.get(k).is_some_and(|&n| n > 1))
        .collect()
}

/// Whether `candidate` collides with any of `others` (trimmed, case-insensitive).
pub fn collides<'a>(candidate: &str, others: impl IntoIterator<Item = &'a str>) -> bool {
    let key = normalize_key(candidate);
    !key.is_empty() && others.into_iter().any(|o| normalize_key(o) == key)
}

/// Per-step predicates.
pub struct StepValidator;

impl StepValidator {
    /// True when the step has no blocking issue.
    pub fn passes(step: Step, ctx: &ValidationContext<'_>) -> bool {
        Self::issues(step, ctx).is_empty()
    }

    /// All issues blocking the given step.
    pub fn issues(step: Step, ctx: &ValidationContext<'_>) -> Vec<Issue> {
        match step {
            Step::BusinessType => business_type_issues(ctx),
            Step::Company => company_issues(ctx.tree),
            Step::Branch => branch_issues(ctx.tree),
            Step::Location => location_issues(ctx.tree),
            Step::Room => room_issues(ctx.tree, ctx.flow),
        }
    }

    /// Issues of every step up to and including `step`.
    pub fn issues_through(step: Step, ctx: &ValidationContext<'_>) -> Vec<Issue> {
        Step::ALL
            .into_iter()
            .take_while(|s| *s <= step)
            .flat_map(|s| Self::issues(s, ctx))
            .collect()
    }

    /// Field-level issues on every level, regardless of the current step.
    ///
    /// This is what inline errors render while the user types; duplicate
    /// names show up here before any step gate is evaluated.
    pub fn field_issues(ctx: &ValidationContext<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (ci, company) in ctx.tree.companies().iter().enumerate() {
            if let Some(kind) = check_text(&company.name, COMPANY_NAME_MAX) {
                issues.push(Issue::at(NodePath::company(ci), Field::CompanyName, kind));
            }
            branch_field_issues(ci, company, &mut issues);
            for (bi, branch) in company.branches.iter().enumerate() {
                location_field_issues(ci, bi, branch, &mut issues);
                for (li, location) in branch.locations.iter().enumerate() {
                    room_field_issues(NodePath::location(ci, bi, li), location, ctx.flow, &mut issues);
                }
            }
        }
        issues
    }

    /// Issues attached to one node's fields (not its children).
    pub fn issues_at(path: NodePath, ctx: &ValidationContext<'_>) -> Vec<Issue> {
        Self::field_issues(ctx)
            .into_iter()
            .filter(|i| i.path == Some(path))
            .collect()
    }
}

fn business_type_issues(ctx: &ValidationContext<'_>) -> Vec<Issue> {
    match ctx.business_type {
        Some(_) => Vec::new(),
        None => vec![Issue {
            path: None,
            field: Field::BusinessType,
            kind: IssueKind::BusinessTypeMissing,
        }],
    }
}

fn company_issues(tree: &Tree) -> Vec<Issue> {
    tree.companies()
        .iter()
        .enumerate()
        .filter_map(|(ci, c)| {
            check_text(&c.name, COMPANY_NAME_MAX)
                .map(|kind| Issue::at(NodePath::company(ci), Field::CompanyName, kind))
        })
        .collect()
}

fn branch_issues(tree: &Tree) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (ci, company) in tree.companies().iter().enumerate() {
        let path = NodePath::company(ci);
        if company.branches.is_empty() {
            issues.push(Issue::at(path, Field::Branches, IssueKind::MissingChildren));
        } else if let Some(limit) = company.business_type.branch_limit() {
            if company.branches.len() != limit {
                issues.push(Issue::at(
                    path,
                    Field::Branches,
                    IssueKind::BranchCount {
                        expected: limit,
                        found: company.branches.len(),
                    },
                ));
            }
        }
        branch_field_issues(ci, company, &mut issues);
    }
    issues
}

fn location_issues(tree: &Tree) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (ci, company) in tree.companies().iter().enumerate() {
        for (bi, branch) in company.branches.iter().enumerate() {
            if branch.locations.is_empty() {
                issues.push(Issue::at(
                    NodePath::branch(ci, bi),
                    Field::Locations,
                    IssueKind::MissingChildren,
                ));
            }
            location_field_issues(ci, bi, branch, &mut issues);
        }
    }
    issues
}

fn room_issues(tree: &Tree, flow: FlowVariant) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (ci, company) in tree.companies().iter().enumerate() {
        for (bi, branch) in company.branches.iter().enumerate() {
            for (li, location) in branch.locations.iter().enumerate() {
                let path = NodePath::location(ci, bi, li);
                if location.rooms.is_empty() {
                    issues.push(Issue::at(path, Field::Rooms, IssueKind::MissingChildren));
                }
                room_field_issues(path, location, flow, &mut issues);
            }
        }
    }
    issues
}

fn branch_field_issues(ci: usize, company: &Company, issues: &mut Vec<Issue>) {
    let duplicates = duplicate_indices(company.branches.iter().map(|b| b.name.as_str()));
    for (bi, branch) in company.branches.iter().enumerate() {
        let path = NodePath::branch(ci, bi);
        issues.extend(branch_node_issues(path, branch, duplicates.contains(&bi)));
    }
}

/// Field issues of a single branch; `duplicate` is decided by the caller.
fn branch_node_issues(path: NodePath, branch: &Branch, duplicate: bool) -> Vec<Issue> {
    let mut issues = Vec::new();
    if let Some(kind) = check_text(&branch.name, BRANCH_NAME_MAX) {
        issues.push(Issue::at(path, Field::BranchName, kind));
    } else if duplicate {
        issues.push(Issue::at(path, Field::BranchName, IssueKind::Duplicate));
    }
    if let Some(kind) = check_text(&branch.address, BRANCH_ADDRESS_MAX) {
        issues.push(Issue::at(path, Field::BranchAddress, kind));
    }
    issues
}

fn location_field_issues(ci: usize, bi: usize, branch: &Branch, issues: &mut Vec<Issue>) {
    let duplicates = duplicate_indices(branch.locations.iter().map(|l| l.name.as_str()));
    for (li, location) in branch.locations.iter().enumerate() {
        let path = NodePath::location(ci, bi, li);
        if let Some(kind) = check_text(&location.name, LOCATION_NAME_MAX) {
            issues.push(Issue::at(path, Field::LocationName, kind));
        } else if duplicates.contains(&li) {
            issues.push(Issue::at(path, Field::LocationName, IssueKind::Duplicate));
        }
    }
}

fn room_field_issues(
    location_path: NodePath,
    location: &Location,
    flow: FlowVariant,
    issues: &mut Vec<Issue>,
) {
    let duplicates = duplicate_indices(location.rooms.iter().map(|r| r.room_number.as_str()));
    for (ri, room) in location.rooms.iter().enumerate() {
        let path = NodePath {
            room: Some(ri),
            ..location_path
        };
        issues.extend(room_node_issues(path, room, duplicates.contains(&ri), flow));
    }
}

fn room_node_issues(path: NodePath, room: &Room, duplicate: bool, flow: FlowVariant) -> Vec<Issue> {
    let mut issues = Vec::new();
    if let Some(kind) = check_text(&room.room_number, ROOM_NUMBER_MAX) {
        issues.push(Issue::at(path, Field::RoomNumber, kind));
    } else if duplicate {
        issues.push(Issue::at(path, Field::RoomNumber, IssueKind::Duplicate));
    }
    if room.capacity == 0 {
        issues.push(Issue::at(path, Field::Capacity, IssueKind::NonPositiveCapacity));
    }
    if flow.requires_amenities() && room.amenities.is_empty() {
        issues.push(Issue::at(path, Field::Amenities, IssueKind::NoAmenities));
    }
    issues
}
