//! Copy-on-write company tree.
//!
//! Every level stores its children behind `Arc`, so cloning a `Tree` is a
//! shallow copy and a mutation only clones the nodes on the path from the
//! root to the node it touches. Untouched siblings stay shared between
//! the old and the new snapshot.

use std::fmt;
use std::sync::Arc;

use crate::domain::entities::{Branch, BusinessType, Company, Location, Room};

/// Index path to a node. Deeper levels are `None` when the path addresses
/// a node higher up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath {
    pub company: usize,
    pub branch: Option<usize>,
    pub location: Option<usize>,
    pub room: Option<usize>,
}

impl NodePath {
    pub fn company(company: usize) -> Self {
        Self {
            company,
            branch: None,
            location: None,
            room: None,
        }
    }

    pub fn branch(company: usize, branch: usize) -> Self {
        Self {
            branch: Some(branch),
            ..Self::company(company)
        }
    }

    pub fn location(company: usize, branch: usize, location: usize) -> Self {
        Self {
            location: Some(location),
            ..Self::branch(company, branch)
        }
    }

    pub fn room(company: usize, branch: usize, location: usize, room: usize) -> Self {
        Self {
            room: Some(room),
            ..Self::location(company, branch, location)
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "company {}", self.company + 1)?;
        if let Some(b) = self.branch {
            write!(f, " / branch {}", b + 1)?;
        }
        if let Some(l) = self.location {
            write!(f, " / location {}", l + 1)?;
        }
        if let Some(r) = self.room {
            write!(f, " / room {}", r + 1)?;
        }
        Ok(())
    }
}

/// Working copy of one or more company subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub(crate) companies: Vec<Arc<Company>>,
}

impl Tree {
    /// Empty tree, before a business type is chosen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree holding one freshly seeded company.
    pub fn seeded(business_type: BusinessType) -> Self {
        Self {
            companies: vec![Arc::new(Company::seeded(business_type))],
        }
    }

    pub fn from_companies(companies: impl IntoIterator<Item = Company>) -> Self {
        Self {
            companies: companies.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn companies(&self) -> &[Arc<Company>] {
        &self.companies
    }

    pub fn company_count(&self) -> usize {
        self.companies.len()
    }

    pub fn company(&self, ci: usize) -> Option<&Company> {
        self.companies.get(ci).map(Arc::as_ref)
    }

    pub fn branch(&self, ci: usize, bi: usize) -> Option<&Branch> {
        self.company(ci)?.branches.get(bi).map(Arc::as_ref)
    }

    pub fn location(&self, ci: usize, bi: usize, li: usize) -> Option<&Location> {
        self.branch(ci, bi)?.locations.get(li).map(Arc::as_ref)
    }

    pub fn room(&self, ci: usize, bi: usize, li: usize, ri: usize) -> Option<&Room> {
        self.location(ci, bi, li)?.rooms.get(ri).map(Arc::as_ref)
    }

    pub fn branch_count(&self, ci: usize) -> usize {
        self.company(ci).map_or(0, |c| c.branches.len())
    }

    pub fn location_count(&self, ci: usize, bi: usize) -> usize {
        self.branch(ci, bi).map_or(0, |b| b.locations.len())
    }

    pub fn room_count(&self, ci: usize, bi: usize, li: usize) -> usize {
        self.location(ci, bi, li).map_or(0, |l| l.rooms.len())
    }

    /// Total number of rooms across every company.
    pub fn total_rooms(&self) -> usize {
        self.companies
            .iter()
            .flat_map(|c| c.branches.iter())
            .flat_map(|b| b.locations.iter())
            .map(|l| l.rooms.len())
            .sum()
    }

    /// Replace this working copy with the persisted version echoed by the server.
    pub fn adopt(&mut self, persisted: Tree) {
        *self = persisted;
    }

    pub(crate) fn company_mut(&mut self, ci: usize) -> Option<&mut Company> {
        self.companies.get_mut(ci).map(Arc::make_mut)
    }

    pub(crate) fn branch_mut(&mut self, ci: usize, bi: usize) -> Option<&mut Branch> {
        // Check existence before make_mut so a bad index clones nothing.
        self.branch(ci, bi)?;
        self.company_mut(ci)?.branches.get_mut(bi).map(Arc::make_mut)
    }

    pub(crate) fn location_mut(&mut self, ci: usize, bi: usize, li: usize) -> Option<&mut Location> {
        self.location(ci, bi, li)?;
        self.branch_mut(ci, bi)?
            .locations
            .get_mut(li)
            .map(Arc::make_mut)
    }

    pub(crate) fn room_mut(&mut self, ci: usize, bi: usize, li: usize, ri: usize) -> Option<&mut Room> {
        self.room(ci, bi, li, ri)?;
        self.location_mut(ci, bi, li)?
            .rooms
            .get_mut(ri)
            .map(Arc::make_mut)
    }

    /// Render the tree for terminal output.
    pub fn to_termtree(&self) -> termtree::Tree<String> {
        let mut root = termtree::Tree::new(format!("{} companies", self.companies.len()));
        for company in &self.companies {
            let mut c = termtree::Tree::new(format!(
                "{} [{}] ({})",
                display_name(&company.name),
                company.business_type,
                company.id
            ));
            for branch in &company.branches {
                let mut b = termtree::Tree::new(format!(
                    "{} - {}",
                    display_name(&branch.name),
                    display_name(&branch.address)
                ));
                for location in &branch.locations {
                    let mut l = termtree::Tree::new(display_name(&location.name).to_string());
                    for room in &location.rooms {
                        let amenities = if room.amenities.is_empty() {
                            "no amenities".to_string()
                        } else {
                            room.amenities.iter().cloned().collect::<Vec<_>>().join(", ")
                        };
                        l.push(termtree::Tree::new(format!(
                            "{} {} x{} {} ({})",
                            display_name(&room.room_number),
                            room.room_type,
                            room.capacity,
                            room.status,
                            amenities
                        )));
                    }
                    b.push(l);
                }
                c.push(b);
            }
            root.push(c);
        }
        root
    }
}

fn display_name(value: &str) -> &str {
    if value.trim().is_empty() {
        "<unnamed>"
    } else {
        value
    }
}
