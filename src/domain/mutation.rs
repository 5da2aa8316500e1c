//! Index-addressed mutations over the company tree.
//!
//! Every operation borrows the current snapshot and returns a [`Mutation`]
//! holding the next one. Guards never fail loudly: a refused operation
//! returns an unchanged snapshot and names the reason, and the caller
//! decides whether the user hears about it.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::domain::entities::{
    AmenityCatalog, Branch, BusinessType, Company, FlowVariant, Location, Room, RoomStatus,
    RoomType,
};
use crate::domain::tree::Tree;

/// Why a mutation left the tree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// Index path does not address an existing node.
    OutOfRange,
    /// At least one company must exist while the wizard is open.
    LastCompany,
    /// A company keeps at least one branch.
    LastBranch,
    /// The business type caps the number of branches.
    BranchLimitReached { limit: usize },
    /// Capacity follows the room type in this flow.
    CapacityDerived,
    /// Amenity is not part of the catalog.
    UnknownAmenity,
}

impl Refusal {
    /// Whether the caller should surface this refusal as a notice.
    pub fn is_user_facing(self) -> bool {
        matches!(
            self,
            Refusal::LastCompany | Refusal::LastBranch | Refusal::BranchLimitReached { .. }
        )
    }
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::OutOfRange => f.write_str("no such node"),
            Refusal::LastCompany => f.write_str("at least one company is required"),
            Refusal::LastBranch => f.write_str("a company needs at least one branch"),
            Refusal::BranchLimitReached { limit } => write!(
                f,
                "branch limit reached: this business type allows {} branch{}",
                limit,
                if *limit == 1 { "" } else { "es" }
            ),
            Refusal::CapacityDerived => f.write_str("capacity follows the room type"),
            Refusal::UnknownAmenity => f.write_str("amenity is not in the catalog"),
        }
    }
}

/// Result of a mutation: the next snapshot and, if refused, why.
#[derive(Debug, Clone)]
#[must_use]
pub struct Mutation {
    pub tree: Tree,
    pub refusal: Option<Refusal>,
}

impl Mutation {
    fn applied(tree: Tree) -> Self {
        Self {
            tree,
            refusal: None,
        }
    }

    fn refused(tree: &Tree, refusal: Refusal) -> Self {
        trace!("mutation refused: {}", refusal);
        Self {
            tree: tree.clone(),
            refusal: Some(refusal),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.refusal.is_none()
    }
}

/// Editable scalar fields of a company. The business type is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyField {
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchField {
    Name(String),
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationField {
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomField {
    RoomNumber(String),
    Type(RoomType),
    Capacity(u32),
    Status(RoomStatus),
}

impl Tree {
    pub fn add_company(&self, business_type: BusinessType) -> Mutation {
        let mut next = self.clone();
        next.companies.push(Arc::new(Company::seeded(business_type)));
        Mutation::applied(next)
    }

    pub fn update_company(&self, ci: usize, field: CompanyField) -> Mutation {
        let mut next = self.clone();
        let Some(company) = next.company_mut(ci) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        match field {
            CompanyField::Name(name) => company.name = name,
        }
        Mutation::applied(next)
    }

    pub fn remove_company(&self, ci: usize) -> Mutation {
        if ci >= self.companies.len() {
            return Mutation::refused(self, Refusal::OutOfRange);
        }
        if self.companies.len() == 1 {
            return Mutation::refused(self, Refusal::LastCompany);
        }
        let mut next = self.clone();
        next.companies.remove(ci);
        Mutation::applied(next)
    }

    pub fn add_branch(&self, ci: usize) -> Mutation {
        let Some(company) = self.company(ci) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        if let Some(limit) = company.business_type.branch_limit() {
            if company.branches.len() >= limit {
                return Mutation::refused(self, Refusal::BranchLimitReached { limit });
            }
        }
        let mut next = self.clone();
        if let Some(company) = next.company_mut(ci) {
            company.branches.push(Arc::new(Branch::empty()));
        }
        Mutation::applied(next)
    }

    pub fn update_branch(&self, ci: usize, bi: usize, field: BranchField) -> Mutation {
        let mut next = self.clone();
        let Some(branch) = next.branch_mut(ci, bi) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        match field {
            BranchField::Name(name) => branch.name = name,
            BranchField::Address(address) => branch.address = address,
        }
        Mutation::applied(next)
    }

    pub fn remove_branch(&self, ci: usize, bi: usize) -> Mutation {
        let count = self.branch_count(ci);
        if bi >= count {
            return Mutation::refused(self, Refusal::OutOfRange);
        }
        if count == 1 {
            return Mutation::refused(self, Refusal::LastBranch);
        }
        let mut next = self.clone();
        if let Some(company) = next.company_mut(ci) {
            company.branches.remove(bi);
        }
        Mutation::applied(next)
    }

    pub fn add_location(&self, ci: usize, bi: usize) -> Mutation {
        let mut next = self.clone();
        let Some(branch) = next.branch_mut(ci, bi) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        branch.locations.push(Arc::new(Location::empty()));
        Mutation::applied(next)
    }

    pub fn update_location(&self, ci: usize, bi: usize, li: usize, field: LocationField) -> Mutation {
        let mut next = self.clone();
        let Some(location) = next.location_mut(ci, bi, li) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        match field {
            LocationField::Name(name) => location.name = name,
        }
        Mutation::applied(next)
    }

    /// Removes the location together with all of its rooms.
    pub fn remove_location(&self, ci: usize, bi: usize, li: usize) -> Mutation {
        if li >= self.location_count(ci, bi) {
            return Mutation::refused(self, Refusal::OutOfRange);
        }
        let mut next = self.clone();
        if let Some(branch) = next.branch_mut(ci, bi) {
            branch.locations.remove(li);
        }
        Mutation::applied(next)
    }

    pub fn add_room(&self, ci: usize, bi: usize, li: usize) -> Mutation {
        let mut next = self.clone();
        let Some(location) = next.location_mut(ci, bi, li) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        location.rooms.push(Arc::new(Room::empty()));
        Mutation::applied(next)
    }

    /// Sets one room field.
    ///
    /// With a capacity-deriving flow a type change always overwrites the
    /// capacity with the table value, and capacity cannot be set directly.
    pub fn update_room(
        &self,
        ci: usize,
        bi: usize,
        li: usize,
        ri: usize,
        field: RoomField,
        flow: FlowVariant,
    ) -> Mutation {
        if self.room(ci, bi, li, ri).is_none() {
            return Mutation::refused(self, Refusal::OutOfRange);
        }
        if matches!(field, RoomField::Capacity(_)) && flow.derives_capacity() {
            return Mutation::refused(self, Refusal::CapacityDerived);
        }
        let mut next = self.clone();
        let Some(room) = next.room_mut(ci, bi, li, ri) else {
            return Mutation::refused(self, Refusal::OutOfRange);
        };
        match field {
            RoomField::RoomNumber(number) => room.room_number = number,
            RoomField::Type(room_type) => {
                room.room_type = room_type;
                if flow.derives_capacity() {
                    room.capacity = room_type.capacity();
                }
            }
            RoomField::Capacity(capacity) => room.capacity = capacity,
            RoomField::Status(status) => room.status = status,
        }
        Mutation::applied(next)
    }

    /// Copy with every room capacity reset to its type's table value.
    ///
    /// Only rooms whose capacity disagrees with the table are cloned.
    pub fn with_derived_capacities(&self) -> Tree {
        let mut next = self.clone();
        for ci in 0..self.company_count() {
            for bi in 0..self.branch_count(ci) {
                for li in 0..self.location_count(ci, bi) {
                    for ri in 0..self.room_count(ci, bi, li) {
                        let derived = match self.room(ci, bi, li, ri) {
                            Some(r) if r.capacity != r.room_type.capacity() => r.room_type.capacity(),
                            _ => continue,
                        };
                        if let Some(room) = next.room_mut(ci, bi, li, ri) {
                            trace!("room {}/{}/{}/{}: capacity {} -> {}", ci, bi, li, ri, room.capacity, derived);
                            room.capacity = derived;
                        }
                    }
                }
            }
        }
        next
    }

    pub fn remove_room(&self, ci: usize, bi: usize, li: usize, ri: usize) -> Mutation {
        if ri >= self.room_count(ci, bi, li) {
            return Mutation::refused(self, Refusal::OutOfRange);
        }
        let mut next = self.clone();
        if let Some(location) = next.location_mut(ci, bi, li) {
            location.rooms.remove(ri);
        }
        Mutation::applied(next)
    }

    /// Adds the amenity if absent, removes it if present.
    pub fn toggle_amenity(
        &self,
        ci: usize,
        bi: usize,
        li: usize,
        ri: usize,
        amenity: &str,
        catalog: &AmenityCatalog,
    ) -> Mutation {
        if self.room(ci, bi, li, ri).is_none() {
            return Mutation::refused(self, Refusal::OutOfRange);
        }
        if !catalog.contains(amenity) {
            return Mutation::refused(self, Refusal::UnknownAmenity);
        }
        let mut next = self.clone();
        if let Some(room) = next.room_mut(ci, bi, li, ri) {
            if !room.amenities.remove(amenity) {
                room.amenities.insert(amenity.to_string());
            }
        }
        Mutation::applied(next)
    }
}
