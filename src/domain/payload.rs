//! Request and response shapes of the persistence API.
//!
//! Flattening maps every tree level 1:1 onto its request object. An empty
//! amenity set goes out as `[""]` because the API rejects empty arrays;
//! re-parsing drops that placeholder again.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Branch, BusinessType, Company, Location, NodeId, Room, RoomStatus, RoomType,
};
use crate::domain::error::DomainError;
use crate::domain::tree::Tree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    #[serde(rename = "type")]
    pub business_type: BusinessType,
    pub name: String,
    pub branches: Vec<BranchRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRequest {
    pub name: String,
    pub address: String,
    pub locations: Vec<LocationRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub name: String,
    pub rooms: Vec<RoomRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub capacity: u32,
    pub amenities: Vec<String>,
}

/// Rename of a persisted company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyUpdate {
    pub name: String,
}

/// Partial update of a persisted branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub business_type: BusinessType,
    pub name: String,
    #[serde(default)]
    pub branches: Vec<BranchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<RoomRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: String,
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub status: RoomStatus,
}

fn outgoing_amenities(amenities: &BTreeSet<String>) -> Vec<String> {
    if amenities.is_empty() {
        vec![String::new()]
    } else {
        amenities.iter().cloned().collect()
    }
}

fn incoming_amenities(amenities: &[String]) -> BTreeSet<String> {
    amenities
        .iter()
        .filter(|a| !a.trim().is_empty())
        .cloned()
        .collect()
}

impl From<&Room> for RoomRequest {
    fn from(room: &Room) -> Self {
        Self {
            room_number: room.room_number.clone(),
            room_type: room.room_type,
            capacity: room.capacity,
            amenities: outgoing_amenities(&room.amenities),
        }
    }
}

impl From<&Location> for LocationRequest {
    fn from(location: &Location) -> Self {
        Self {
            name: location.name.clone(),
            rooms: location.rooms.iter().map(|r| RoomRequest::from(r.as_ref())).collect(),
        }
    }
}

impl From<&Branch> for BranchRequest {
    fn from(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            address: branch.address.clone(),
            locations: branch
                .locations
                .iter()
                .map(|l| LocationRequest::from(l.as_ref()))
                .collect(),
        }
    }
}

impl From<&Company> for CompanyRequest {
    fn from(company: &Company) -> Self {
        Self {
            business_type: company.business_type,
            name: company.name.clone(),
            branches: company
                .branches
                .iter()
                .map(|b| BranchRequest::from(b.as_ref()))
                .collect(),
        }
    }
}

impl RoomRequest {
    fn into_room(self) -> Room {
        Room {
            id: NodeId::local(),
            room_number: self.room_number,
            room_type: self.room_type,
            capacity: self.capacity,
            amenities: incoming_amenities(&self.amenities),
            status: RoomStatus::Vacant,
        }
    }
}

impl LocationRequest {
    fn into_location(self) -> Location {
        Location {
            id: NodeId::local(),
            name: self.name,
            rooms: self.rooms.into_iter().map(|r| Arc::new(r.into_room())).collect(),
        }
    }
}

impl BranchRequest {
    /// Local, unsaved branch subtree built from a request object.
    pub fn into_branch(self) -> Branch {
        Branch {
            id: NodeId::local(),
            name: self.name,
            address: self.address,
            locations: self
                .locations
                .into_iter()
                .map(|l| Arc::new(l.into_location()))
                .collect(),
        }
    }
}

impl CompanyRequest {
    fn into_company(self) -> Result<Company, DomainError> {
        let business_type = self.business_type;
        let mut branches: Vec<Arc<Branch>> = self
            .branches
            .into_iter()
            .map(|b| Arc::new(b.into_branch()))
            .collect();
        if let Some(limit) = business_type.branch_limit() {
            if branches.len() > limit {
                return Err(DomainError::BranchLimitExceeded {
                    company: self.name,
                    business_type: business_type.to_string(),
                    limit,
                    found: branches.len(),
                });
            }
            // A single-site company always carries its one branch.
            if branches.is_empty() {
                branches.push(Arc::new(Branch::empty()));
            }
        }
        Ok(Company {
            id: NodeId::local(),
            name: self.name,
            business_type,
            branches,
        })
    }
}

impl From<RoomRecord> for Room {
    fn from(record: RoomRecord) -> Self {
        Self {
            id: NodeId::Persisted(record.id),
            room_number: record.room_number,
            room_type: record.room_type,
            capacity: record.capacity,
            amenities: incoming_amenities(&record.amenities),
            status: record.status,
        }
    }
}

impl From<LocationRecord> for Location {
    fn from(record: LocationRecord) -> Self {
        Self {
            id: NodeId::Persisted(record.id),
            name: record.name,
            rooms: record.rooms.into_iter().map(|r| Arc::new(r.into())).collect(),
        }
    }
}

impl From<BranchRecord> for Branch {
    fn from(record: BranchRecord) -> Self {
        Self {
            id: NodeId::Persisted(record.id),
            name: record.name,
            address: record.address,
            locations: record.locations.into_iter().map(|l| Arc::new(l.into())).collect(),
        }
    }
}

impl From<CompanyRecord> for Company {
    fn from(record: CompanyRecord) -> Self {
        Self {
            id: NodeId::Persisted(record.id),
            name: record.name,
            business_type: record.business_type,
            branches: record.branches.into_iter().map(|b| Arc::new(b.into())).collect(),
        }
    }
}

impl Tree {
    /// Flatten every company into the create request body.
    pub fn to_requests(&self) -> Vec<CompanyRequest> {
        self.companies()
            .iter()
            .map(|c| CompanyRequest::from(c.as_ref()))
            .collect()
    }

    /// Rebuild an unsaved tree from a request body.
    pub fn from_requests(requests: Vec<CompanyRequest>) -> Result<Self, DomainError> {
        let companies = requests
            .into_iter()
            .map(CompanyRequest::into_company)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tree::from_companies(companies))
    }

    /// Build the persisted tree from the server's echo.
    pub fn from_records(records: Vec<CompanyRecord>) -> Self {
        Tree::from_companies(records.into_iter().map(Company::from))
    }
}

/// Business type shared by every company of a request body.
pub fn common_business_type(requests: &[CompanyRequest]) -> Result<BusinessType, DomainError> {
    let first = requests.first().ok_or(DomainError::EmptyDraft)?.business_type;
    if let Some(other) = requests.iter().find(|r| r.business_type != first) {
        return Err(DomainError::MixedBusinessTypes {
            first: first.to_string(),
            other: other.business_type.to_string(),
        });
    }
    Ok(first)
}

/// Parse a JSON request body.
pub fn parse_requests(json: &str) -> Result<Vec<CompanyRequest>, DomainError> {
    serde_json::from_str(json).map_err(|e| DomainError::InvalidPayload {
        message: e.to_string(),
    })
}
