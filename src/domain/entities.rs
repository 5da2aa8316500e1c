//! Domain entities: the Company → Branch → Location → Room tree nodes

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Maximum length of a company name.
pub const COMPANY_NAME_MAX: usize = 50;
/// Maximum length of a branch name.
pub const BRANCH_NAME_MAX: usize = 50;
/// Maximum length of a branch address.
pub const BRANCH_ADDRESS_MAX: usize = 100;
/// Maximum length of a location name.
pub const LOCATION_NAME_MAX: usize = 50;
/// Maximum length of a room number.
pub const ROOM_NUMBER_MAX: usize = 10;

/// Identifier of a tree node.
///
/// Nodes added in the wizard get a local id; the server replaces it with
/// its own once the subtree is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    Local(Uuid),
    Persisted(String),
}

impl NodeId {
    pub fn local() -> Self {
        NodeId::Local(Uuid::new_v4())
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, NodeId::Persisted(_))
    }

    /// Server id, if the node has been persisted.
    pub fn persisted(&self) -> Option<&str> {
        match self {
            NodeId::Persisted(id) => Some(id),
            NodeId::Local(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Local(uuid) => write!(f, "local:{}", uuid),
            NodeId::Persisted(id) => write!(f, "{}", id),
        }
    }
}

/// Organizational classification chosen once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessType {
    Single,
    Franchise,
    Multiple,
}

impl BusinessType {
    pub const ALL: [BusinessType; 3] = [
        BusinessType::Single,
        BusinessType::Franchise,
        BusinessType::Multiple,
    ];

    /// Branch cardinality limit, if any.
    pub fn branch_limit(self) -> Option<usize> {
        match self {
            BusinessType::Single => Some(1),
            BusinessType::Franchise | BusinessType::Multiple => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BusinessType::Single => "Single",
            BusinessType::Franchise => "Franchise",
            BusinessType::Multiple => "Multiple",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusinessType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownBusinessType(s.to_string()))
    }
}

/// Room category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Double,
    Twin,
    Triple,
    Quad,
    Quintuple,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::Single,
        RoomType::Double,
        RoomType::Twin,
        RoomType::Triple,
        RoomType::Quad,
        RoomType::Quintuple,
    ];

    /// Fixed type → capacity lookup used by the onboarding flow.
    pub fn capacity(self) -> u32 {
        match self {
            RoomType::Single => 1,
            RoomType::Double | RoomType::Twin => 2,
            RoomType::Triple => 3,
            RoomType::Quad => 4,
            RoomType::Quintuple => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Twin => "Twin",
            RoomType::Triple => "Triple",
            RoomType::Quad => "Quad",
            RoomType::Quintuple => "Quintuple",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownRoomType(s.to_string()))
    }
}

/// Occupancy state of a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomStatus {
    #[default]
    Vacant,
    Occupied,
    Maintenance,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomStatus::Vacant => "Vacant",
            RoomStatus::Occupied => "Occupied",
            RoomStatus::Maintenance => "Maintenance",
        };
        f.write_str(s)
    }
}

/// Which wizard/dialog variant is editing the tree.
///
/// The two variants differ in how room capacity behaves and whether
/// amenities are mandatory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowVariant {
    /// Company onboarding wizard: capacity derived from room type, amenities required.
    #[default]
    Onboarding,
    /// Branch dialog of an existing company: capacity editable, amenities optional.
    StandaloneBranch,
}

impl FlowVariant {
    pub fn derives_capacity(self) -> bool {
        matches!(self, FlowVariant::Onboarding)
    }

    pub fn requires_amenities(self) -> bool {
        matches!(self, FlowVariant::Onboarding)
    }
}

impl fmt::Display for FlowVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowVariant::Onboarding => f.write_str("onboarding"),
            FlowVariant::StandaloneBranch => f.write_str("standalone-branch"),
        }
    }
}

/// Amenities a room may be tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmenityCatalog {
    names: Vec<String>,
}

impl Default for AmenityCatalog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_AMENITIES.iter().map(|s| s.to_string()))
    }
}

impl AmenityCatalog {
    pub const DEFAULT_AMENITIES: [&'static str; 10] = [
        "Wi-Fi",
        "Air Conditioning",
        "Heating",
        "Television",
        "Private Bathroom",
        "Mini Bar",
        "Safe",
        "Desk",
        "Balcony",
        "Room Service",
    ];

    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        Self { names }
    }

    pub fn contains(&self, amenity: &str) -> bool {
        self.names.iter().any(|n| n == amenity)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Bookable unit within a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: NodeId,
    pub room_number: String,
    pub room_type: RoomType,
    pub capacity: u32,
    pub amenities: BTreeSet<String>,
    pub status: RoomStatus,
}

impl Room {
    /// A fresh room row: Single, Vacant, capacity 1, no amenities.
    pub fn empty() -> Self {
        Self {
            id: NodeId::local(),
            room_number: String::new(),
            room_type: RoomType::Single,
            capacity: RoomType::Single.capacity(),
            amenities: BTreeSet::new(),
            status: RoomStatus::Vacant,
        }
    }
}

/// Sub-area of a branch, e.g. a floor or a wing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: NodeId,
    pub name: String,
    pub rooms: Vec<Arc<Room>>,
}

impl Location {
    pub fn empty() -> Self {
        Self {
            id: NodeId::local(),
            name: String::new(),
            rooms: Vec::new(),
        }
    }
}

/// Physical site of a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub id: NodeId,
    pub name: String,
    pub address: String,
    pub locations: Vec<Arc<Location>>,
}

impl Branch {
    pub fn empty() -> Self {
        Self {
            id: NodeId::local(),
            name: String::new(),
            address: String::new(),
            locations: Vec::new(),
        }
    }
}

/// Top-level organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: NodeId,
    pub name: String,
    pub business_type: BusinessType,
    pub branches: Vec<Arc<Branch>>,
}

impl Company {
    /// New company for the given business type.
    ///
    /// Single companies start with their one branch already present,
    /// every other type starts without branches.
    pub fn seeded(business_type: BusinessType) -> Self {
        let branches = match business_type {
            BusinessType::Single => vec![Arc::new(Branch::empty())],
            BusinessType::Franchise | BusinessType::Multiple => Vec::new(),
        };
        Self {
            id: NodeId::local(),
            name: String::new(),
            business_type,
            branches,
        }
    }

    /// Whether another branch may be appended.
    pub fn can_add_branch(&self) -> bool {
        self.business_type
            .branch_limit()
            .map_or(true, |limit| self.branches.len() < limit)
    }
}

/// Normalized form used for sibling uniqueness.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}
