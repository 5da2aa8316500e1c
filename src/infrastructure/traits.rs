//! I/O boundary traits for testability
//!
//! These traits abstract the filesystem and the remote persistence API,
//! allowing services to be tested with fake implementations.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    BranchRecord, BranchRequest, BranchUpdate, CompanyRecord, CompanyRequest, CompanyUpdate,
    LocationRecord, LocationRequest, RoomRecord, RoomRequest, RoomStatus,
};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Rejection reported by the persistence API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Server-provided message, if any.
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self { message: None }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or("request rejected"))
    }
}

impl std::error::Error for ApiError {}

/// Remote persistence API for companies and their branches.
pub trait CompanyApi: Send + Sync {
    /// Create whole company subtrees; echoes them with server ids.
    fn create_companies(&self, companies: &[CompanyRequest]) -> Result<Vec<CompanyRecord>, ApiError>;

    /// Create one branch subtree under a persisted company.
    fn create_branch(&self, company_id: &str, branch: &BranchRequest) -> Result<BranchRecord, ApiError>;

    /// Send an individual edit of a persisted company.
    fn update_company(&self, company_id: &str, update: &CompanyUpdate) -> Result<(), ApiError>;

    /// Send an individual edit of a persisted branch.
    fn update_branch(&self, branch_id: &str, update: &BranchUpdate) -> Result<(), ApiError>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// API stand-in that accepts every request and echoes it with fresh ids.
///
/// Used by the CLI to preview what the server would receive and return.
#[derive(Debug, Default)]
pub struct DryRunApi {
    requests: AtomicU64,
}

impl DryRunApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests accepted so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn next_id(prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }

    fn echo_room(room: &RoomRequest) -> RoomRecord {
        RoomRecord {
            id: Self::next_id("room"),
            room_number: room.room_number.clone(),
            room_type: room.room_type,
            capacity: room.capacity,
            amenities: room.amenities.clone(),
            status: RoomStatus::Vacant,
        }
    }

    fn echo_location(location: &LocationRequest) -> LocationRecord {
        LocationRecord {
            id: Self::next_id("loc"),
            name: location.name.clone(),
            rooms: location.rooms.iter().map(Self::echo_room).collect(),
        }
    }

    fn echo_branch(branch: &BranchRequest) -> BranchRecord {
        BranchRecord {
            id: Self::next_id("br"),
            name: branch.name.clone(),
            address: branch.address.clone(),
            locations: branch.locations.iter().map(Self::echo_location).collect(),
        }
    }
}

impl CompanyApi for DryRunApi {
    fn create_companies(&self, companies: &[CompanyRequest]) -> Result<Vec<CompanyRecord>, ApiError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        info!("dry-run: create {} companies", companies.len());
        Ok(companies
            .iter()
            .map(|c| CompanyRecord {
                id: Self::next_id("co"),
                business_type: c.business_type,
                name: c.name.clone(),
                branches: c.branches.iter().map(Self::echo_branch).collect(),
            })
            .collect())
    }

    fn create_branch(&self, company_id: &str, branch: &BranchRequest) -> Result<BranchRecord, ApiError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        info!("dry-run: create branch '{}' under {}", branch.name, company_id);
        Ok(Self::echo_branch(branch))
    }

    fn update_company(&self, company_id: &str, update: &CompanyUpdate) -> Result<(), ApiError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        info!("dry-run: rename company {} to '{}'", company_id, update.name);
        Ok(())
    }

    fn update_branch(&self, branch_id: &str, update: &BranchUpdate) -> Result<(), ApiError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        debug!("dry-run: update branch {}: {:?}", branch_id, update);
        Ok(())
    }
}
