//! Domain layer: the company tree, its mutations and its validation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod mutation;
pub mod payload;
pub mod tree;
pub mod validator;

pub use entities::*;
pub use error::DomainError;
pub use mutation::{BranchField, CompanyField, LocationField, Mutation, Refusal, RoomField};
pub use payload::{
    common_business_type, parse_requests, BranchRecord, BranchRequest, BranchUpdate,
    CompanyRecord, CompanyRequest, CompanyUpdate, LocationRecord, LocationRequest, RoomRecord,
    RoomRequest,
};
pub use tree::{NodePath, Tree};
pub use validator::{Field, Issue, IssueKind, Step, StepValidator, ValidationContext};
