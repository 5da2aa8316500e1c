//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed input to the tree engine.
///
/// Mutations and validation never produce these: guards are refusals and
/// validation failures are issues. Only parsing drafts and payloads fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown business type: {0}")]
    UnknownBusinessType(String),

    #[error("unknown room type: {0}")]
    UnknownRoomType(String),

    #[error("draft contains no company")]
    EmptyDraft,

    #[error("draft mixes business types: {first} and {other}")]
    MixedBusinessTypes { first: String, other: String },

    #[error("company {company} has {found} branches, business type {business_type} allows {limit}")]
    BranchLimitExceeded {
        company: String,
        business_type: String,
        limit: usize,
        found: usize,
    },

    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },
}
