//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CompanyApi)
//! but are themselves concrete structs, not traits.

mod branch;
mod onboarding;

pub use branch::{BranchDialog, BranchService};
pub use onboarding::{OnboardingService, StepReport};
