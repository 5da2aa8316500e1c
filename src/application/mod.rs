//! Application layer: wizard, services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod notice;
pub mod services;
pub mod session;
pub mod wizard;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use notice::{Notice, NoticeLevel};
pub use session::{Principal, Scope};
pub use wizard::{Transition, Wizard};
