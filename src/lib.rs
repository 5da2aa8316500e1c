//! onboard: build, validate and submit company onboarding trees
//!
//! A company owns branches, a branch owns locations and a location owns
//! rooms. The tree is edited through copy-on-write mutations, gated by a
//! five-step wizard and submitted as one nested create request.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
