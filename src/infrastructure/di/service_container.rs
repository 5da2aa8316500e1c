//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{BranchService, OnboardingService};
use crate::application::{Principal, Scope};
use crate::config::Settings;
use crate::infrastructure::traits::{CompanyApi, DryRunApi, FileSystem, RealFileSystem};

/// Container holding the shared dependencies of all services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Persistence API
    pub api: Arc<dyn CompanyApi>,
}

impl ServiceContainer {
    /// Create a new service container with real filesystem and the dry-run API.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(DryRunApi::new()))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, api: Arc<dyn CompanyApi>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, api }
    }

    /// The operator configured in settings, acting with admin scope.
    pub fn principal(&self) -> Principal {
        Principal::new(self.settings.operator.clone(), Scope::Admin)
    }

    pub fn onboarding_service(&self) -> OnboardingService {
        OnboardingService::new(self.fs.clone(), self.api.clone(), self.principal())
    }

    pub fn branch_service(&self) -> BranchService {
        BranchService::new(self.api.clone(), self.principal())
    }
}
