//! Caller identity, handed in by the authentication layer and only read here

use std::fmt;

use crate::application::{ApplicationError, ApplicationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub scope: Scope,
}

impl Principal {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    pub fn can_write(&self) -> bool {
        matches!(self.scope, Scope::Admin | Scope::Editor)
    }

    pub fn require_write(&self) -> ApplicationResult<()> {
        if self.can_write() {
            Ok(())
        } else {
            Err(ApplicationError::Forbidden {
                principal: self.name.clone(),
            })
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
