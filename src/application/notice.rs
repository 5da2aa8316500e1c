//! User-facing notices (toast messages)

use std::fmt;

use crate::domain::validator::capitalize;
use crate::domain::{Issue, Refusal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Short message the UI shows after a refused action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Corrective notice for a rejected step, naming the first problems.
    pub fn from_issues(issues: &[Issue]) -> Self {
        const SHOWN: usize = 3;
        let mut message = issues
            .iter()
            .take(SHOWN)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        if issues.len() > SHOWN {
            message.push_str(&format!(" (+{} more)", issues.len() - SHOWN));
        }
        Self::error(message)
    }
}

impl From<Refusal> for Notice {
    fn from(refusal: Refusal) -> Self {
        Notice::warning(capitalize(&refusal.to_string()))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
