//! Coarse-grained classification for programmatic handling of errors.
//!
//! Typical mappings:
//! - Warning: the user can keep working (retryable network blips, rule violations, bad input)
//! - Error: the current view cannot proceed without intervention
//! - Fatal: a defect escaped rendering entirely
use crate::AppError;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl AppError {
    pub fn severity(&self) -> Severity {
        match self {
            AppError::Network { retryable, .. } => {
                if *retryable {
                    Severity::Warning
                } else {
                    Severity::Error
                }
            }
            AppError::Auth { .. } => Severity::Error,
            AppError::BusinessLogic { .. } => Severity::Warning,
            AppError::Validation { .. } => Severity::Warning,
            AppError::Unknown { .. } => Severity::Error,
        }
    }
}
