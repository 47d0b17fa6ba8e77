//! Built-in fallback content, one shape per taxonomy variant.
use std::collections::BTreeMap;

use boundary_error::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fault::CapturedFault;

/// Affordances a fallback can offer the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackAction {
    /// Return the boundary to `Clean` and remount the subtree.
    Retry,
    /// Ask the host to route to its sign-in flow.
    SignIn,
    /// Acknowledge a non-blocking notice; also returns to `Clean`.
    Dismiss,
}

/// Displayable replacement for a failed subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    Network {
        message: String,
        retryable: bool,
    },
    SignIn {
        message: String,
    },
    Warning {
        message: String,
        context: BTreeMap<String, String>,
    },
    InlineAlert {
        message: String,
        field: Option<String>,
    },
    Notice {
        message: String,
    },
    RenderFault {
        message: String,
        incident: Uuid,
    },
}

impl Fallback {
    /// The built-in taxonomy switch.
    ///
    /// Exhaustive over [`AppError`]: a new variant does not compile until it is
    /// given a presentation here.
    pub fn for_error(error: &AppError) -> Self {
        match error {
            AppError::Network {
                message, retryable, ..
            } => Fallback::Network {
                message: message.clone(),
                retryable: *retryable,
            },
            AppError::Auth { message } => Fallback::SignIn {
                message: message.clone(),
            },
            AppError::BusinessLogic { message, context } => Fallback::Warning {
                message: message.clone(),
                context: context.clone().unwrap_or_default(),
            },
            AppError::Validation { message, field } => Fallback::InlineAlert {
                message: message.clone(),
                field: field.clone(),
            },
            AppError::Unknown { message } => Fallback::Notice {
                message: message.clone(),
            },
        }
    }

    /// Generic notice shown when an exception escaped the subtree.
    pub fn render_fault(fault: &CapturedFault) -> Self {
        Fallback::RenderFault {
            message: fault.message.clone(),
            incident: fault.id,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Fallback::Network { message, .. }
            | Fallback::SignIn { message }
            | Fallback::Warning { message, .. }
            | Fallback::InlineAlert { message, .. }
            | Fallback::Notice { message }
            | Fallback::RenderFault { message, .. } => message,
        }
    }

    pub fn actions(&self) -> &'static [FallbackAction] {
        match self {
            Fallback::Network {
                retryable: true, ..
            } => &[FallbackAction::Retry],
            Fallback::Network {
                retryable: false, ..
            } => &[],
            Fallback::SignIn { .. } => &[FallbackAction::SignIn],
            Fallback::Warning { .. } | Fallback::InlineAlert { .. } => &[FallbackAction::Dismiss],
            Fallback::Notice { .. } | Fallback::RenderFault { .. } => &[FallbackAction::Retry],
        }
    }

    pub fn offers(&self, action: FallbackAction) -> bool {
        self.actions().contains(&action)
    }

    /// Non-blocking fallbacks may be shown alongside other content.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Fallback::Warning { .. } | Fallback::InlineAlert { .. })
    }
}

/// Ready-made content type: caller text or a built-in fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Fallback(Fallback),
}

impl Content {
    pub fn text(s: impl Into<String>) -> Self {
        Content::Text(s.into())
    }

    pub fn as_fallback(&self) -> Option<&Fallback> {
        match self {
            Content::Fallback(f) => Some(f),
            Content::Text(_) => None,
        }
    }
}

impl From<Fallback> for Content {
    fn from(f: Fallback) -> Self {
        Content::Fallback(f)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}
