use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Opaque underlying cause attached to a network failure.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The closed set of failures the resolution pipeline understands.
///
/// Every variant carries a message. Code that maps variants to behaviour
/// (fallbacks, severities, themes) matches exhaustively, so adding a variant is
/// a compile error until each of those decides how to treat it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        retryable: bool,
        #[source]
        cause: Option<Cause>,
    },

    #[error("Auth error: {message}")]
    Auth { message: String },

    #[error("Business rule violated: {message}")]
    BusinessLogic {
        message: String,
        context: Option<BTreeMap<String, String>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl AppError {
    pub fn network(message: impl Into<String>, retryable: bool) -> Self {
        Self::Network {
            message: message.into(),
            retryable,
            cause: None,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::BusinessLogic {
            message: message.into(),
            context: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Attach an underlying cause. Only network failures carry one; other
    /// variants are returned unchanged.
    pub fn with_cause<E>(self, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            Self::Network {
                message, retryable, ..
            } => Self::Network {
                message,
                retryable,
                cause: Some(Arc::new(err)),
            },
            other => other,
        }
    }

    /// Add a key/value pair to a business-logic error's context.
    pub fn with_context(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            Self::BusinessLogic {
                message,
                mut context,
            } => {
                context
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key.into(), value.into());
                Self::BusinessLogic { message, context }
            }
            other => other,
        }
    }

    /// Name the offending input of a validation error.
    pub fn with_field(self, field: impl Into<String>) -> Self {
        match self {
            Self::Validation { message, .. } => Self::Validation {
                message,
                field: Some(field.into()),
            },
            other => other,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::Auth { message }
            | Self::BusinessLogic { message, .. }
            | Self::Validation { message, .. }
            | Self::Unknown { message } => message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::BusinessLogic { .. } => ErrorKind::BusinessLogic,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { retryable: true, .. })
    }

    /// Replace the message while keeping the variant and its other fields.
    pub fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::Network {
                message,
                retryable,
                cause,
            } => Self::Network {
                message: f(message),
                retryable,
                cause,
            },
            Self::Auth { message } => Self::Auth {
                message: f(message),
            },
            Self::BusinessLogic { message, context } => Self::BusinessLogic {
                message: f(message),
                context,
            },
            Self::Validation { message, field } => Self::Validation {
                message: f(message),
                field,
            },
            Self::Unknown { message } => Self::Unknown {
                message: f(message),
            },
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind as Io;
        match e.kind() {
            Io::TimedOut
            | Io::ConnectionRefused
            | Io::ConnectionReset
            | Io::ConnectionAborted
            | Io::NotConnected
            | Io::BrokenPipe
            | Io::Interrupted => AppError::network(e.to_string(), true).with_cause(e),
            Io::PermissionDenied => AppError::auth(e.to_string()),
            _ => AppError::unknown(e.to_string()),
        }
    }
}

/// Fieldless tag of an [`AppError`] variant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    Network,
    Auth,
    BusinessLogic,
    Validation,
    Unknown,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Network,
        ErrorKind::Auth,
        ErrorKind::BusinessLogic,
        ErrorKind::Validation,
        ErrorKind::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::BusinessLogic => "business_logic",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
