//! Structured, log-friendly pretty-print helpers.
//!
//! Gated behind the `serde` feature so consumers that only need the taxonomy
//! do not pull in serialization.

#![cfg(feature = "serde")]

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{AppError, ErrorKind, Severity};

/// Provide a structured view of an error or diagnostic for logging/UI.
///
/// Implementors expose a lightweight set of serializable fields; callers can
/// choose between the raw fields, a `serde_json::Value`, or a pretty JSON
/// string for human consumption.
pub trait PrettyDebug {
    type Fields<'a>: Serialize + 'a
    where
        Self: 'a;

    /// Return the structured fields, if available.
    fn fields(&self) -> Option<Self::Fields<'_>>;

    /// Convert fields to a JSON value without pretty whitespace.
    fn to_value(&self) -> Option<serde_json::Value> {
        self.fields().and_then(|f| serde_json::to_value(&f).ok())
    }

    /// Convert fields to a pretty JSON string (for logs or UI).
    fn pretty_json(&self) -> Option<String> {
        self.fields()
            .and_then(|f| serde_json::to_string_pretty(&f).ok())
    }

    /// Convert fields to a pretty JSON string and panic if serialization fails.
    ///
    /// Useful in tracing calls where fallible plumbing is noisy and you prefer a hard
    /// failure over silently missing structured data.
    fn pretty_json_or_panic(&self) -> Option<String> {
        self.fields().map(|f| {
            serde_json::to_string_pretty(&f)
                .expect("PrettyDebug serialization should not fail; verify Fields implementation")
        })
    }

    /// Emit a tracing event with both the Display string and structured fields when available.
    #[cfg(feature = "tracing")]
    fn emit_tracing(&self, level: tracing::Level, message: &str)
    where
        Self: std::fmt::Display,
    {
        use tracing::Level;

        let fields = self.to_value().map(|v| v.to_string()).unwrap_or_default();
        if level == Level::ERROR {
            tracing::error!(error = %self, fields = %fields, "{message}");
        } else if level == Level::WARN {
            tracing::warn!(error = %self, fields = %fields, "{message}");
        } else if level == Level::INFO {
            tracing::info!(error = %self, fields = %fields, "{message}");
        } else if level == Level::DEBUG {
            tracing::debug!(error = %self, fields = %fields, "{message}");
        } else {
            tracing::trace!(error = %self, fields = %fields, "{message}");
        }
    }
}

/// Serializable view of an [`AppError`].
#[derive(Debug, Serialize)]
pub struct AppErrorFields<'a> {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a BTreeMap<String, String>>,
}

impl PrettyDebug for AppError {
    type Fields<'a> = AppErrorFields<'a>;

    fn fields(&self) -> Option<Self::Fields<'_>> {
        let mut fields = AppErrorFields {
            kind: self.kind(),
            severity: self.severity(),
            message: self.message(),
            retryable: None,
            cause: None,
            field: None,
            context: None,
        };
        match self {
            AppError::Network {
                retryable, cause, ..
            } => {
                fields.retryable = Some(*retryable);
                fields.cause = cause.as_ref().map(|c| c.to_string());
            }
            AppError::BusinessLogic { context, .. } => fields.context = context.as_ref(),
            AppError::Validation { field, .. } => fields.field = field.as_deref(),
            AppError::Auth { .. } | AppError::Unknown { .. } => {}
        }
        Some(fields)
    }
}
