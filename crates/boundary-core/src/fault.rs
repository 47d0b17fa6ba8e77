//! Captured render faults and guarded hook execution.
//!
//! Hooks supplied by callers (transform, report, strategies, overrides, the
//! render-failure observer) never abort resolution. Each one runs through
//! [`guard`], which converts a panic into a [`StageFault`] the caller treats
//! exactly like the hook declining.
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use boundary_error::{AppError, Cause, Severity};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What a subtree raises when it cannot produce content.
pub type Thrown = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    RenderHook,
    Transform,
    Report,
    CanHandle,
    Recover,
    Override,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Render => "render",
            Stage::RenderHook => "render_failure_hook",
            Stage::Transform => "transform",
            Stage::Report => "report",
            Stage::CanHandle => "can_handle",
            Stage::Recover => "recover",
            Stage::Override => "result_override",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why an optional hook did not contribute to a resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageFault {
    #[error("{stage} declined: {error}")]
    Declined {
        stage: Stage,
        #[source]
        error: AppError,
    },

    #[error("{stage} panicked: {message}")]
    Panicked { stage: Stage, message: String },
}

impl StageFault {
    pub fn stage(&self) -> Stage {
        match self {
            StageFault::Declined { stage, .. } | StageFault::Panicked { stage, .. } => *stage,
        }
    }
}

/// Run a caller-supplied hook, turning a panic into a [`StageFault`].
pub(crate) fn guard<T>(stage: Stage, f: impl FnOnce() -> T) -> Result<T, StageFault> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| StageFault::Panicked {
        stage,
        message: panic_message(payload.as_ref()),
    })
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Where in the subtree a fault was captured.
#[derive(Debug, Clone)]
pub struct StackInfo {
    pub backtrace: String,
    pub captured: bool,
    pub captured_at: DateTime<Utc>,
}

impl StackInfo {
    pub fn capture(force: bool) -> Self {
        let bt = if force {
            Backtrace::force_capture()
        } else {
            Backtrace::capture()
        };
        Self {
            captured: bt.status() == BacktraceStatus::Captured,
            backtrace: bt.to_string(),
            captured_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FaultOrigin {
    /// The subtree returned an error.
    Raised(Cause),
    /// The subtree panicked mid-render.
    Panicked,
}

/// An exception that escaped the wrapped subtree.
#[derive(Debug, Clone)]
pub struct CapturedFault {
    pub id: Uuid,
    pub message: String,
    pub origin: FaultOrigin,
    pub stack: StackInfo,
}

impl CapturedFault {
    pub fn raised(err: Thrown, stack: StackInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: err.to_string(),
            origin: FaultOrigin::Raised(Arc::from(err)),
            stack,
        }
    }

    pub fn panicked(message: impl Into<String>, stack: StackInfo) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            origin: FaultOrigin::Panicked,
            stack,
        }
    }

    /// Convert the outcome of a [`Stage::Render`] guard into a captured fault.
    pub(crate) fn from_stage_fault(fault: StageFault, stack: StackInfo) -> Self {
        match fault {
            StageFault::Panicked { message, .. } => Self::panicked(message, stack),
            declined @ StageFault::Declined { .. } => Self::raised(Box::new(declined), stack),
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self.origin, FaultOrigin::Panicked)
    }

    /// Render faults always escape the view, so they are reported as fatal.
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}
