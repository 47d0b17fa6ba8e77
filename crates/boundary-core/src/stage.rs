//! The two pre-recovery stages: transform and report.
//!
//! Both are optional and both are best-effort. A transform that declines (or
//! panics) leaves the original error in place; a reporter that fails is
//! logged and otherwise ignored.
use std::sync::Arc;

use boundary_error::{AppError, ErrorPolicy};
use tracing::warn;

use crate::fault::{Stage, StageFault, guard};

/// Normalize or reclassify an error before it is reported and recovered.
pub trait Transform: Send + Sync {
    fn transform(&self, error: &AppError) -> Result<AppError, AppError>;
}

impl<F> Transform for F
where
    F: Fn(&AppError) -> Result<AppError, AppError> + Send + Sync,
{
    fn transform(&self, error: &AppError) -> Result<AppError, AppError> {
        self(error)
    }
}

/// Side channel for telemetry or audit. Cannot influence resolution.
pub trait Reporter: Send + Sync {
    fn report(&self, error: &AppError) -> Result<(), AppError>;
}

impl<F> Reporter for F
where
    F: Fn(&AppError) -> Result<(), AppError> + Send + Sync,
{
    fn report(&self, error: &AppError) -> Result<(), AppError> {
        self(error)
    }
}

/// Adapts any [`ErrorPolicy`] into a [`Reporter`]; emission never fails.
#[derive(Debug, Clone, Default)]
pub struct PolicyReporter<P>(pub P);

impl<P: ErrorPolicy> Reporter for PolicyReporter<P> {
    fn report(&self, error: &AppError) -> Result<(), AppError> {
        self.0.emit(error);
        Ok(())
    }
}

/// Run the transform stage. Returns the error every later stage should see.
pub(crate) fn apply_transform(
    transform: Option<&dyn Transform>,
    original: Arc<AppError>,
) -> Arc<AppError> {
    let Some(transform) = transform else {
        return original;
    };
    let outcome = guard(Stage::Transform, || transform.transform(&original)).and_then(|r| {
        r.map_err(|error| StageFault::Declined {
            stage: Stage::Transform,
            error,
        })
    });
    match outcome {
        Ok(transformed) => Arc::new(transformed),
        Err(fault) => {
            warn!(
                target: "boundary::diagnostics",
                kind = %original.kind(),
                %fault,
                "transform failed; keeping original error"
            );
            original
        }
    }
}

/// Run the report stage. Failures are logged and swallowed.
pub(crate) fn apply_report(reporter: Option<&dyn Reporter>, error: &AppError) {
    let Some(reporter) = reporter else {
        return;
    };
    let outcome = guard(Stage::Report, || reporter.report(error)).and_then(|r| {
        r.map_err(|error| StageFault::Declined {
            stage: Stage::Report,
            error,
        })
    });
    if let Err(fault) = outcome {
        warn!(
            target: "boundary::diagnostics",
            kind = %error.kind(),
            %fault,
            "report failed; continuing resolution"
        );
    }
}
