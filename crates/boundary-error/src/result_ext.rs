use crate::{AppError, ErrorPolicy, Severity};

/// Extension trait for `Result` enabling policy-driven emission without
/// contaminating core control-flow with side-effects.
///
/// Typical usage: at the edge of a page or data loader, emit the error via the
/// installed [`ErrorPolicy`] and still hand the untouched result to the
/// boundary's intake.
///
/// Example
/// ```rust,ignore
/// use boundary_error::{AppError, ResultExt, ErrorPolicy};
///
/// fn load(policy: &impl ErrorPolicy) -> Result<(), AppError> {
///     let r: Result<(), AppError> = Err(AppError::network("timeout", true));
///     r.emit_event(policy) // emitted, still Err for the caller
/// }
/// ```
pub trait ResultExt<T> {
    /// Emit the error using the provided policy and return the result unchanged
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self;

    /// If the error classifies as a warning, emit it
    fn emit_warning(self, policy: &impl ErrorPolicy) -> Self;

    /// If the error classifies as an error, emit it
    fn emit_error(self, policy: &impl ErrorPolicy) -> Self;

    /// If the error classifies as fatal, emit it
    fn emit_fatal(self, policy: &impl ErrorPolicy) -> Self;
}

fn emit_at<T>(
    result: Result<T, AppError>,
    policy: &impl ErrorPolicy,
    severity: Severity,
) -> Result<T, AppError> {
    if let Err(ref e) = result {
        if policy.classify(e) == severity {
            policy.emit(e);
        }
    }
    result
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn emit_event(self, policy: &impl ErrorPolicy) -> Self {
        if let Err(ref e) = self {
            policy.emit(e);
        }
        self
    }

    fn emit_warning(self, policy: &impl ErrorPolicy) -> Self {
        emit_at(self, policy, Severity::Warning)
    }

    fn emit_error(self, policy: &impl ErrorPolicy) -> Self {
        emit_at(self, policy, Severity::Error)
    }

    fn emit_fatal(self, policy: &impl ErrorPolicy) -> Self {
        emit_at(self, policy, Severity::Fatal)
    }
}

/// Iterator helpers over `Result` to reduce boilerplate at boundaries.
///
/// - `collect_ok`: eagerly collects `Ok` items, returning the first error
///   (equivalent to `collect::<Result<Vec<_>, _>>()` but clearer at call sites).
/// - `first_error`: scans and returns the first error without allocation.
pub trait IterResultExt<T>: Sized {
    fn collect_ok(self) -> Result<Vec<T>, AppError>;
    fn first_error(self) -> Option<AppError>;
}

impl<I, T> IterResultExt<T> for I
where
    I: IntoIterator<Item = Result<T, AppError>>,
{
    fn collect_ok(self) -> Result<Vec<T>, AppError> {
        let mut out = Vec::new();
        for r in self {
            out.push(r?);
        }
        Ok(out)
    }

    fn first_error(self) -> Option<AppError> {
        self.into_iter().find_map(Result::err)
    }
}
