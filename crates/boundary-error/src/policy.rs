//! A policy for classifying and emitting errors.
//!
//! Libraries return [`AppError`] values and let the application install an
//! `ErrorPolicy` to decide where they go. Emission can be anything:
//! - tracing logs
//! - a telemetry client
//! - an audit trail
//!
//! Example
//! ```rust,ignore
//! use boundary_error::{AppError, ErrorPolicy, Severity};
//!
//! struct PrintPolicy;
//! impl ErrorPolicy for PrintPolicy {
//!     fn classify(&self, e: &AppError) -> Severity { e.severity() }
//!     fn emit(&self, e: &AppError) { eprintln!("[{:?}] {e}", self.classify(e)); }
//! }
//! ```
use crate::{AppError, Severity};

pub trait ErrorPolicy: Send + Sync {
    /// Classify the error's severity
    fn classify(&self, error: &AppError) -> Severity;

    /// Emit the error according to the policy (e.g., log, forward to telemetry)
    fn emit(&self, error: &AppError);
}

/// A policy that classifies with the error's own severity and emits nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn classify(&self, error: &AppError) -> Severity {
        error.severity()
    }

    fn emit(&self, _error: &AppError) {}
}

/// A policy that uses the error's default severity and emits via tracing
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn classify(&self, error: &AppError) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &AppError) {
        use tracing::{Level, event};

        let kind = error.kind();
        match error.severity() {
            Severity::Warning => event!(target: "boundary::report", Level::WARN, %kind, error = %error),
            Severity::Error | Severity::Fatal => {
                event!(target: "boundary::report", Level::ERROR, %kind, error = %error)
            }
        }
    }
}

/// A composite policy that delegates to multiple policies.
///
/// Behavior
/// - classify: the maximum of the error's own severity and every inner policy's classification.
/// - emit: delegates emission to all inner policies in insertion order.
#[derive(Default)]
pub struct CombinedPolicy {
    policies: Vec<Box<dyn ErrorPolicy>>,
}

impl CombinedPolicy {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            policies: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vec(policies: Vec<Box<dyn ErrorPolicy>>) -> Self {
        Self { policies }
    }

    /// Add a policy by value (boxed internally). Consumes and returns Self for builder-style chaining.
    pub fn push<P: ErrorPolicy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn add_boxed(mut self, policy: Box<dyn ErrorPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl ErrorPolicy for CombinedPolicy {
    fn classify(&self, error: &AppError) -> Severity {
        self.policies
            .iter()
            .map(|p| p.classify(error))
            .fold(error.severity(), Severity::max)
    }

    fn emit(&self, error: &AppError) {
        for p in &self.policies {
            p.emit(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Escalate;
    impl ErrorPolicy for Escalate {
        fn classify(&self, _error: &AppError) -> Severity {
            Severity::Fatal
        }
        fn emit(&self, _error: &AppError) {}
    }

    struct Count(Arc<AtomicUsize>);
    impl ErrorPolicy for Count {
        fn classify(&self, error: &AppError) -> Severity {
            error.severity()
        }
        fn emit(&self, _error: &AppError) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn empty_combined_policy_uses_error_severity() {
        let policy = CombinedPolicy::new();
        assert!(policy.is_empty());
        let err = AppError::validation("bad");
        assert_eq!(policy.classify(&err), Severity::Warning);
    }

    #[test]
    fn combined_policy_takes_max_severity() {
        let policy = CombinedPolicy::new().push(NoopPolicy).push(Escalate);
        assert_eq!(policy.classify(&AppError::business("x")), Severity::Fatal);
    }

    #[test]
    fn combined_policy_emits_to_every_member() {
        let hits = Arc::new(AtomicUsize::new(0));
        let policy = CombinedPolicy::with_capacity(2)
            .push(Count(Arc::clone(&hits)))
            .add_boxed(Box::new(Count(Arc::clone(&hits))));
        policy.emit(&AppError::unknown("boom"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(policy.len(), 2);
    }
}
