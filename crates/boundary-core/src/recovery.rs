//! Ordered, pluggable recovery strategies.
//!
//! Behavior
//! - strategies are consulted in insertion order;
//! - `recover` is only called when `can_handle` accepted the error;
//! - the first `Ok` wins and nothing after it is consulted;
//! - an `Err` (or panic) moves on to the next strategy.
use std::collections::BTreeSet;

use boundary_error::{AppError, ErrorKind};
use tracing::{debug, warn};

use crate::fault::{Stage, StageFault, guard};

/// Offers replacement content for the errors it recognizes.
pub trait RecoveryStrategy<C>: Send + Sync {
    fn can_handle(&self, error: &AppError) -> bool;

    fn recover(&self) -> Result<C, AppError>;

    /// Used in diagnostics only.
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<C, P, R> RecoveryStrategy<C> for (P, R)
where
    P: Fn(&AppError) -> bool + Send + Sync,
    R: Fn() -> Result<C, AppError> + Send + Sync,
{
    fn can_handle(&self, error: &AppError) -> bool {
        (self.0)(error)
    }

    fn recover(&self) -> Result<C, AppError> {
        (self.1)()
    }
}

/// A named predicate/producer pair.
pub struct FnStrategy<P, R> {
    name: String,
    predicate: P,
    producer: R,
}

impl<P, R> FnStrategy<P, R> {
    pub fn new(name: impl Into<String>, predicate: P, producer: R) -> Self {
        Self {
            name: name.into(),
            predicate,
            producer,
        }
    }
}

impl<C, P, R> RecoveryStrategy<C> for FnStrategy<P, R>
where
    P: Fn(&AppError) -> bool + Send + Sync,
    R: Fn() -> Result<C, AppError> + Send + Sync,
{
    fn can_handle(&self, error: &AppError) -> bool {
        (self.predicate)(error)
    }

    fn recover(&self) -> Result<C, AppError> {
        (self.producer)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Serves fixed content for a set of error kinds.
#[derive(Debug, Clone)]
pub struct KindStrategy<C> {
    name: String,
    kinds: BTreeSet<ErrorKind>,
    content: C,
}

impl<C> KindStrategy<C> {
    pub fn new(name: impl Into<String>, kinds: impl IntoIterator<Item = ErrorKind>, content: C) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into_iter().collect(),
            content,
        }
    }
}

impl<C: Clone + Send + Sync> RecoveryStrategy<C> for KindStrategy<C> {
    fn can_handle(&self, error: &AppError) -> bool {
        self.kinds.contains(&error.kind())
    }

    fn recover(&self) -> Result<C, AppError> {
        Ok(self.content.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Content produced by a strategy, with the strategy's position for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered<C> {
    pub index: usize,
    pub name: String,
    pub content: C,
}

pub struct RecoveryChain<C> {
    strategies: Vec<Box<dyn RecoveryStrategy<C>>>,
}

impl<C> Default for RecoveryChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> RecoveryChain<C> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strategies: Vec::with_capacity(capacity),
        }
    }

    pub fn from_vec(strategies: Vec<Box<dyn RecoveryStrategy<C>>>) -> Self {
        Self { strategies }
    }

    /// Append a strategy by value. Consumes and returns Self for builder-style chaining.
    pub fn push<S: RecoveryStrategy<C> + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn add_boxed(mut self, strategy: Box<dyn RecoveryStrategy<C>>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Walk the chain. `None` means no strategy produced content.
    pub fn recover(&self, error: &AppError) -> Option<Recovered<C>> {
        for (index, strategy) in self.strategies.iter().enumerate() {
            let accepts = match guard(Stage::CanHandle, || strategy.can_handle(error)) {
                Ok(accepts) => accepts,
                Err(fault) => {
                    warn!(target: "boundary::diagnostics", index, strategy = strategy.name(), %fault, "can_handle panicked; skipping");
                    false
                }
            };
            if !accepts {
                continue;
            }

            let outcome = guard(Stage::Recover, || strategy.recover()).and_then(|r| {
                r.map_err(|error| StageFault::Declined {
                    stage: Stage::Recover,
                    error,
                })
            });
            match outcome {
                Ok(content) => {
                    debug!(target: "boundary::diagnostics", index, strategy = strategy.name(), "recovered");
                    return Some(Recovered {
                        index,
                        name: strategy.name().to_string(),
                        content,
                    });
                }
                Err(fault) => {
                    debug!(target: "boundary::diagnostics", index, strategy = strategy.name(), %fault, "strategy declined; trying next");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn always(_: &AppError) -> bool {
        true
    }

    fn never(_: &AppError) -> bool {
        false
    }

    #[test]
    fn empty_chain_yields_nothing() {
        let chain: RecoveryChain<String> = RecoveryChain::new();
        assert!(chain.recover(&AppError::unknown("x")).is_none());
    }

    #[test]
    fn rejected_strategies_are_never_asked_to_recover() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let chain = RecoveryChain::new().push((never, move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok::<_, AppError>("unused".to_string())
        }));
        assert!(chain.recover(&AppError::unknown("x")).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn first_success_wins_after_failures() {
        let chain = RecoveryChain::with_capacity(3)
            .push(FnStrategy::new("broken", always, || {
                Err::<String, _>(AppError::unknown("cache miss"))
            }))
            .push(FnStrategy::new("cache", always, || Ok("cached".to_string())))
            .push(FnStrategy::new("late", always, || Ok("late".to_string())));

        let recovered = chain.recover(&AppError::network("t", true)).expect("recovered");
        assert_eq!(recovered.content, "cached");
        assert_eq!(recovered.index, 1);
        assert_eq!(recovered.name, "cache");
    }

    #[test]
    fn panicking_strategies_are_skipped() {
        let chain = RecoveryChain::new()
            .push(FnStrategy::new(
                "bad-predicate",
                |_: &AppError| -> bool { panic!("predicate bug") },
                || Ok("never".to_string()),
            ))
            .push(FnStrategy::new("bad-recover", always, || -> Result<String, AppError> {
                panic!("recover bug")
            }))
            .push(FnStrategy::new("good", always, || Ok("good".to_string())));

        let recovered = chain.recover(&AppError::unknown("x")).expect("recovered");
        assert_eq!(recovered.content, "good");
        assert_eq!(recovered.index, 2);
    }

    #[test]
    fn kind_strategy_matches_on_kind() {
        let chain = RecoveryChain::new().add_boxed(Box::new(KindStrategy::new(
            "offline-page",
            [ErrorKind::Network],
            "offline".to_string(),
        )));
        assert!(chain.recover(&AppError::auth("x")).is_none());
        let recovered = chain.recover(&AppError::network("t", false)).expect("recovered");
        assert_eq!(recovered.content, "offline");
        assert_eq!(chain.len(), 1);
    }
}
