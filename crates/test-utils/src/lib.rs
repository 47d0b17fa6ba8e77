//! Shared fixtures for boundary tests.
//!
//! Strategies, reporters and pages here record every call they receive so
//! tests can assert on ordering and call counts rather than only on output.
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use boundary_core::{AppError, Content, RecoveryStrategy, Reporter, Thrown, Transform};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber. Safe to call from every test.
pub fn init_test_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},boundary=debug")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Shared, append-only log of stage names, used to assert ordering.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0
            .lock()
            .expect("call log poisoned")
            .push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("call log poisoned").clone()
    }
}

/// Strategy with a fixed answer that counts how often it is consulted.
#[derive(Clone)]
pub struct CountingStrategy {
    pub name: &'static str,
    pub accepts: bool,
    pub outcome: Result<Content, AppError>,
    pub can_handle_calls: Arc<AtomicUsize>,
    pub recover_calls: Arc<AtomicUsize>,
    pub log: Option<CallLog>,
}

impl CountingStrategy {
    pub fn new(name: &'static str, accepts: bool, outcome: Result<Content, AppError>) -> Self {
        Self {
            name,
            accepts,
            outcome,
            can_handle_calls: Arc::new(AtomicUsize::new(0)),
            recover_calls: Arc::new(AtomicUsize::new(0)),
            log: None,
        }
    }

    pub fn succeeding(name: &'static str, content: impl Into<Content>) -> Self {
        Self::new(name, true, Ok(content.into()))
    }

    pub fn failing(name: &'static str) -> Self {
        Self::new(name, true, Err(AppError::unknown(format!("{name} declined"))))
    }

    pub fn rejecting(name: &'static str) -> Self {
        Self::new(name, false, Ok(Content::text("unreachable")))
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn recover_count(&self) -> usize {
        self.recover_calls.load(Ordering::SeqCst)
    }

    pub fn can_handle_count(&self) -> usize {
        self.can_handle_calls.load(Ordering::SeqCst)
    }
}

impl RecoveryStrategy<Content> for CountingStrategy {
    fn can_handle(&self, _error: &AppError) -> bool {
        self.can_handle_calls.fetch_add(1, Ordering::SeqCst);
        self.accepts
    }

    fn recover(&self) -> Result<Content, AppError> {
        self.recover_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.record(format!("recover:{}", self.name));
        }
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Reporter that remembers the address and message of every error it sees.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub seen: Arc<Mutex<Vec<(usize, String)>>>,
    pub fail_with: Option<AppError>,
    pub log: Option<CallLog>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: AppError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn addresses(&self) -> Vec<usize> {
        self.seen
            .lock()
            .expect("reporter poisoned")
            .iter()
            .map(|(addr, _)| *addr)
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.seen
            .lock()
            .expect("reporter poisoned")
            .iter()
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, error: &AppError) -> Result<(), AppError> {
        self.seen
            .lock()
            .expect("reporter poisoned")
            .push((error as *const AppError as usize, error.message().to_string()));
        if let Some(log) = &self.log {
            log.record("report");
        }
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Transform that always declines, logging that it ran.
#[derive(Clone, Default)]
pub struct DecliningTransform {
    pub log: Option<CallLog>,
}

impl Transform for DecliningTransform {
    fn transform(&self, _error: &AppError) -> Result<AppError, AppError> {
        if let Some(log) = &self.log {
            log.record("transform");
        }
        Err(AppError::unknown("transform unavailable"))
    }
}

/// Address of an error, for identity assertions against [`RecordingReporter`].
pub fn addr_of(error: &Arc<AppError>) -> usize {
    Arc::as_ptr(error) as usize
}

/// Switches shared between a test and the pages a boundary mounts.
#[derive(Debug, Clone, Default)]
pub struct PageControl {
    pub fail: Arc<AtomicBool>,
    pub mounts: Arc<AtomicUsize>,
}

impl PageControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.load(Ordering::SeqCst)
    }

    /// A mount factory producing pages that count their own renders.
    pub fn mount(&self) -> impl FnMut() -> CounterPage + Send + 'static {
        let control = self.clone();
        move || {
            control.mounts.fetch_add(1, Ordering::SeqCst);
            CounterPage {
                renders: 0,
                fail: Arc::clone(&control.fail),
            }
        }
    }
}

/// A page whose output reflects how many times this mount has rendered.
#[derive(Debug)]
pub struct CounterPage {
    pub renders: usize,
    fail: Arc<AtomicBool>,
}

impl boundary_core::Subtree for CounterPage {
    type Content = Content;

    fn render(&mut self) -> Result<Content, Thrown> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("page exploded".into());
        }
        self.renders += 1;
        Ok(Content::text(format!("page render #{}", self.renders)))
    }
}
