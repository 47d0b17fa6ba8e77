//! The boundary state machine.
//!
//! A [`Boundary`] wraps a subtree and owns its [`BoundaryState`]:
//!
//! ```text
//!   Clean ──render fault──▶ RenderFailure
//!     │                         │
//!     └──intake(Err)──▶ ResultFailure ◀──intake(Err)──┘
//!
//!   any ──reset()──▶ Clean (subtree remounted)
//! ```
//!
//! Only `reset` returns to `Clean`. Rendering precedence outside `Clean`:
//! static fallback (when a render fault is held), then resolved content, then
//! the built-in render-fault notice.
use std::sync::Arc;

use boundary_error::AppError;
use tracing::{debug, error, warn};

use crate::config::BoundaryConfig;
use crate::fallback::{Fallback, FallbackAction};
use crate::fault::{CapturedFault, Stage, StackInfo, Thrown, guard};
use crate::pipeline::{Pipeline, Resolution};
use crate::recovery::{RecoveryChain, RecoveryStrategy};
use crate::stage::{Reporter, Transform};

/// Anything that can produce the boundary's wrapped content.
pub trait Subtree {
    type Content;

    fn render(&mut self) -> Result<Self::Content, Thrown>;
}

impl<F, C> Subtree for F
where
    F: FnMut() -> Result<C, Thrown>,
{
    type Content = C;

    fn render(&mut self) -> Result<C, Thrown> {
        self()
    }
}

/// Observation hook for captured render faults.
pub type RenderFailureHook = Box<dyn Fn(&CapturedFault, &StackInfo) + Send + Sync>;

type Mount<S> = Box<dyn FnMut() -> S + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Clean,
    RenderFailure,
    ResultFailure,
}

/// What the boundary currently holds.
///
/// `phase` names the channel that wrote last. Outside `Clean` at least one of
/// `thrown`/`resolved` is set; both are set only when an intake lands while a
/// render fault is still displayed.
#[derive(Debug, Clone)]
pub struct BoundaryState<C> {
    phase: Phase,
    thrown: Option<CapturedFault>,
    resolved: Option<Resolution<C>>,
}

impl<C> Default for BoundaryState<C> {
    fn default() -> Self {
        Self {
            phase: Phase::Clean,
            thrown: None,
            resolved: None,
        }
    }
}

impl<C> BoundaryState<C> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn thrown(&self) -> Option<&CapturedFault> {
        self.thrown.as_ref()
    }

    pub fn resolved(&self) -> Option<&Resolution<C>> {
        self.resolved.as_ref()
    }

    /// Content produced by the pipeline, once it exists.
    pub fn content(&self) -> Option<&C> {
        self.resolved.as_ref().map(|r| &r.content)
    }
}

/// Result of invoking a fallback affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The boundary returned to `Clean`.
    Reset,
    /// The host should route to its sign-in flow; state is unchanged.
    SignInRequested,
}

pub struct Boundary<S: Subtree> {
    mount: Mount<S>,
    subtree: S,
    state: BoundaryState<S::Content>,
    pipeline: Pipeline<S::Content>,
    static_fallback: Option<S::Content>,
    on_render_failure: Option<RenderFailureHook>,
    config: BoundaryConfig,
}

impl<S> Boundary<S>
where
    S: Subtree,
    S::Content: Clone + From<Fallback>,
{
    pub fn builder(mount: impl FnMut() -> S + Send + 'static) -> BoundaryBuilder<S> {
        BoundaryBuilder::new(mount)
    }

    /// A boundary with no hooks, no strategies and default config.
    pub fn new(mount: impl FnMut() -> S + Send + 'static) -> Self {
        Self::builder(mount).build()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_clean(&self) -> bool {
        self.state.phase == Phase::Clean
    }

    pub fn state(&self) -> &BoundaryState<S::Content> {
        &self.state
    }

    pub fn captured(&self) -> Option<&CapturedFault> {
        self.state.thrown.as_ref()
    }

    pub fn resolution(&self) -> Option<&Resolution<S::Content>> {
        self.state.resolved.as_ref()
    }

    pub fn config(&self) -> &BoundaryConfig {
        &self.config
    }

    /// Content to display right now, rendering the subtree when `Clean`.
    ///
    /// A fault raised by the subtree during this call is captured and the
    /// boundary moves to `RenderFailure` before returning its fallback.
    pub fn render(&mut self) -> S::Content {
        if let Some(content) = self.view() {
            return content;
        }
        let fault = match self.render_subtree() {
            Ok(content) => return content,
            Err(fault) => fault,
        };
        let content = match self.static_fallback.as_ref() {
            Some(fallback) => fallback.clone(),
            None => S::Content::from(Fallback::render_fault(&fault)),
        };
        self.capture(fault);
        content
    }

    /// Failure content, or `None` when `Clean` and the subtree should render.
    pub fn view(&self) -> Option<S::Content> {
        if self.state.phase == Phase::Clean {
            return None;
        }
        let thrown = self.state.thrown.as_ref();
        if let (Some(_), Some(fallback)) = (thrown, self.static_fallback.as_ref()) {
            return Some(fallback.clone());
        }
        if let Some(resolution) = self.state.resolved.as_ref() {
            return Some(resolution.content.clone());
        }
        thrown.map(|fault| S::Content::from(Fallback::render_fault(fault)))
    }

    /// Hand an operation's outcome to the boundary.
    ///
    /// `Ok` is a no-op returning `None`. `Err` runs the resolution pipeline,
    /// replaces any previously resolved content and returns the new content.
    pub fn intake<T, E>(&mut self, result: Result<T, E>) -> Option<S::Content>
    where
        E: Into<Arc<AppError>>,
    {
        let error = match result {
            Ok(_) => return None,
            Err(e) => e.into(),
        };
        let resolution = self.pipeline.resolve(error);
        debug!(
            target: "boundary::state",
            from = ?self.state.phase,
            kind = %resolution.error.kind(),
            resolved_by = ?resolution.resolved_by,
            "result failure resolved"
        );
        let content = resolution.content.clone();
        self.state.resolved = Some(resolution);
        self.state.phase = Phase::ResultFailure;
        Some(content)
    }

    /// Clear both failure channels and remount the subtree.
    pub fn reset(&mut self) {
        debug!(target: "boundary::state", from = ?self.state.phase, "reset");
        self.state = BoundaryState::default();
        self.subtree = (self.mount)();
    }

    /// Invoke an affordance offered by the current fallback.
    pub fn dispatch(&mut self, action: FallbackAction) -> ActionOutcome {
        match action {
            FallbackAction::Retry | FallbackAction::Dismiss => {
                self.reset();
                ActionOutcome::Reset
            }
            FallbackAction::SignIn => ActionOutcome::SignInRequested,
        }
    }

    fn render_subtree(&mut self) -> Result<S::Content, CapturedFault> {
        let force = self.config.force_backtrace;
        if !self.config.catch_panics {
            return self
                .subtree
                .render()
                .map_err(|e| CapturedFault::raised(e, StackInfo::capture(force)));
        }
        match guard(Stage::Render, || self.subtree.render()) {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(CapturedFault::raised(e, StackInfo::capture(force))),
            Err(fault) => Err(CapturedFault::from_stage_fault(
                fault,
                StackInfo::capture(force),
            )),
        }
    }

    fn capture(&mut self, fault: CapturedFault) {
        error!(
            target: "boundary::state",
            incident = %fault.id,
            severity = ?fault.severity(),
            panicked = fault.is_panic(),
            message = %fault.message,
            "render failure captured"
        );
        if let Some(hook) = self.on_render_failure.as_ref() {
            if let Err(hook_fault) = guard(Stage::RenderHook, || hook(&fault, &fault.stack)) {
                warn!(target: "boundary::diagnostics", incident = %fault.id, %hook_fault, "render failure hook panicked");
            }
        }
        self.state.thrown = Some(fault);
        self.state.phase = Phase::RenderFailure;
    }
}

/// Builder for [`Boundary`]; every option except the mount is optional.
pub struct BoundaryBuilder<S: Subtree> {
    mount: Mount<S>,
    pipeline: Pipeline<S::Content>,
    static_fallback: Option<S::Content>,
    on_render_failure: Option<RenderFailureHook>,
    config: BoundaryConfig,
}

impl<S> BoundaryBuilder<S>
where
    S: Subtree,
    S::Content: Clone + From<Fallback>,
{
    pub fn new(mount: impl FnMut() -> S + Send + 'static) -> Self {
        Self {
            mount: Box::new(mount),
            pipeline: Pipeline::default(),
            static_fallback: None,
            on_render_failure: None,
            config: BoundaryConfig::default(),
        }
    }

    /// Shown unconditionally while a render fault is held.
    pub fn static_fallback(mut self, content: S::Content) -> Self {
        self.static_fallback = Some(content);
        self
    }

    pub fn on_render_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CapturedFault, &StackInfo) + Send + Sync + 'static,
    {
        self.on_render_failure = Some(Box::new(hook));
        self
    }

    pub fn on_result_override<F>(mut self, over: F) -> Self
    where
        F: Fn(Result<(), &AppError>) -> Option<S::Content> + Send + Sync + 'static,
    {
        self.pipeline.result_override = Some(Box::new(over));
        self
    }

    pub fn transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.pipeline.transform = Some(Box::new(transform));
        self
    }

    pub fn report<R: Reporter + 'static>(mut self, reporter: R) -> Self {
        self.pipeline.reporter = Some(Box::new(reporter));
        self
    }

    /// Append one strategy to the end of the chain.
    pub fn recovery_strategy<R>(mut self, strategy: R) -> Self
    where
        R: RecoveryStrategy<S::Content> + 'static,
    {
        self.pipeline.chain = std::mem::take(&mut self.pipeline.chain).push(strategy);
        self
    }

    /// Replace the whole chain.
    pub fn recovery_chain(mut self, chain: RecoveryChain<S::Content>) -> Self {
        self.pipeline.chain = chain;
        self
    }

    pub fn config(mut self, config: BoundaryConfig) -> Self {
        self.config = config;
        self
    }

    /// Mount the subtree and return a `Clean` boundary.
    pub fn build(mut self) -> Boundary<S> {
        let subtree = (self.mount)();
        Boundary {
            mount: self.mount,
            subtree,
            state: BoundaryState::default(),
            pipeline: self.pipeline,
            static_fallback: self.static_fallback,
            on_render_failure: self.on_render_failure,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::Content;
    use boundary_error::Severity;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Page = Box<dyn FnMut() -> Result<Content, Thrown> + Send>;

    fn healthy() -> Page {
        Box::new(|| Ok(Content::text("page")))
    }

    fn raising() -> Page {
        Box::new(|| Err("widget exploded".into()))
    }

    #[test]
    fn clean_boundary_renders_subtree() {
        let mut boundary = Boundary::new(healthy);
        assert!(boundary.is_clean());
        assert_eq!(boundary.render(), Content::text("page"));
        assert!(boundary.view().is_none());
    }

    #[test]
    fn raised_error_moves_to_render_failure() {
        let mut boundary = Boundary::new(raising);
        let content = boundary.render();
        assert_eq!(boundary.phase(), Phase::RenderFailure);
        let fault = boundary.captured().expect("fault captured");
        assert_eq!(fault.message, "widget exploded");
        assert_eq!(content, Content::Fallback(Fallback::render_fault(fault)));
    }

    #[test]
    fn panics_are_captured_when_enabled() {
        let mut boundary = Boundary::new(|| -> Page { Box::new(|| panic!("index out of range")) });
        let content = boundary.render();
        let fault = boundary.captured().expect("fault captured");
        assert!(fault.is_panic());
        assert_eq!(content.as_fallback().map(Fallback::message), Some("index out of range"));
    }

    #[test]
    fn captured_faults_carry_fatal_severity() {
        let mut boundary = Boundary::new(raising);
        boundary.render();
        assert_eq!(boundary.captured().map(CapturedFault::severity), Some(Severity::Fatal));
        boundary.intake(Err::<(), _>(AppError::validation("bad")));
        assert_eq!(boundary.captured().map(CapturedFault::severity), Some(Severity::Fatal));
    }

    #[test]
    fn panics_propagate_when_capture_disabled() {
        let mut boundary = Boundary::builder(|| -> Page { Box::new(|| panic!("boom")) })
            .config(BoundaryConfig {
                catch_panics: false,
                force_backtrace: false,
            })
            .build();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| boundary.render()));
        assert!(outcome.is_err());
    }

    #[test]
    fn render_failure_hook_runs_once_and_cannot_block_capture() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut boundary = Boundary::builder(raising)
            .on_render_failure(move |fault, stack| {
                seen.fetch_add(1, Ordering::SeqCst);
                assert_eq!(fault.message, "widget exploded");
                assert!(stack.captured_at <= chrono::Utc::now());
                panic!("observer bug");
            })
            .build();
        boundary.render();
        boundary.render();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(boundary.phase(), Phase::RenderFailure);
    }

    #[test]
    fn sign_in_dispatch_leaves_state_alone() {
        let mut boundary = Boundary::new(healthy);
        boundary.intake(Err::<(), _>(AppError::auth("expired")));
        assert_eq!(boundary.dispatch(FallbackAction::SignIn), ActionOutcome::SignInRequested);
        assert_eq!(boundary.phase(), Phase::ResultFailure);
        assert_eq!(boundary.dispatch(FallbackAction::Dismiss), ActionOutcome::Reset);
        assert!(boundary.is_clean());
    }

    #[test]
    fn later_intake_replaces_earlier_content() {
        let mut boundary = Boundary::new(healthy);
        boundary.intake(Err::<(), _>(AppError::unknown("first")));
        let second = boundary.intake(Err::<(), _>(AppError::unknown("second")));
        assert_eq!(boundary.render(), second.expect("content"));
        assert_eq!(
            boundary.state().resolved().map(|r| r.error.message()),
            Some("second")
        );
    }
}
