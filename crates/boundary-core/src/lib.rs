//! Tiered error resolution for view boundaries.
//!
//! Two failure channels meet here. Faults raised while rendering a subtree are
//! captured defensively and shown as a generic notice with a retry. Typed
//! [`AppError`] values handed to [`Boundary::intake`] run through the
//! [`Pipeline`]: transform, report, recovery chain, then an override or the
//! built-in [`Fallback`] for the error's variant.
//!
//! Nothing in this crate knows about a UI toolkit; content is any
//! `Clone + From<Fallback>` type.
pub mod boundary;
pub mod config;
pub mod fallback;
pub mod fault;
pub mod pipeline;
pub mod recovery;
pub mod stage;

pub use boundary::{ActionOutcome, Boundary, BoundaryBuilder, BoundaryState, Phase, Subtree};
pub use boundary_error::{AppError, ErrorKind, Severity};
pub use config::BoundaryConfig;
pub use fallback::{Content, Fallback, FallbackAction};
pub use fault::{CapturedFault, FaultOrigin, Stage, StageFault, StackInfo, Thrown};
pub use pipeline::{Pipeline, Resolution, ResolvedBy, ResultOverride};
pub use recovery::{FnStrategy, KindStrategy, Recovered, RecoveryChain, RecoveryStrategy};
pub use stage::{PolicyReporter, Reporter, Transform};
