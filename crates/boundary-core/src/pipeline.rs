//! Result-failure resolution: transform, report, recover, then override or built-in.
use std::sync::Arc;

use boundary_error::AppError;
use tracing::{debug, warn};

use crate::fallback::Fallback;
use crate::fault::{Stage, guard};
use crate::recovery::{RecoveryChain, Recovered};
use crate::stage::{Reporter, Transform, apply_report, apply_transform};

/// Full escape hatch for result-failure rendering. `None` falls back.
pub type ResultOverride<C> = Box<dyn Fn(Result<(), &AppError>) -> Option<C> + Send + Sync>;

/// Which tier produced a resolution's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBy {
    Override,
    Strategy { index: usize, name: String },
    BuiltIn,
}

/// Output of one pass through the pipeline.
#[derive(Debug, Clone)]
pub struct Resolution<C> {
    /// The error as seen by every stage after transform.
    pub error: Arc<AppError>,
    pub content: C,
    pub resolved_by: ResolvedBy,
}

pub struct Pipeline<C> {
    pub(crate) transform: Option<Box<dyn Transform>>,
    pub(crate) reporter: Option<Box<dyn Reporter>>,
    pub(crate) chain: RecoveryChain<C>,
    pub(crate) result_override: Option<ResultOverride<C>>,
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self {
            transform: None,
            reporter: None,
            chain: RecoveryChain::new(),
            result_override: None,
        }
    }
}

impl<C> Pipeline<C>
where
    C: From<Fallback>,
{
    /// Stages run strictly in order: transform, report, recovery chain,
    /// then the override or the built-in taxonomy switch.
    pub fn resolve(&self, original: Arc<AppError>) -> Resolution<C> {
        let error = apply_transform(self.transform.as_deref(), original);
        apply_report(self.reporter.as_deref(), &error);
        let recovered = self.chain.recover(&error);

        if let Some(over) = self.result_override.as_ref() {
            match guard(Stage::Override, || over(Err(error.as_ref()))) {
                Ok(Some(content)) => {
                    debug!(target: "boundary::state", kind = %error.kind(), "resolved by override");
                    return Resolution {
                        error,
                        content,
                        resolved_by: ResolvedBy::Override,
                    };
                }
                Ok(None) => {}
                Err(fault) => {
                    warn!(target: "boundary::diagnostics", kind = %error.kind(), %fault, "override failed; falling back");
                }
            }
        }

        match recovered {
            Some(Recovered {
                index,
                name,
                content,
            }) => Resolution {
                error,
                content,
                resolved_by: ResolvedBy::Strategy { index, name },
            },
            None => {
                let content = C::from(Fallback::for_error(&error));
                Resolution {
                    error,
                    content,
                    resolved_by: ResolvedBy::BuiltIn,
                }
            }
        }
    }
}
