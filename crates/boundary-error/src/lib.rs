pub mod domain;
pub mod policy;
pub mod pretty;
pub mod result_ext;
pub mod severity;

// public exports
pub use domain::{AppError, Cause, ErrorKind};
pub use policy::{CombinedPolicy, ErrorPolicy, NoopPolicy};
#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;
#[cfg(feature = "serde")]
pub use pretty::{AppErrorFields, PrettyDebug};
pub use result_ext::{IterResultExt, ResultExt};
pub use severity::Severity;

pub type Result<T, E = AppError> = std::result::Result<T, E>;
