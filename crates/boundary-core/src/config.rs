use serde::{Deserialize, Serialize};

/// Capture behaviour of a boundary. Loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Intercept panics raised while rendering the subtree. When false they propagate.
    pub catch_panics: bool,
    /// Capture a backtrace for every render fault regardless of `RUST_BACKTRACE`.
    pub force_backtrace: bool,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            force_backtrace: false,
        }
    }
}
