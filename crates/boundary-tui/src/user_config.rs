//! User configuration for the demo host.
//!
//! Layered with the `config` crate: `<config_dir>/boundary/config.toml` when
//! present, then `BOUNDARY__*` environment variables. Anything missing falls
//! back to defaults.
use std::path::{Path, PathBuf};

use boundary_core::{BoundaryConfig, Fallback, FallbackAction};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to persist configuration: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub boundary: BoundaryConfig,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// User-facing strings shown around fallback content.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Labels {
    pub network_title: String,
    pub sign_in_title: String,
    pub warning_title: String,
    pub alert_title: String,
    pub notice_title: String,
    pub fault_title: String,
    pub retry: String,
    pub sign_in: String,
    pub dismiss: String,
    pub field_prefix: String,
    pub incident_prefix: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            network_title: "Connection problem".into(),
            sign_in_title: "Sign in required".into(),
            warning_title: "Heads up".into(),
            alert_title: "Check your input".into(),
            notice_title: "Something went wrong".into(),
            fault_title: "This view crashed".into(),
            retry: "[r] Retry".into(),
            sign_in: "[l] Sign in".into(),
            dismiss: "[d] Dismiss".into(),
            field_prefix: "Field".into(),
            incident_prefix: "Incident".into(),
        }
    }
}

impl Labels {
    pub fn title(&self, fallback: &Fallback) -> &str {
        match fallback {
            Fallback::Network { .. } => &self.network_title,
            Fallback::SignIn { .. } => &self.sign_in_title,
            Fallback::Warning { .. } => &self.warning_title,
            Fallback::InlineAlert { .. } => &self.alert_title,
            Fallback::Notice { .. } => &self.notice_title,
            Fallback::RenderFault { .. } => &self.fault_title,
        }
    }

    pub fn action(&self, action: FallbackAction) -> &str {
        match action {
            FallbackAction::Retry => &self.retry,
            FallbackAction::SignIn => &self.sign_in,
            FallbackAction::Dismiss => &self.dismiss,
        }
    }
}

/// Colour overrides by fallback kind; any name ratatui can parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub network: Option<String>,
    pub sign_in: Option<String>,
    pub warning: Option<String>,
    pub alert: Option<String>,
    pub notice: Option<String>,
    pub fault: Option<String>,
}

impl UserConfig {
    /// Load from the default location, falling back to defaults on error.
    pub fn load() -> Self {
        match Self::load_from(&Self::default_config_path()) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(target: "boundary::config", error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Layer an optional TOML file under `BOUNDARY__*` environment variables.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("BOUNDARY").separator("__"))
            .build()?
            .try_deserialize::<UserConfig>()?;
        Ok(cfg)
    }

    /// Parse a TOML file directly, without environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Atomically write the configuration as TOML.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        use std::io::Write as _;
        tmp.write_all(toml_str.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// `~/.config/boundary/config.toml` or the platform equivalent.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("boundary")
            .join("config.toml")
    }
}
