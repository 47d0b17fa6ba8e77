use std::str::FromStr;

use boundary_core::Fallback;
use ratatui::style::Color;
use tracing::warn;

use crate::user_config::ThemeConfig;

#[derive(Debug, Clone)]
pub struct UiTheme {
    pub network_fg: Color,
    pub sign_in_fg: Color,
    pub warning_fg: Color,
    pub alert_fg: Color,
    pub notice_fg: Color,
    pub fault_fg: Color,
    pub body_fg: Color,
    pub hint_fg: Color,
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            network_fg: Color::Rgb(120, 160, 255),
            sign_in_fg: Color::Magenta,
            warning_fg: Color::Yellow,
            alert_fg: Color::Rgb(255, 140, 0),
            notice_fg: Color::Rgb(210, 210, 210),
            fault_fg: Color::Red,
            body_fg: Color::Rgb(220, 220, 220),
            hint_fg: Color::Rgb(160, 160, 160),
        }
    }
}

impl UiTheme {
    /// Apply user overrides on top of the defaults.
    ///
    /// Unparseable colour names keep the default and log a warning.
    pub fn from_config(cfg: &ThemeConfig) -> Self {
        let mut theme = Self::default();
        let slots: [(&Option<String>, &mut Color, &str); 6] = [
            (&cfg.network, &mut theme.network_fg, "network"),
            (&cfg.sign_in, &mut theme.sign_in_fg, "sign_in"),
            (&cfg.warning, &mut theme.warning_fg, "warning"),
            (&cfg.alert, &mut theme.alert_fg, "alert"),
            (&cfg.notice, &mut theme.notice_fg, "notice"),
            (&cfg.fault, &mut theme.fault_fg, "fault"),
        ];
        for (raw, slot, name) in slots {
            let Some(raw) = raw else { continue };
            match Color::from_str(raw) {
                Ok(color) => *slot = color,
                Err(_) => warn!(target: "boundary::config", slot = name, value = %raw, "unknown theme colour"),
            }
        }
        theme
    }

    pub fn accent(&self, fallback: &Fallback) -> Color {
        match fallback {
            Fallback::Network { .. } => self.network_fg,
            Fallback::SignIn { .. } => self.sign_in_fg,
            Fallback::Warning { .. } => self.warning_fg,
            Fallback::InlineAlert { .. } => self.alert_fg,
            Fallback::Notice { .. } => self.notice_fg,
            Fallback::RenderFault { .. } => self.fault_fg,
        }
    }
}
