//! Terminal adapter for `boundary-core`: draws fallbacks with ratatui, maps keys
//! to fallback affordances and hosts a small demo page.
pub mod app;
pub mod tracing_setup;
pub mod ui_theme;
pub mod user_config;
pub mod view;

pub use app::{App, map_action_key};
pub use ui_theme::UiTheme;
pub use user_config::{ConfigError, Labels, ThemeConfig, UserConfig};

/// Load configuration, take over the terminal and run the demo until quit.
pub fn try_main() -> color_eyre::Result<()> {
    let config = UserConfig::load();
    tracing::debug!(target: "boundary::config", ?config, "configuration loaded");

    let terminal = ratatui::init();
    let app = App::new(&config);
    let result = app.run(terminal);
    ratatui::restore();
    result
}
