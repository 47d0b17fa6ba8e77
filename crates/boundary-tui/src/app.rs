//! Demo host: a counter page mounted inside a boundary.
//!
//! Keys simulate each failure the boundary understands so the fallbacks can be
//! inspected interactively.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use boundary_core::{
    ActionOutcome, AppError, Boundary, Content, Fallback, FallbackAction, FnStrategy,
    PolicyReporter, Subtree, Thrown,
};
use boundary_error::TracingPolicy;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Line,
    widgets::Paragraph,
};
use tracing::info;

use crate::ui_theme::UiTheme;
use crate::user_config::{Labels, UserConfig};
use crate::view::{render_content, render_details};

const HINTS: &str =
    "[space] +1  [p] break render  [n/N a b v u] simulate errors  [i] details  [q] quit";

/// Map a key to an affordance, but only one the fallback actually offers.
pub fn map_action_key(key: KeyEvent, fallback: &Fallback) -> Option<FallbackAction> {
    let action = match key.code {
        KeyCode::Char('r') => FallbackAction::Retry,
        KeyCode::Char('l') => FallbackAction::SignIn,
        KeyCode::Esc | KeyCode::Char('d') => FallbackAction::Dismiss,
        _ => return None,
    };
    fallback.offers(action).then_some(action)
}

#[derive(Debug, thiserror::Error)]
#[error("counter state corrupted at {clicks} clicks")]
pub struct CorruptedCounter {
    pub clicks: u64,
}

/// State shared between the host and every mount of the page.
#[derive(Debug, Clone, Default)]
pub struct DemoControl {
    clicks: Arc<AtomicU64>,
    break_render: Arc<AtomicBool>,
}

impl DemoControl {
    pub fn clicks(&self) -> u64 {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn increment(&self) {
        self.clicks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn break_next_render(&self) {
        self.break_render.store(true, Ordering::SeqCst);
    }

    /// A fresh mount starts with a repaired page.
    fn mount(&self) -> impl FnMut() -> CounterPage + Send + 'static {
        let control = self.clone();
        move || {
            control.break_render.store(false, Ordering::SeqCst);
            CounterPage {
                control: control.clone(),
            }
        }
    }
}

pub struct CounterPage {
    control: DemoControl,
}

impl Subtree for CounterPage {
    type Content = Content;

    fn render(&mut self) -> Result<Content, Thrown> {
        let clicks = self.control.clicks();
        if self.control.break_render.load(Ordering::SeqCst) {
            return Err(Box::new(CorruptedCounter { clicks }));
        }
        Ok(Content::text(format!("Counter: {clicks}")))
    }
}

fn demo_boundary(cfg: &UserConfig, control: &DemoControl) -> Boundary<CounterPage> {
    let cache = control.clone();
    Boundary::builder(control.mount())
        .config(cfg.boundary.clone())
        .transform(|e: &AppError| -> Result<AppError, AppError> {
            Ok(match e {
                AppError::Unknown { .. } => e
                    .clone()
                    .map_message(|m| format!("{m} (contact support if this persists)")),
                AppError::Network { .. }
                | AppError::Auth { .. }
                | AppError::BusinessLogic { .. }
                | AppError::Validation { .. } => e.clone(),
            })
        })
        .report(PolicyReporter(TracingPolicy))
        .recovery_strategy(FnStrategy::new(
            "offline-cache",
            |e: &AppError| {
                matches!(
                    e,
                    AppError::Network {
                        retryable: false,
                        ..
                    }
                )
            },
            move || -> Result<Content, AppError> {
                Ok(Content::text(format!(
                    "Counter: {} (cached, offline)",
                    cache.clicks()
                )))
            },
        ))
        .build()
}

/// The simulated failure bound to a key, if any.
pub fn simulated_error(code: KeyCode) -> Option<AppError> {
    let err = match code {
        KeyCode::Char('n') => AppError::from(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "request timed out",
        )),
        KeyCode::Char('N') => AppError::network("endpoint retired", false),
        KeyCode::Char('a') => AppError::auth("session expired"),
        KeyCode::Char('b') => AppError::business("monthly quota exceeded")
            .with_context("plan", "free")
            .with_context("limit", "100"),
        KeyCode::Char('v') => AppError::validation("Invalid email").with_field("email"),
        KeyCode::Char('u') => AppError::unknown("unexpected response shape"),
        _ => return None,
    };
    Some(err)
}

pub struct App {
    boundary: Boundary<CounterPage>,
    control: DemoControl,
    theme: UiTheme,
    labels: Labels,
    status: Option<String>,
    show_details: bool,
    running: bool,
}

impl App {
    pub fn new(cfg: &UserConfig) -> Self {
        let control = DemoControl::default();
        Self {
            boundary: demo_boundary(cfg, &control),
            control,
            theme: UiTheme::from_config(&cfg.theme),
            labels: cfg.labels.clone(),
            status: None,
            show_details: false,
            running: true,
        }
    }

    pub fn boundary(&self) -> &Boundary<CounterPage> {
        &self.boundary
    }

    pub fn control(&self) -> &DemoControl {
        &self.control
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('q')
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.running = false;
            return;
        }
        if !self.boundary.is_clean() && self.handle_fallback_key(key) {
            return;
        }
        match key.code {
            KeyCode::Char(' ') => self.control.increment(),
            KeyCode::Char('p') => self.control.break_next_render(),
            KeyCode::Char('i') => self.show_details = !self.show_details,
            code => {
                if let Some(err) = simulated_error(code) {
                    self.status = None;
                    self.boundary.intake(Err::<(), _>(err));
                }
            }
        }
    }

    /// Route affordance keys while a fallback is showing. Returns whether the
    /// key was consumed.
    fn handle_fallback_key(&mut self, key: KeyEvent) -> bool {
        let offered = match self.boundary.view() {
            Some(Content::Fallback(fallback)) => map_action_key(key, &fallback),
            _ => None,
        };
        if let Some(action) = offered {
            match self.boundary.dispatch(action) {
                ActionOutcome::Reset => self.status = None,
                ActionOutcome::SignInRequested => {
                    info!(target: "boundary::demo", "sign-in requested");
                    self.status = Some("Sign-in requested; the host would route to its login flow".into());
                }
            }
            return true;
        }
        // Recovered content and fallbacks without affordances still need a way out.
        if key.code == KeyCode::Esc {
            self.boundary.reset();
            self.status = None;
            return true;
        }
        false
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(frame.area());

        let content = self.boundary.render();
        let error = self.boundary.resolution().map(|r| r.error.as_ref());
        if self.show_details && !self.boundary.is_clean() {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(rows[0]);
            render_content(frame, cols[0], &content, &self.theme, &self.labels);
            render_details(frame, cols[1], error, &self.theme);
        } else {
            render_content(frame, rows[0], &content, &self.theme, &self.labels);
        }

        let footer = self.status.as_deref().unwrap_or(HINTS);
        frame.render_widget(
            Paragraph::new(Line::from(footer)).style(Style::new().fg(self.theme.hint_fg)),
            rows[1],
        );
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        while self.running {
            terminal.draw(|frame| self.draw(frame))?;
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }
}
