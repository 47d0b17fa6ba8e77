//! Drawing boundary output with ratatui.
use boundary_core::{AppError, Content, Fallback};
use boundary_error::PrettyDebug;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
};

use crate::ui_theme::UiTheme;
use crate::user_config::Labels;

/// Body lines for a fallback: message, kind-specific detail, then the
/// affordances it offers.
pub fn fallback_lines(fallback: &Fallback, labels: &Labels) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        fallback.message().to_string(),
        Style::new().add_modifier(Modifier::BOLD),
    ))];

    match fallback {
        Fallback::InlineAlert {
            field: Some(field), ..
        } => lines.push(Line::from(format!("{}: {field}", labels.field_prefix))),
        Fallback::Warning { context, .. } => {
            lines.extend(context.iter().map(|(k, v)| Line::from(format!("  {k}: {v}"))));
        }
        Fallback::RenderFault { incident, .. } => {
            lines.push(Line::from(format!("{}: {incident}", labels.incident_prefix)));
        }
        Fallback::InlineAlert { field: None, .. }
        | Fallback::Network { .. }
        | Fallback::SignIn { .. }
        | Fallback::Notice { .. } => {}
    }

    let actions = fallback.actions();
    if !actions.is_empty() {
        lines.push(Line::default());
        let spans: Vec<Span<'static>> = actions
            .iter()
            .enumerate()
            .flat_map(|(i, action)| {
                let sep = (i > 0).then(|| Span::raw("  "));
                sep.into_iter()
                    .chain(std::iter::once(Span::raw(labels.action(*action).to_string())))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

/// Thick borders for fallbacks that replace the page, rounded for advisories.
pub fn border_type(fallback: &Fallback) -> BorderType {
    if fallback.is_blocking() {
        BorderType::Thick
    } else {
        BorderType::Rounded
    }
}

/// Draw whatever the boundary produced into `area`.
pub fn render_content(
    frame: &mut Frame,
    area: Rect,
    content: &Content,
    theme: &UiTheme,
    labels: &Labels,
) {
    let paragraph = match content {
        Content::Text(text) => Paragraph::new(text.as_str())
            .style(Style::new().fg(theme.body_fg))
            .block(Block::bordered().title(" Page ")),
        Content::Fallback(fallback) => {
            let accent = theme.accent(fallback);
            Paragraph::new(fallback_lines(fallback, labels))
                .style(Style::new().fg(theme.body_fg))
                .block(
                    Block::bordered()
                        .title(format!(" {} ", labels.title(fallback)))
                        .border_type(border_type(fallback))
                        .border_style(Style::new().fg(accent)),
                )
        }
    };
    frame.render_widget(paragraph.wrap(Wrap { trim: false }), area);
}

/// Structured fields of the error behind the current fallback.
pub fn render_details(frame: &mut Frame, area: Rect, error: Option<&AppError>, theme: &UiTheme) {
    let body = error
        .and_then(|e| e.pretty_json())
        .unwrap_or_else(|| "no structured details".to_string());
    let paragraph = Paragraph::new(body)
        .style(Style::new().fg(theme.hint_fg))
        .block(Block::bordered().title(" Details "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
