//! The syllabus selector: the six-level path on top, the active level's
//! options underneath.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use notex_core::hierarchy::{Level, LoadState};

use crate::common::truncate_with_ellipsis;
use crate::render::{panel_block, spinner};
use crate::state::{PanelFocus, TuiState};

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = panel_block(" Syllabus ", state.focus == PanelFocus::Selector);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let store = state.controller.store();
    let mut lines: Vec<Line> = Vec::new();

    for level in Level::all() {
        let active = *level == state.active_level;
        let marker = if active { "▸ " } else { "  " };
        let label_style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let (name, name_style) = match store.selected(*level) {
            Some(node) => (node.name.as_str(), Style::default()),
            None => ("—", Style::default().fg(Color::DarkGray)),
        };
        let name_width = inner.width.saturating_sub(11) as usize;
        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<9}", level.label()), label_style),
            Span::styled(truncate_with_ellipsis(name, name_width), name_style),
        ]));
    }
    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Style::default().fg(Color::DarkGray),
    )));

    let level = state.active_level;
    match store.load_state(level) {
        LoadState::Loading { .. } => {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} Loading {} options…",
                    spinner(state),
                    level.label().to_lowercase()
                ),
                Style::default().fg(Color::Cyan),
            )));
        }
        LoadState::Failed { message } => {
            lines.push(Line::from(Span::styled(
                truncate_with_ellipsis(
                    &format!("⚠ {message}"),
                    inner.width as usize,
                ),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(Span::styled(
                "press r to retry",
                Style::default().fg(Color::DarkGray),
            )));
        }
        LoadState::Idle => {}
    }

    let options = store.options(level);
    if options.is_empty() {
        if matches!(store.load_state(level), LoadState::Idle) {
            let hint = match level.parent() {
                Some(parent) if store.selected(parent).is_none() => {
                    format!("select a {} first", parent.label().to_lowercase())
                }
                _ => "no entries".to_string(),
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )));
        }
    } else {
        let list_height = (inner.height as usize).saturating_sub(lines.len());
        let cursor = state.cursor[level].min(options.len() - 1);
        let offset = (cursor + 1).saturating_sub(list_height);
        for (index, node) in options.iter().enumerate().skip(offset).take(list_height) {
            let at_cursor = index == cursor;
            let selected = store.selected(level).is_some_and(|s| s.id == node.id);
            let marker = if at_cursor { "▸ " } else { "  " };
            let style = if at_cursor {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if selected {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            let check_width = if selected { 4 } else { 2 };
            let mut spans = vec![Span::styled(
                format!(
                    "{marker}{}",
                    truncate_with_ellipsis(
                        &node.name,
                        (inner.width as usize).saturating_sub(check_width),
                    )
                ),
                style,
            )];
            if selected {
                spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
