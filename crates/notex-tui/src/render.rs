//! Top-level frame layout: header, selector column, references and notes
//! stack, status line, then any overlay on top.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::features;
use crate::overlays::OverlayExt;
use crate::state::{AppState, PanelFocus, SaveStatus, TuiState};

const HEADER_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;
/// Width of the syllabus selector column.
const SELECTOR_WIDTH: u16 = 36;
/// Tallest the references panel gets before it scrolls internally.
const REFERENCES_MAX_HEIGHT: u16 = 8;

pub(crate) const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
const SPINNER_SPEED_DIVISOR: usize = 4;

pub(crate) fn spinner(state: &TuiState) -> &'static str {
    SPINNER_FRAMES[(state.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()]
}

pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string())
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_header(state, frame, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SELECTOR_WIDTH), Constraint::Min(1)])
        .split(rows[1]);
    features::selector::render(state, frame, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(references_height(state)),
            Constraint::Min(1),
        ])
        .split(columns[1]);
    features::references::render(state, frame, right[0]);
    features::notes::render(state, frame, right[1]);

    render_status_line(state, frame, rows[2]);

    app.overlay.render(frame, area);
}

fn references_height(state: &TuiState) -> u16 {
    (state.references.books.len().max(1) as u16)
        .saturating_add(2)
        .min(REFERENCES_MAX_HEIGHT)
}

/// Inner text area of the notes panel for the current terminal size. The
/// reducer clamps scrolling with the same numbers the renderer lays out.
pub fn notes_text_size(state: &TuiState) -> (u16, u16) {
    let (width, height) = state.frame;
    let notes_width = width.saturating_sub(SELECTOR_WIDTH);
    let notes_height = height
        .saturating_sub(HEADER_HEIGHT + STATUS_HEIGHT)
        .saturating_sub(references_height(state));
    (
        notes_width.saturating_sub(2),
        notes_height.saturating_sub(2),
    )
}

fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " notex ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
    ];
    let path = state.controller.store().path();
    if path.is_empty() {
        spans.push(Span::styled(
            "no selection",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        for (index, (_, node)) in path.iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::raw(node.name.clone()));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_line(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];

    match &state.notes.save {
        SaveStatus::Saving => {
            spans.push(Span::styled(
                format!("{} Saving…", spinner(state)),
                Style::default().fg(Color::Yellow),
            ));
            spans.push(Span::raw("  "));
        }
        SaveStatus::Saved { .. } => {
            spans.push(Span::styled("✓ Saved", Style::default().fg(Color::Green)));
            spans.push(Span::raw("  "));
        }
        SaveStatus::Failed { message, .. } => {
            spans.push(Span::styled(
                format!("✗ Save failed: {message}"),
                Style::default().fg(Color::Red),
            ));
            spans.push(Span::raw("  "));
        }
        SaveStatus::Idle => {}
    }
    if state.notes.generation.is_running() {
        spans.push(Span::styled(
            format!("{} Generating…", spinner(state)),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw("  "));
    }

    match state.focus {
        PanelFocus::Selector => {
            push_hint(&mut spans, "↑↓", "move");
            push_hint(&mut spans, "←→", "level");
            push_hint(&mut spans, "Enter", "select");
            push_hint(&mut spans, "r", "retry");
            push_hint(&mut spans, "R", "reset");
        }
        PanelFocus::References => {
            push_hint(&mut spans, "↑↓", "move");
            push_hint(&mut spans, "a", "add");
            push_hint(&mut spans, "d", "delete");
            push_hint(&mut spans, "J/K", "reorder");
        }
        PanelFocus::Notes => {
            push_hint(&mut spans, "↑↓", "scroll");
            let generate = if state.notes.has_existing() {
                "regenerate"
            } else {
                "generate"
            };
            push_hint(&mut spans, "g", generate);
            push_hint(&mut spans, "s", "save");
            push_hint(&mut spans, "v", state.notes.view_mode.toggled().label());
        }
    }
    push_hint(&mut spans, "Tab", "panel");
    push_hint(&mut spans, "q", "quit");

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn push_hint(spans: &mut Vec<Span<'static>>, key: &str, action: &str) {
    spans.push(Span::styled(
        key.to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::raw(format!(" {action}  ")));
}
