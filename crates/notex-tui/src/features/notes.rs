//! The notes panel: renders the topic document, or whichever loading,
//! generation, or eligibility state applies instead.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use notex_core::content::{self, FlowRun, RenderNode};
use notex_core::hierarchy::Level;

use crate::render::{panel_block, spinner};
use crate::state::{GenerationState, NotesState, PanelFocus, TuiState};

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = panel_block(&title(state), state.focus == PanelFocus::Notes);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let notes = &state.notes;
    if notes.generation.is_running() {
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(
                format!("{} Generating notes…", spinner(state)),
                Style::default().fg(Color::Cyan),
            ))
            .centered(),
            Line::from(Span::styled(
                "this can take a minute",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }
    if let GenerationState::Failed { message } = &notes.generation {
        let mut lines = vec![
            Line::default(),
            Line::from(Span::styled(
                "⚠ Generation failed",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .centered(),
        ];
        for piece in chunk_width(message, inner.width as usize) {
            lines.push(Line::from(Span::styled(piece, Style::default().fg(Color::Red))).centered());
        }
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(
                "press g to retry",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        );
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }
    if notes.loading {
        let lines = vec![
            Line::default(),
            Line::from(Span::styled(
                format!("{} Loading saved notes…", spinner(state)),
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }
    if notes.text.is_empty() {
        let hint = if state.can_generate() {
            "press g to generate notes"
        } else if state.controller.is_complete() {
            "add a reference book (a) to enable generation"
        } else {
            "drill down to a topic, then add a reference book"
        };
        let lines = vec![
            Line::default(),
            Line::from(Span::styled("No notes yet", Style::default().fg(Color::DarkGray)))
                .centered(),
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))).centered(),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let lines = document_lines(notes, inner.width);
    frame.render_widget(Paragraph::new(lines).scroll((notes.scroll, 0)), inner);
}

fn title(state: &TuiState) -> String {
    let topic = state
        .controller
        .store()
        .selected(Level::Topic)
        .map(|node| node.name.as_str())
        .unwrap_or("Notes");
    let marker = if state.notes.has_unsaved_changes() {
        " *"
    } else {
        ""
    };
    format!(" {topic} · {}{marker} ", state.notes.view_mode.label())
}

/// Lays the rendered document out as wrapped terminal lines. The scroll
/// clamp in the reducer counts the same lines this produces.
pub fn document_lines(notes: &NotesState, width: u16) -> Vec<Line<'static>> {
    let width = width.max(1) as usize;
    let segments = content::segment(&notes.text);
    let nodes = content::render(&segments, notes.view_mode);

    let mut lines = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match node {
            RenderNode::Source(source) => {
                let style = Style::default().fg(Color::Gray);
                for raw in source.split('\n') {
                    for piece in chunk_width(raw, width) {
                        lines.push(Line::from(Span::styled(piece, style)));
                    }
                }
            }
            RenderNode::Flow(runs) => lines.extend(wrap_flow(runs, width)),
            RenderNode::MathBlock(math) => {
                let style = Style::default().fg(Color::Cyan);
                for piece in chunk_width(math.trim(), width) {
                    lines.push(Line::from(Span::styled(piece, style)).centered());
                }
            }
            RenderNode::MathBlockError { source, reason } => {
                lines.push(
                    Line::from(Span::styled(
                        format!("⚠ {}", source.trim()),
                        Style::default().fg(Color::Red),
                    ))
                    .centered(),
                );
                lines.push(
                    Line::from(Span::styled(
                        format!("({reason})"),
                        Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
                    ))
                    .centered(),
                );
            }
        }
    }
    lines
}

fn run_pieces(run: &FlowRun) -> Vec<(String, Style)> {
    match run {
        FlowRun::Plain(text) => vec![(text.clone(), Style::default())],
        FlowRun::Bold(text) => vec![(
            text.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )],
        FlowRun::Italic(text) => vec![(
            text.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )],
        FlowRun::Math(text) => vec![(text.clone(), Style::default().fg(Color::Cyan))],
        FlowRun::MathError { source, reason } => vec![
            (format!("⚠ {source}"), Style::default().fg(Color::Red)),
            (
                format!(" ({reason})"),
                Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
            ),
        ],
        FlowRun::Break => Vec::new(),
    }
}

/// Greedy word wrap over styled runs. Styles survive wrapping; words
/// wider than the panel are hard-split.
fn wrap_flow(runs: &[FlowRun], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for run in runs {
        if matches!(run, FlowRun::Break) {
            flush_line(&mut lines, &mut spans);
            used = 0;
            continue;
        }
        for (text, style) in run_pieces(run) {
            wrap_piece(&text, style, width, &mut lines, &mut spans, &mut used);
        }
    }
    if !spans.is_empty() {
        flush_line(&mut lines, &mut spans);
    }
    lines
}

fn wrap_piece(
    text: &str,
    style: Style,
    width: usize,
    lines: &mut Vec<Line<'static>>,
    spans: &mut Vec<Span<'static>>,
    used: &mut usize,
) {
    for token in text.split_inclusive(' ') {
        let visible = token.trim_end_matches(' ');
        let visible_width = visible.width();

        if visible_width > width {
            if *used > 0 {
                flush_line(lines, spans);
                *used = 0;
            }
            for piece in chunk_width(visible, width) {
                if *used > 0 {
                    flush_line(lines, spans);
                }
                *used = piece.as_str().width();
                push_span(spans, &piece, style);
            }
            continue;
        }
        // Pure-space tokens are dropped at the start of a line.
        if visible.is_empty() && *used == 0 {
            continue;
        }
        if *used > 0 && *used + visible_width > width {
            flush_line(lines, spans);
            *used = 0;
            if visible.is_empty() {
                continue;
            }
        }
        push_span(spans, token, style);
        *used += token.width();
    }
}

fn push_span(spans: &mut Vec<Span<'static>>, text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut()
        && last.style == style
    {
        last.content.to_mut().push_str(text);
    } else {
        spans.push(Span::styled(text.to_string(), style));
    }
}

fn flush_line(lines: &mut Vec<Line<'static>>, spans: &mut Vec<Span<'static>>) {
    lines.push(Line::from(std::mem::take(spans)));
}

/// Splits text into pieces of at most `width` columns, by display width.
fn chunk_width(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += ch_width;
    }
    pieces.push(current);
    pieces
}
