//! The reference books panel. Order matters: the list is handed to the
//! generation prompt as-is.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::truncate_with_ellipsis;
use crate::render::panel_block;
use crate::state::{PanelFocus, TuiState};

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let title = format!(" References ({}) ", state.references.books.len());
    let block = panel_block(&title, state.focus == PanelFocus::References);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let books = &state.references.books;
    if books.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "press a to add a reference book",
                Style::default().fg(Color::DarkGray),
            ))),
            inner,
        );
        return;
    }

    let cursor = state.references.cursor.min(books.len() - 1);
    let height = inner.height as usize;
    let offset = (cursor + 1).saturating_sub(height);
    let mut lines = Vec::new();
    for (index, book) in books.iter().enumerate().skip(offset).take(height) {
        let at_cursor = index == cursor;
        let marker = if at_cursor { "▸ " } else { "  " };
        let style = if at_cursor {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker}{}. {}",
                index + 1,
                truncate_with_ellipsis(book, (inner.width as usize).saturating_sub(5)),
            ),
            style,
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}
