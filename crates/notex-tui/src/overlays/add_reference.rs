//! Input overlay for adding a reference book.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use crate::mutations::StateMutation;
use crate::state::TuiState;

/// State for the add-reference overlay.
#[derive(Debug, Clone)]
pub struct AddReferenceState {
    /// The title being typed.
    pub input: String,
    /// Validation message shown below the input.
    pub error: Option<String>,
}

impl AddReferenceState {
    pub fn open() -> Self {
        Self {
            input: String::new(),
            error: None,
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Any edit clears the previous validation message.
        if !matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            self.error = None;
        }

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Enter => {
                let title = self.input.trim();
                if title.is_empty() {
                    self.error = Some("Title cannot be empty".to_string());
                    OverlayUpdate::stay()
                } else if tui.references.books.iter().any(|b| b == title) {
                    self.error = Some("Already in the reference list".to_string());
                    OverlayUpdate::stay()
                } else {
                    OverlayUpdate::close().with_mutations(vec![StateMutation::AddBook {
                        title: title.to_string(),
                    }])
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        use super::render_utils::{
            InputHint, InputLine, OverlayConfig, render_input_line, render_overlay,
            render_separator,
        };

        let hints = [
            InputHint::new("Enter", "add"),
            InputHint::new("Esc", "cancel"),
        ];
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: "Add Reference Book",
                border_color: Color::Yellow,
                width: 54,
                height: 7,
                hints: &hints,
            },
        );

        let input_area = Rect::new(layout.body.x, layout.body.y, layout.body.width, 1);
        render_input_line(
            frame,
            input_area,
            &InputLine {
                value: &self.input,
                placeholder: Some("Book title..."),
                prompt: "> ",
                prompt_color: Color::DarkGray,
                text_color: Color::Yellow,
                placeholder_color: Color::DarkGray,
                cursor_color: Color::Yellow,
            },
        );

        render_separator(frame, layout.body, 1);

        let (help_text, help_style) = match &self.error {
            Some(error) => (error.as_str(), Style::default().fg(Color::Red)),
            None => (
                "The list is handed to generation in order",
                Style::default().fg(Color::DarkGray),
            ),
        };
        let help_area = Rect::new(layout.body.x, layout.body.y + 2, layout.body.width, 1);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(help_text, help_style))),
            help_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use notex_core::config::Config;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn press(state: &mut AddReferenceState, tui: &TuiState, code: KeyCode) -> OverlayUpdate {
        state.handle_key(tui, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(state: &mut AddReferenceState, tui: &TuiState, text: &str) {
        for c in text.chars() {
            press(state, tui, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_submits_trimmed_title() {
        let tui = TuiState::new(Config::default());
        let mut state = AddReferenceState::open();
        type_text(&mut state, &tui, "  HC Verma ");

        let update = press(&mut state, &tui, KeyCode::Enter);
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert_eq!(
            update.mutations,
            vec![StateMutation::AddBook {
                title: "HC Verma".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_title_shows_error_and_stays() {
        let tui = TuiState::new(Config::default());
        let mut state = AddReferenceState::open();
        type_text(&mut state, &tui, "   ");

        let update = press(&mut state, &tui, KeyCode::Enter);
        assert!(matches!(update.transition, OverlayTransition::Stay));
        assert!(update.mutations.is_empty());
        assert_eq!(state.error.as_deref(), Some("Title cannot be empty"));

        // Typing again clears the message.
        press(&mut state, &tui, KeyCode::Char('x'));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_duplicate_title_is_rejected() {
        let mut tui = TuiState::new(Config::default());
        tui.references.add("HC Verma");
        let mut state = AddReferenceState::open();
        type_text(&mut state, &tui, "HC Verma");

        let update = press(&mut state, &tui, KeyCode::Enter);
        assert!(matches!(update.transition, OverlayTransition::Stay));
        assert_eq!(state.error.as_deref(), Some("Already in the reference list"));
    }

    #[test]
    fn test_esc_closes_without_mutations() {
        let tui = TuiState::new(Config::default());
        let mut state = AddReferenceState::open();
        type_text(&mut state, &tui, "half-typed");

        let update = press(&mut state, &tui, KeyCode::Esc);
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(update.mutations.is_empty());
    }

    #[test]
    fn test_backspace_edits_input() {
        let tui = TuiState::new(Config::default());
        let mut state = AddReferenceState::open();
        type_text(&mut state, &tui, "ab");
        press(&mut state, &tui, KeyCode::Backspace);
        assert_eq!(state.input, "a");
    }
}
