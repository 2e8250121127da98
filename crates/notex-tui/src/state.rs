//! TUI state types.
//!
//! `AppState` splits into `tui` (panels, selection, document) and an
//! optional modal `overlay`. The split lets overlay key handlers borrow
//! the main state immutably while mutating their own.

use std::time::Instant;

use enum_map::EnumMap;
use notex_core::config::Config;
use notex_core::content::ViewMode;
use notex_core::hierarchy::{Level, SelectionController};

use crate::overlays::Overlay;

/// Complete application state.
#[derive(Debug)]
pub struct AppState {
    pub tui: TuiState,
    /// Active modal overlay, if any. Owns the keyboard while present.
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            tui: TuiState::new(config),
            overlay: None,
        }
    }
}

/// Which panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Selector,
    References,
    Notes,
}

impl PanelFocus {
    pub fn next(self) -> Self {
        match self {
            PanelFocus::Selector => PanelFocus::References,
            PanelFocus::References => PanelFocus::Notes,
            PanelFocus::Notes => PanelFocus::Selector,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Selector => PanelFocus::Notes,
            PanelFocus::References => PanelFocus::Selector,
            PanelFocus::Notes => PanelFocus::References,
        }
    }
}

/// Ordered list of reference book titles for the session.
///
/// The order is meaningful: it is the order the titles are handed to
/// generation.
#[derive(Debug, Clone, Default)]
pub struct ReferencesState {
    pub books: Vec<String>,
    pub cursor: usize,
}

impl ReferencesState {
    /// Adds a title. Trims whitespace; empty and duplicate titles are
    /// rejected.
    pub fn add(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() || self.books.iter().any(|b| b == title) {
            return false;
        }
        self.books.push(title.to_string());
        self.cursor = self.books.len() - 1;
        true
    }

    /// Removes the title under the cursor.
    pub fn remove_selected(&mut self) -> Option<String> {
        if self.cursor >= self.books.len() {
            return None;
        }
        let removed = self.books.remove(self.cursor);
        if self.cursor >= self.books.len() && self.cursor > 0 {
            self.cursor -= 1;
        }
        Some(removed)
    }

    /// Swaps the cursor row with the one above it; the cursor follows.
    pub fn move_up(&mut self) -> bool {
        if self.cursor == 0 || self.cursor >= self.books.len() {
            return false;
        }
        self.books.swap(self.cursor, self.cursor - 1);
        self.cursor -= 1;
        true
    }

    /// Swaps the cursor row with the one below it; the cursor follows.
    pub fn move_down(&mut self) -> bool {
        if self.cursor + 1 >= self.books.len() {
            return false;
        }
        self.books.swap(self.cursor, self.cursor + 1);
        self.cursor += 1;
        true
    }
}

/// Lifecycle of the notes generation request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Running,
    /// The last attempt failed; the error stays inline until a retry.
    Failed { message: String },
}

impl GenerationState {
    pub fn is_running(&self) -> bool {
        matches!(self, GenerationState::Running)
    }
}

/// Save lifecycle for the status line. `Saved`/`Failed` carry the instant
/// they were entered so ticks can clear them after a short linger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved {
        at: Instant,
    },
    Failed {
        message: String,
        at: Instant,
    },
}

impl SaveStatus {
    pub fn is_saving(&self) -> bool {
        matches!(self, SaveStatus::Saving)
    }
}

/// The notes document for the currently selected topic.
#[derive(Debug, Clone)]
pub struct NotesState {
    /// In-memory text. Never lost on a failed save.
    pub text: String,
    /// Last loaded or saved text; `None` until a read hit or a save lands.
    /// Unsaved changes are detected by comparing against this.
    pub baseline: Option<String>,
    pub view_mode: ViewMode,
    /// First visible line of the rendered document.
    pub scroll: u16,
    /// A saved-notes lookup is in flight.
    pub loading: bool,
    pub generation: GenerationState,
    pub save: SaveStatus,
    /// Related question statements, numbered into the generation prompt.
    pub questions: Vec<String>,
}

impl NotesState {
    pub(crate) fn new(view_mode: ViewMode) -> Self {
        Self {
            text: String::new(),
            baseline: None,
            view_mode,
            scroll: 0,
            loading: false,
            generation: GenerationState::Idle,
            save: SaveStatus::Idle,
            questions: Vec::new(),
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.text.is_empty() && self.baseline.as_deref() != Some(self.text.as_str())
    }

    /// A saved revision exists for this topic, so generate acts as
    /// regenerate.
    pub fn has_existing(&self) -> bool {
        self.baseline.is_some()
    }

    /// Drops the document when the topic selection changes. The view mode
    /// is a user preference and survives.
    pub fn clear_document(&mut self) {
        self.text.clear();
        self.baseline = None;
        self.scroll = 0;
        self.loading = false;
        self.generation = GenerationState::Idle;
        self.save = SaveStatus::Idle;
        self.questions.clear();
    }
}

/// Main TUI state.
#[derive(Debug)]
pub struct TuiState {
    pub should_quit: bool,
    pub config: Config,
    pub controller: SelectionController,
    pub focus: PanelFocus,
    /// The level whose options the selector panel currently lists.
    pub active_level: Level,
    /// Highlighted row per level's option list.
    pub cursor: EnumMap<Level, usize>,
    pub references: ReferencesState,
    pub notes: NotesState,
    /// Advances on every tick; drives spinners.
    pub spinner_frame: usize,
    /// Last known terminal size, updated by the frame event.
    pub frame: (u16, u16),
}

impl TuiState {
    pub fn new(config: Config) -> Self {
        let view_mode = config.ui.view_mode;
        Self {
            should_quit: false,
            config,
            controller: SelectionController::new(),
            focus: PanelFocus::Selector,
            active_level: Level::Exam,
            cursor: EnumMap::default(),
            references: ReferencesState::default(),
            notes: NotesState::new(view_mode),
            spinner_frame: 0,
            frame: (0, 0),
        }
    }

    /// Generation needs the full path and at least one reference book.
    pub fn can_generate(&self) -> bool {
        self.controller.is_complete() && !self.references.books.is_empty()
    }

    pub fn selected_topic_id(&self) -> Option<&str> {
        self.controller
            .store()
            .selected(Level::Topic)
            .map(|node| node.id.as_str())
    }
}
