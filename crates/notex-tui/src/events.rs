//! Events consumed by the reducer.
//!
//! Async results carry the identifiers their request was keyed on (load
//! ticket, topic id) so the reducer can recognize and drop results that
//! arrive after the selection moved on.

use notex_core::catalog::CatalogError;
use notex_core::generate::GeneratorError;
use notex_core::hierarchy::{Level, Node};

/// All events the reducer consumes.
#[derive(Debug)]
pub enum UiEvent {
    /// Current terminal size; prepended to every batch before other events.
    Frame { width: u16, height: u16 },
    /// Timer event; drives spinners and status expiry. The only event that
    /// triggers a render.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// A level's option fetch finished. Dropped unless `ticket` is still
    /// the level's live load.
    LevelLoaded {
        level: Level,
        ticket: u64,
        result: Result<Vec<Node>, CatalogError>,
    },
    /// Saved-notes lookup finished for `topic_id`.
    NotesLoaded {
        topic_id: String,
        result: Result<Option<String>, CatalogError>,
    },
    /// Related-questions fetch finished for `topic_id`.
    QuestionsLoaded {
        topic_id: String,
        result: Result<Vec<String>, CatalogError>,
    },
    /// Notes generation finished for `topic_id`.
    GenerationFinished {
        topic_id: String,
        result: Result<String, GeneratorError>,
    },
    /// Save finished for `topic_id`. `text` is the exact text that was
    /// written, which becomes the new baseline on success.
    SaveFinished {
        topic_id: String,
        text: String,
        result: Result<(), CatalogError>,
    },
}
