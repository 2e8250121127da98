//! UI effect types.
//!
//! Effects are commands returned by the reducer for the runtime to
//! execute. They represent I/O only; state mutation stays in the reducer.

use notex_core::content::ViewMode;
use notex_core::generate::GenerateRequest;
use notex_core::hierarchy::LoadRequest;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Fetch a level's options from the catalog. The request carries the
    /// ticket that also tags the result event.
    LoadLevel { request: LoadRequest },

    /// Look up saved notes for a topic, exam-scoped first.
    LoadNotes { topic_id: String, exam_id: String },

    /// Fetch related question statements for a topic.
    LoadQuestions { topic_id: String },

    /// Generate notes for the topic the request was snapshotted from.
    Generate {
        topic_id: String,
        request: GenerateRequest,
    },

    /// Write the notes buffer through the notes backend.
    SaveNotes {
        topic_id: String,
        exam_id: String,
        text: String,
    },

    /// Persist the view-mode preference to config.
    PersistViewMode { mode: ViewMode },
}
