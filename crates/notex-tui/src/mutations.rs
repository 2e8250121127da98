//! State mutations returned by overlay key handlers.
//!
//! Overlays see the main state immutably, so their handlers describe the
//! changes they want and the reducer applies them.

/// A deferred mutation of [`crate::state::TuiState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMutation {
    /// Append a reference book title (trimmed; blanks and duplicates are
    /// dropped).
    AddBook { title: String },
}
