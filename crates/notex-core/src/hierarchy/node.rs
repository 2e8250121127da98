//! Catalog rows.

use serde::{Deserialize, Serialize};

/// One selectable row at a given level.
///
/// Rows are immutable once loaded; a fresh fetch replaces a prior set
/// wholesale, it never edits rows in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Node {
    /// Creates a root-level row with no parent.
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Creates a row attached to a parent row.
    pub fn child(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}
