//! Catalog backends: the syllabus tree, related questions, saved notes.
//!
//! Two tree backends exist behind [`Catalog`]: a PostgREST-style HTTP
//! client and the embedded builtin sample. Notes storage is a separate
//! seam, [`NotesBackend`], because the builtin tree pairs with on-disk
//! notes while the HTTP tree keeps notes in a table.

pub mod http;
pub mod local_notes;
pub mod memory;

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use http::{HttpCatalog, HttpCatalogConfig};
pub use local_notes::LocalNotesStore;
pub use memory::MemoryCatalog;

use crate::config::{CatalogProvider, Config};
use crate::hierarchy::{Level, Node};

/// Categories of catalog errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection failure or request timeout
    Timeout,
    /// Failed to parse a response body
    Parse,
    /// Filesystem failure from the local notes store
    Io,
}

impl fmt::Display for CatalogErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogErrorKind::HttpStatus => write!(f, "http_status"),
            CatalogErrorKind::Timeout => write!(f, "timeout"),
            CatalogErrorKind::Parse => write!(f, "parse"),
            CatalogErrorKind::Io => write!(f, "io"),
        }
    }
}

/// Structured error from a catalog backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogError {
    /// Error category
    pub kind: CatalogErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl CatalogError {
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, lifting a `message` field out of a
    /// JSON error body when one is present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
                && let Some(msg) = json.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: CatalogErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: CatalogErrorKind::HttpStatus,
            message,
            details,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::Parse, message)
    }

    pub fn io(err: &std::io::Error) -> Self {
        Self::new(CatalogErrorKind::Io, err.to_string())
    }

    /// Maps transport-level reqwest failures onto the error categories.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::timeout(format!("Connection failed: {e}"))
        } else {
            Self::new(CatalogErrorKind::HttpStatus, format!("Network error: {e}"))
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CatalogError {}

/// Metadata written alongside a saved note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    /// RFC 3339 UTC timestamp of the save.
    pub saved_at: String,
    /// Fresh id per save.
    pub revision: String,
}

impl NoteMeta {
    pub fn now() -> Self {
        Self {
            saved_at: Utc::now().to_rfc3339(),
            revision: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Syllabus-tree backend, dispatched by config.
#[derive(Debug, Clone)]
pub enum Catalog {
    Http(HttpCatalog),
    Builtin(MemoryCatalog),
}

impl Catalog {
    /// Builds the backend the `[catalog]` section selects.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(match config.catalog.provider {
            CatalogProvider::Builtin => Catalog::Builtin(MemoryCatalog::sample()),
            CatalogProvider::Http => {
                Catalog::Http(HttpCatalog::new(HttpCatalogConfig::from_env(&config.catalog)?))
            }
        })
    }

    /// Fetches the root rows (exams), ordered by name.
    pub async fn fetch_root(&self) -> Result<Vec<Node>, CatalogError> {
        match self {
            Catalog::Http(http) => http.fetch_root().await,
            Catalog::Builtin(mem) => Ok(mem.fetch_root()),
        }
    }

    /// Fetches `level` rows under `parent_id`, ordered by name.
    pub async fn fetch_children(
        &self,
        level: Level,
        parent_id: &str,
    ) -> Result<Vec<Node>, CatalogError> {
        match self {
            Catalog::Http(http) => http.fetch_children(level, parent_id).await,
            Catalog::Builtin(mem) => Ok(mem.fetch_children(level, parent_id)),
        }
    }

    /// Fetches question statements tied to a topic. Rows without a
    /// statement are dropped.
    pub async fn fetch_related_questions(
        &self,
        topic_id: &str,
    ) -> Result<Vec<String>, CatalogError> {
        match self {
            Catalog::Http(http) => http.fetch_related_questions(topic_id).await,
            Catalog::Builtin(mem) => Ok(mem.fetch_related_questions(topic_id)),
        }
    }
}

/// Notes storage backend, dispatched by config.
#[derive(Debug, Clone)]
pub enum NotesBackend {
    Http(HttpCatalog),
    Local(LocalNotesStore),
}

impl NotesBackend {
    /// Builds the store paired with the configured catalog: the builtin
    /// tree keeps notes on disk, the HTTP tree keeps them in a table.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(match config.catalog.provider {
            CatalogProvider::Builtin => {
                NotesBackend::Local(LocalNotesStore::new(crate::config::paths::notes_dir()))
            }
            CatalogProvider::Http => {
                NotesBackend::Http(HttpCatalog::new(HttpCatalogConfig::from_env(&config.catalog)?))
            }
        })
    }

    /// Reads saved notes for a topic. An exam-scoped note wins over a
    /// generic one when both exist.
    pub async fn read_notes(
        &self,
        topic_id: &str,
        exam_id: Option<&str>,
    ) -> Result<Option<String>, CatalogError> {
        match self {
            NotesBackend::Http(http) => http.read_notes(topic_id, exam_id).await,
            NotesBackend::Local(store) => store.read(topic_id, exam_id),
        }
    }

    /// Writes notes for a topic, replacing any prior revision of the same
    /// scope.
    pub async fn write_notes(
        &self,
        topic_id: &str,
        exam_id: Option<&str>,
        text: &str,
        meta: &NoteMeta,
    ) -> Result<(), CatalogError> {
        match self {
            NotesBackend::Http(http) => http.write_notes(topic_id, exam_id, text, meta).await,
            NotesBackend::Local(store) => store.write(topic_id, exam_id, text, meta),
        }
    }
}
