//! Notes generation via the Gemini API.
//!
//! A generation request carries the full selected path plus the user's
//! reference books and the related questions fetched for the topic. The
//! prompt is assembled from a template and sent as a single non-streaming
//! `generateContent` call.

pub mod gemini;
pub mod prompt;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hierarchy::SelectedPath;

pub use gemini::{GeminiClient, GeminiConfig};

/// Everything the prompt needs to describe one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub topic_name: String,
    pub exam_name: String,
    pub course_name: String,
    pub subject_name: String,
    pub unit_name: String,
    pub chapter_name: String,
    pub book_references: Vec<String>,
    pub related_questions: Vec<String>,
}

impl GenerateRequest {
    /// Builds a request from a fully selected path.
    pub fn from_path(
        path: &SelectedPath,
        book_references: Vec<String>,
        related_questions: Vec<String>,
    ) -> Self {
        Self {
            topic_name: path.topic.name.clone(),
            exam_name: path.exam.name.clone(),
            course_name: path.course.name.clone(),
            subject_name: path.subject.name.clone(),
            unit_name: path.unit.name.clone(),
            chapter_name: path.chapter.name.clone(),
            book_references,
            related_questions,
        }
    }
}

/// Categories of generation errors for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse the response or assemble the prompt
    Parse,
    /// API-level error returned in an otherwise successful response
    ApiError,
}

impl fmt::Display for GeneratorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorErrorKind::HttpStatus => write!(f, "http_status"),
            GeneratorErrorKind::Timeout => write!(f, "timeout"),
            GeneratorErrorKind::Parse => write!(f, "parse"),
            GeneratorErrorKind::ApiError => write!(f, "api_error"),
        }
    }
}

/// Structured error from the generator with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorError {
    /// Error category
    pub kind: GeneratorErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl GeneratorError {
    pub fn new(kind: GeneratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error.
    ///
    /// Tries to extract the `error.message` field Gemini wraps failures in.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
                && let Some(error_obj) = json.get("error")
                && let Some(msg) = error_obj.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: GeneratorErrorKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: GeneratorErrorKind::HttpStatus,
            message,
            details,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(GeneratorErrorKind::Parse, message)
    }

    /// Maps transport-level reqwest failures onto the error categories.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::timeout(format!("Connection failed: {e}"))
        } else {
            Self::new(GeneratorErrorKind::HttpStatus, format!("Network error: {e}"))
        }
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for GeneratorError {}
