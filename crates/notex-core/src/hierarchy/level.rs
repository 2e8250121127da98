//! The six ranks of the syllabus hierarchy.

use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// One rank of the fixed drill-down order, root to leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Exam,
    Course,
    Subject,
    Unit,
    Chapter,
    Topic,
}

impl Level {
    /// Returns all levels in rank order.
    pub fn all() -> &'static [Level] {
        &[
            Level::Exam,
            Level::Course,
            Level::Subject,
            Level::Unit,
            Level::Chapter,
            Level::Topic,
        ]
    }

    /// Returns the string identifier used in config files and CLI arguments.
    pub fn id(&self) -> &'static str {
        match self {
            Level::Exam => "exam",
            Level::Course => "course",
            Level::Subject => "subject",
            Level::Unit => "unit",
            Level::Chapter => "chapter",
            Level::Topic => "topic",
        }
    }

    /// Returns the Level for a given id string.
    pub fn from_id(id: &str) -> Option<Level> {
        match id.to_lowercase().as_str() {
            "exam" | "exams" => Some(Level::Exam),
            "course" | "courses" => Some(Level::Course),
            "subject" | "subjects" => Some(Level::Subject),
            "unit" | "units" => Some(Level::Unit),
            "chapter" | "chapters" => Some(Level::Chapter),
            "topic" | "topics" => Some(Level::Topic),
            _ => None,
        }
    }

    /// Returns the display label for pickers and breadcrumbs.
    pub fn label(&self) -> &'static str {
        match self {
            Level::Exam => "Exam",
            Level::Course => "Course",
            Level::Subject => "Subject",
            Level::Unit => "Unit",
            Level::Chapter => "Chapter",
            Level::Topic => "Topic",
        }
    }

    /// Returns the catalog table that holds this level's rows.
    pub fn table(&self) -> &'static str {
        match self {
            Level::Exam => "exams",
            Level::Course => "courses",
            Level::Subject => "subjects",
            Level::Unit => "units",
            Level::Chapter => "chapters",
            Level::Topic => "topics",
        }
    }

    /// Returns the foreign-key column pointing at the parent level's id.
    /// The root table has none.
    pub fn parent_key(&self) -> Option<&'static str> {
        match self {
            Level::Exam => None,
            Level::Course => Some("exam_id"),
            Level::Subject => Some("course_id"),
            Level::Unit => Some("subject_id"),
            Level::Chapter => Some("unit_id"),
            Level::Topic => Some("chapter_id"),
        }
    }

    /// Returns the level immediately above, if any.
    pub fn parent(&self) -> Option<Level> {
        match self {
            Level::Exam => None,
            Level::Course => Some(Level::Exam),
            Level::Subject => Some(Level::Course),
            Level::Unit => Some(Level::Subject),
            Level::Chapter => Some(Level::Unit),
            Level::Topic => Some(Level::Chapter),
        }
    }

    /// Returns the level immediately below, if any.
    pub fn child(&self) -> Option<Level> {
        match self {
            Level::Exam => Some(Level::Course),
            Level::Course => Some(Level::Subject),
            Level::Subject => Some(Level::Unit),
            Level::Unit => Some(Level::Chapter),
            Level::Chapter => Some(Level::Topic),
            Level::Topic => None,
        }
    }

    /// Returns the zero-based rank, root first.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Returns the levels strictly below this one, nearest first.
    pub fn below(&self) -> &'static [Level] {
        &Self::all()[self.rank() + 1..]
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Level::Exam)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Level::Topic)
    }
}
