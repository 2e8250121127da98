//! In-memory catalog.
//!
//! Serves the embedded sample syllabus when the config picks the builtin
//! provider, and doubles as the scriptable backend for tests. Children are
//! served ordered by name, matching the HTTP backend.

use std::collections::HashMap;

use enum_map::EnumMap;
use serde::Deserialize;

use crate::hierarchy::{Level, Node};

const SAMPLE_CATALOG: &str = include_str!("../../assets/sample_catalog.json");

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    rows: EnumMap<Level, Vec<Node>>,
    questions: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SampleTree {
    exams: Vec<Node>,
    courses: Vec<Node>,
    subjects: Vec<Node>,
    units: Vec<Node>,
    chapters: Vec<Node>,
    topics: Vec<Node>,
    #[serde(default)]
    questions: HashMap<String, Vec<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The embedded sample syllabus.
    pub fn sample() -> Self {
        let tree: SampleTree =
            serde_json::from_str(SAMPLE_CATALOG).expect("embedded sample catalog is valid JSON");
        let mut catalog = Self::new();
        catalog.rows[Level::Exam] = tree.exams;
        catalog.rows[Level::Course] = tree.courses;
        catalog.rows[Level::Subject] = tree.subjects;
        catalog.rows[Level::Unit] = tree.units;
        catalog.rows[Level::Chapter] = tree.chapters;
        catalog.rows[Level::Topic] = tree.topics;
        catalog.questions = tree.questions;
        catalog
    }

    /// Adds a row. Test and sample assembly helper.
    pub fn insert(&mut self, level: Level, node: Node) {
        self.rows[level].push(node);
    }

    pub fn set_questions(&mut self, topic_id: impl Into<String>, questions: Vec<String>) {
        self.questions.insert(topic_id.into(), questions);
    }

    pub fn fetch_root(&self) -> Vec<Node> {
        let mut rows = self.rows[Level::Exam].clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn fetch_children(&self, level: Level, parent_id: &str) -> Vec<Node> {
        let mut rows: Vec<Node> = self.rows[level]
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    pub fn fetch_related_questions(&self, topic_id: &str) -> Vec<String> {
        self.questions.get(topic_id).cloned().unwrap_or_default()
    }
}
