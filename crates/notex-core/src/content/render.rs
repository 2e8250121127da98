//! Display-tree construction.
//!
//! Pure mapping from a segment run to UI-agnostic nodes. Front ends
//! translate the tree into their own widgets; nothing here touches a
//! terminal or does I/O.

use serde::{Deserialize, Serialize};

use super::markup::{self, TextRun};
use super::math;
use super::segment::{self, Segment};

/// How a notes document is projected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Typeset projection: styled prose, math set apart.
    #[default]
    Structured,
    /// The exact source, monospace.
    Raw,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Structured => ViewMode::Raw,
            ViewMode::Raw => ViewMode::Structured,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Structured => "preview",
            ViewMode::Raw => "source",
        }
    }

    /// Identifier used in the config file. Matches the serde spelling.
    pub fn id(self) -> &'static str {
        match self {
            ViewMode::Structured => "structured",
            ViewMode::Raw => "raw",
        }
    }
}

/// Inline-level run inside a flow block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowRun {
    Plain(String),
    Bold(String),
    Italic(String),
    /// Inline math that passed the notation check.
    Math(String),
    /// Inline math that failed it; rendered as a flagged placeholder.
    MathError { source: String, reason: String },
    Break,
}

/// Block-level node of the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// Monospace projection of the exact source (raw mode).
    Source(String),
    /// A run of prose and inline math.
    Flow(Vec<FlowRun>),
    /// Display math that passed the notation check.
    MathBlock(String),
    /// Display math that failed it. Only this block is flagged; siblings
    /// render normally.
    MathBlockError { source: String, reason: String },
}

/// Renders a segment run into a display tree.
pub fn render(segments: &[Segment], mode: ViewMode) -> Vec<RenderNode> {
    match mode {
        ViewMode::Raw => vec![RenderNode::Source(segment::reconstruct(segments))],
        ViewMode::Structured => render_structured(segments),
    }
}

fn render_structured(segments: &[Segment]) -> Vec<RenderNode> {
    let mut nodes = Vec::new();
    let mut flow: Vec<FlowRun> = Vec::new();

    for seg in segments {
        match seg {
            Segment::Text { raw } => {
                for run in markup::parse_runs(raw) {
                    flow.push(match run {
                        TextRun::Plain(s) => FlowRun::Plain(s),
                        TextRun::Bold(s) => FlowRun::Bold(s),
                        TextRun::Italic(s) => FlowRun::Italic(s),
                        TextRun::Break => FlowRun::Break,
                    });
                }
            }
            Segment::InlineMath { raw } => flow.push(match math::check(raw) {
                Ok(()) => FlowRun::Math(raw.clone()),
                Err(err) => FlowRun::MathError {
                    source: raw.clone(),
                    reason: err.to_string(),
                },
            }),
            Segment::DisplayMath { raw } => {
                flush_flow(&mut nodes, &mut flow);
                nodes.push(match math::check(raw) {
                    Ok(()) => RenderNode::MathBlock(raw.clone()),
                    Err(err) => RenderNode::MathBlockError {
                        source: raw.clone(),
                        reason: err.to_string(),
                    },
                });
            }
        }
    }

    flush_flow(&mut nodes, &mut flow);
    nodes
}

fn flush_flow(nodes: &mut Vec<RenderNode>, flow: &mut Vec<FlowRun>) {
    if !flow.is_empty() {
        nodes.push(RenderNode::Flow(std::mem::take(flow)));
    }
}
