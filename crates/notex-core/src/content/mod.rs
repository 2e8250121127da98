//! Content pipeline: segmentation, markup, math checks, display tree.

pub mod markup;
pub mod math;
pub mod render;
pub mod segment;

pub use markup::TextRun;
pub use render::{FlowRun, RenderNode, ViewMode, render};
pub use segment::{Segment, reconstruct, segment};
