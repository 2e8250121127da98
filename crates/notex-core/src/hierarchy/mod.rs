//! Cascading six-level selection: exam, course, subject, unit, chapter,
//! topic. Choosing at one level invalidates and reloads everything below
//! it; late child loads are matched by ticket and dropped when stale.

pub mod controller;
pub mod level;
pub mod node;
pub mod store;

pub use controller::{ResolveOutcome, SelectOutcome, SelectionController};
pub use level::Level;
pub use node::Node;
pub use store::{HierarchyStore, LoadRequest, LoadState, SelectedPath};
