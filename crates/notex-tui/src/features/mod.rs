//! Panel render functions, one module per panel.

pub mod notes;
pub mod references;
pub mod selector;
