//! Subcommand handlers.

pub mod config;
pub mod ls;
pub mod render;
