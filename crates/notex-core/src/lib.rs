//! Core notex library (hierarchy, content pipeline, catalog, generation, config).

pub mod catalog;
pub mod config;
pub mod content;
pub mod generate;
pub mod hierarchy;

/// User agent string sent with outbound HTTP requests.
pub const USER_AGENT: &str = concat!("notex/", env!("CARGO_PKG_VERSION"));
