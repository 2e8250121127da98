//! Terminal UI for drilling through the syllabus tree, managing
//! reference books, and generating and saving topic notes.

mod common;
mod effects;
mod events;
mod features;
mod mutations;
mod overlays;
mod render;
mod runtime;
mod state;
mod terminal;
mod update;

use std::io::IsTerminal;

use anyhow::{Result, bail};
use notex_core::catalog::{Catalog, NotesBackend};
use notex_core::config::Config;

pub use runtime::TuiRuntime;

/// Runs the interactive browser against the configured backends.
pub async fn run_browser(config: &Config) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        bail!("stdout is not a terminal; use `notex ls` or `notex render` for scripting");
    }
    let catalog = Catalog::from_config(config)?;
    let notes = NotesBackend::from_config(config)?;
    let mut runtime = TuiRuntime::new(config.clone(), catalog, notes)?;
    runtime.run()
}
