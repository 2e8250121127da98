//! Runtime execution modes.
//!
//! - subcommands: plain stdout/stderr
//! - browser: full-screen interactive terminal UI (optional feature)

#[cfg(feature = "tui")]
pub use notex_tui::run_browser;

#[cfg(not(feature = "tui"))]
pub async fn run_browser(_config: &notex_core::config::Config) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
