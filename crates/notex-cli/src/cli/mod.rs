//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use notex_core::config::{self, Config};

mod commands;

#[derive(Parser)]
#[command(name = "notex")]
#[command(version)]
#[command(about = "Syllabus browser with AI-generated topic notes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List catalog entries at a level
    Ls {
        /// Level to list (exam, course, subject, unit, chapter, topic)
        #[arg(value_name = "LEVEL")]
        level: String,

        /// Parent node id (required below the root level)
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },

    /// Render a notes file to stdout
    Render {
        /// Path to the notes file
        #[arg(value_name = "FILE")]
        file: std::path::PathBuf,

        /// Print the raw source projection instead of the typeset one
        #[arg(long)]
        raw: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Open the config file with the system handler
    Open,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.command.is_none());

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    tracing::debug!(provider = ?config.catalog.provider, "config loaded");

    // default to the interactive browser
    let Some(command) = cli.command else {
        return crate::modes::run_browser(&config).await;
    };

    match command {
        Commands::Ls { level, parent } => {
            commands::ls::run(&level, parent.as_deref(), &config).await
        }
        Commands::Render { file, raw } => commands::render::run(&file, raw),
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Open => commands::config::open(),
        },
    }
}

/// Interactive runs log to a file under `${NOTEX_HOME}/logs` since the
/// TUI owns the terminal. Subcommands log to stderr.
fn init_logging(interactive: bool) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_env("NOTEX_LOG").unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("notex=info,notex_core=info,notex_tui=info")
    });

    if interactive {
        let logs_dir = config::paths::logs_dir();
        let _ = std::fs::create_dir_all(&logs_dir);
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(logs_dir, "notex.log"));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        None
    }
}
