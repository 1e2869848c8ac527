use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::Args;
use crate::config::KeyResolver;

mod app;
mod cli;
mod config;
mod dialogs;
mod launcher;
pub mod modal;
mod overlay;
mod theme;
pub mod tui;
mod ui;

pub use theme::Theme;

const DEFAULT_LOG_FILTER: &str = "lazymodal=info";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = initialize_logging()?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting lazymodal");

    let mut config = config::load()?;
    if args.no_animation {
        config.modal = config.modal.without_animation();
    }
    info!(modal = ?config.modal, "Modal configuration");

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);

    let mut app = App::new(&config, resolver, theme);
    app.apply_cli_args(&args)?;
    app.run().await
}

fn log_directory() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from("logs"),
        |path| path.join("lazymodal").join("logs"),
    )
}

/// Log to a daily rolling file. `RUST_LOG` overrides the default filter.
fn initialize_logging() -> Result<WorkerGuard> {
    let directory = log_directory();
    std::fs::create_dir_all(&directory)?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&directory, "lazymodal.log"));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    Ok(guard)
}
