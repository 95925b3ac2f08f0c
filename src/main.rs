mod agenda;
mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prontio")]
#[command(about = "A terminal agenda for the Prontio clinic API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/prontio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Open the agenda at this date (YYYY-MM-DD) instead of today
  #[arg(short, long)]
  date: Option<chrono::NaiveDate>,

  /// Start in week view
  #[arg(short, long)]
  week: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  // The TUI owns stdout, so logs go to a file
  let _log_guard = init_logging()?;

  let args = Args::parse();

  let config = config::Config::load(args.config.as_deref())?;

  let mut app = app::App::new(config, args.date, args.week)?;
  app.run().await?;

  Ok(())
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("prontio");
  std::fs::create_dir_all(&data_dir)
    .map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let file = tracing_appender::rolling::never(data_dir, "prontio.log");
  let (writer, guard) = tracing_appender::non_blocking(file);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
