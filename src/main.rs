mod api;
mod app;
mod catalog;
mod config;
mod constants;
mod debounce;
mod input;
mod player;
mod theme;
mod ui;
mod upload;

use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use api::CatalogClient;
use app::App;
use config::Config;
use constants::constants;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Browse, play and upload videos from a Clip Cast server", long_about = None)]
struct Args {
  /// API origin, e.g. https://clip-cast-server.onrender.com (default: prefs.toml, then built-in)
  #[arg(short, long)]
  base_url: Option<String>,

  /// Titles per page in the list pane
  #[arg(short, long)]
  page_size: Option<usize>,

  /// Start with this search instead of the full catalog
  #[arg(short, long)]
  query: Option<String>,
}

// --- Logging ---

/// Log to a daily file under the data dir; the terminal belongs to the UI.
fn init_logging() -> Result<Option<WorkerGuard>> {
  let Some(proj_dirs) = ProjectDirs::from("", "", "clipcast") else {
    return Ok(None);
  };
  let log_dir = proj_dirs.data_local_dir().join("logs");
  std::fs::create_dir_all(&log_dir).with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

  let appender = tracing_appender::rolling::daily(&log_dir, &constants().log_file_prefix);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipcast=info")))
    .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
    .try_init()
    .context("Failed to install tracing subscriber")?;

  Ok(Some(guard))
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = init_logging()?;

  let config = Config::load();
  let base_url = config.resolve_base_url(args.base_url.as_deref());
  let page_size = config.resolve_page_size(args.page_size);
  let client = CatalogClient::new(&base_url).context("Invalid API base URL")?;
  info!(base_url = %base_url, page_size, "starting clipcast");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut app = App::new(client, page_size, config);
  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app, args.query).await;
  ratatui::restore();

  app.player.stop().await?;
  info!("clipcast exited");
  result
}

async fn run(terminal: &mut DefaultTerminal, app: &mut App, query: Option<String>) -> Result<()> {
  match query {
    Some(q) => {
      app.cursor_position = q.chars().count();
      app.input = q.clone();
      app.search(q);
    }
    None => app.load_catalog(),
  }

  loop {
    app.check_pending().await?;
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  Ok(())
}
