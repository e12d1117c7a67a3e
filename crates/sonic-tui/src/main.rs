mod app;
mod input;
mod theme;
mod ui;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use sonic_core::sidechannel::{Notifier, StateDump};
use sonic_core::{
    platform, CatalogCache, Config, Connection, Dispatcher, Keymap, PlaybackController,
    SignalPlayer, SubsonicClient,
};

/// Terminal client for Subsonic music servers.
#[derive(Parser, Debug)]
#[command(name = "sksonic", version, about)]
struct Cli {
    /// Config file to use instead of ~/.config/sksonic/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = platform::log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("sksonic log: {}", log_path.display());
    tracing::info!("sksonic starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let keymap = Keymap::from_config(&config.keys)?;

    // ── Connect and load the artist list ─────────────────────────────────────
    let client = SubsonicClient::new(Connection::new(&config.server));
    client
        .ping()
        .await
        .with_context(|| format!("cannot reach {}", config.server.url))?;
    let connection = client.connection().clone();
    let cache = CatalogCache::load(client)
        .await
        .context("loading artists")?;
    tracing::info!("catalog loaded: {} artists", cache.artists().len());

    // ── Player and dispatcher ────────────────────────────────────────────────
    let (exit_tx, exit_rx) = mpsc::unbounded_channel();
    let player = SignalPlayer::new(&config.player, exit_tx);
    let playback = PlaybackController::new(player, connection);
    let mut dispatcher = Dispatcher::new(cache, playback, keymap)
        .with_notifier(Notifier::new(config.notify.command.clone()))
        .with_state_dump(StateDump::new(config.state_dump.path.clone()));
    dispatcher.ensure_selection().await?;

    // ── Run TUI ──────────────────────────────────────────────────────────────
    app::App::new(dispatcher, &config.ui).run(exit_rx).await
}
