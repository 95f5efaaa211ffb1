//! Runtime wiring: settings, library scan, terminal setup and the
//! main event loop.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::library::{Catalog, scan};
use crate::playback::Player;
use crate::playlist::PlaylistStore;

mod event_loop;
mod settings;

pub fn run() -> anyhow::Result<()> {
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    info!(dir = %dir, "scanning library");
    let catalog = Arc::new(Catalog::new(scan(Path::new(&dir), &settings.library)));
    info!(tracks = catalog.len(), "library ready");

    let playlists_dir = settings
        .library
        .playlists_dir
        .clone()
        .unwrap_or_else(default_playlists_dir);
    let mut playlists = PlaylistStore::open(&playlists_dir)
        .with_context(|| format!("opening playlist store at {}", playlists_dir.display()))?;
    info!(playlists = playlists.names().len(), "playlist store ready");

    let player = Player::new(catalog.clone(), &settings.playback);

    let mut app = App::new(catalog);
    app.follow_playback = settings.ui.follow_playback;
    app.set_state_handle(player.state_handle());
    app.playlist_names = playlists.names();
    app.set_status(format!("Loaded {} tracks from {dir}", app.catalog.len()));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &player, &mut playlists);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.shutdown();

    run_result
}

fn default_playlists_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tremolo")
        .join("playlists")
}
