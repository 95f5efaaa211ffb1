use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Panel};
use crate::config::Settings;
use crate::library::TrackId;
use crate::playback::{CommandError, PlaybackStatus, Player};
use crate::playlist::PlaylistStore;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pending_gg: bool,
    /// Last now-playing id the cursor snapped to, so follow mode does
    /// not fight manual navigation on every frame.
    last_followed: Option<TrackId>,
}

/// Main terminal event loop: handles input, UI drawing and sync with
/// the playback engine. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &Settings,
    app: &mut App,
    player: &Player,
    playlists: &mut PlaylistStore,
) -> anyhow::Result<()> {
    let mut state = EventLoopState {
        pending_gg: false,
        last_followed: None,
    };

    loop {
        // Read through the app's attached handle; fall back to asking
        // the player directly if no handle was attached.
        let snapshot = app
            .state_handle
            .as_ref()
            .and_then(|handle| handle.lock().ok().map(|s| s.clone()))
            .unwrap_or_else(|| player.snapshot());

        // Keep the songs cursor on the now-playing track when following.
        if app.follow_playback && !app.filter_mode {
            if let Some(id) = app.now_playing_id(snapshot.queue_position) {
                if state.last_followed != Some(id) {
                    app.select_song_by_id(id);
                    state.last_followed = Some(id);
                }
            }
        }

        let visible = app.visible_songs();
        terminal.draw(|f| {
            ui::draw(f, app, &snapshot, &visible, &settings.ui, &settings.controls)
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, playlists, &mut state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_key_event(
    key: KeyEvent,
    settings: &Settings,
    app: &mut App,
    player: &Player,
    playlists: &mut PlaylistStore,
    state: &mut EventLoopState,
) -> anyhow::Result<bool> {
    if app.naming_mode {
        match key.code {
            KeyCode::Esc => app.cancel_naming_mode(),
            KeyCode::Backspace => {
                app.name_input.pop();
            }
            KeyCode::Enter => {
                let name = app.take_name_input();
                match playlists.create(name.trim()) {
                    Ok(()) => {
                        app.playlist_names = playlists.names();
                        app.set_status(format!("Created playlist: {}", name.trim()));
                    }
                    Err(e) => app.set_status(e.to_string()),
                }
            }
            KeyCode::Char(c) if !c.is_control() => app.name_input.push(c),
            _ => {}
        }
        return Ok(false);
    }

    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Enter => {
                app.exit_filter_mode();
                play_selected_song(app, player);
            }
            KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return Ok(true);
        }
        KeyCode::Tab => {
            state.pending_gg = false;
            app.cycle_panel();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.select_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.select_prev();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            activate_selection(app, player, playlists);
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            state.pending_gg = false;
            toggle_play_pause(app, player);
        }
        KeyCode::Char('x') => {
            state.pending_gg = false;
            match player.stop() {
                Ok(()) => app.set_status("Stopped"),
                Err(e) => app.set_status(e.to_string()),
            }
        }
        KeyCode::Char('l') | KeyCode::Char('>') => {
            state.pending_gg = false;
            skip(app, player, true);
        }
        KeyCode::Char('h') | KeyCode::Char('<') => {
            state.pending_gg = false;
            skip(app, player, false);
        }
        KeyCode::Char('L') | KeyCode::Right => {
            state.pending_gg = false;
            scrub(app, player, true, settings.controls.scrub_seconds);
        }
        KeyCode::Char('H') | KeyCode::Left => {
            state.pending_gg = false;
            scrub(app, player, false, settings.controls.scrub_seconds);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.pending_gg = false;
            change_volume(app, player, true, settings.controls.volume_step);
        }
        KeyCode::Char('-') => {
            state.pending_gg = false;
            change_volume(app, player, false, settings.controls.volume_step);
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Char('n') => {
            state.pending_gg = false;
            app.enter_naming_mode();
        }
        KeyCode::Char('a') => {
            state.pending_gg = false;
            add_selected_to_playlist(app, playlists);
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            remove_selected_from_playlist(app, playlists);
        }
        KeyCode::Char('D') => {
            state.pending_gg = false;
            delete_selected_playlist(app, playlists);
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.toggle_metadata_window();
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    Ok(false)
}

/// Enter on the active panel: pick an artist, play a song, or play a
/// playlist.
fn activate_selection(app: &mut App, player: &Player, playlists: &mut PlaylistStore) {
    match app.panel {
        Panel::Artists => {
            let artist = app
                .artist_labels()
                .get(app.artist_selected)
                .cloned()
                .unwrap_or_default();
            app.panel = Panel::Songs;
            app.song_selected = 0;
            app.set_status(format!("Browsing: {artist}"));
        }
        Panel::Songs => play_selected_song(app, player),
        Panel::Playlists => play_selected_playlist(app, player, playlists),
    }
}

/// Load the visible song list as the active queue, starting at the
/// cursor.
fn play_selected_song(app: &mut App, player: &Player) {
    let visible = app.visible_songs();
    if visible.is_empty() {
        app.set_status("No songs to play");
        return;
    }
    let index = app.song_selected.min(visible.len() - 1);
    let title = app
        .catalog
        .lookup(visible[index])
        .map(|t| t.display.clone())
        .unwrap_or_default();
    let label = app
        .selected_artist()
        .map(str::to_string)
        .unwrap_or_else(|| "Library".to_string());

    match player.load(visible.clone(), index) {
        Ok(()) => {
            app.set_active_queue(visible, Some(label));
            app.follow_playback_on();
            app.set_status(format!("Playing: {title}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
}

fn play_selected_playlist(app: &mut App, player: &Player, playlists: &mut PlaylistStore) {
    let Some(name) = app.selected_playlist().map(str::to_string) else {
        app.set_status("No playlist selected (press n to create one)");
        return;
    };
    let Some(ids) = playlists.resolve(&name, &app.catalog) else {
        app.set_status(format!("Playlist not found: {name}"));
        return;
    };
    if ids.is_empty() {
        app.set_status(format!("Playlist {name} has no playable tracks"));
        return;
    }
    let stored = playlists.get(&name).map(|p| p.tracks.len()).unwrap_or(0);
    let skipped = stored.saturating_sub(ids.len());

    match player.load(ids.clone(), 0) {
        Ok(()) => {
            app.set_active_queue(ids, Some(name.clone()));
            app.follow_playback_on();
            if skipped > 0 {
                app.set_status(format!(
                    "Playing playlist: {name} ({skipped} entries not in library)"
                ));
            } else {
                app.set_status(format!("Playing playlist: {name}"));
            }
        }
        Err(e) => app.set_status(e.to_string()),
    }
}

fn toggle_play_pause(app: &mut App, player: &Player) {
    // With nothing loaded yet, space starts the visible list, the way
    // the original player picks up the library on first play.
    if app.active_queue.is_empty() {
        play_selected_song(app, player);
        return;
    }
    match player.play_pause() {
        Ok(()) => {
            let status = match player.snapshot().status {
                PlaybackStatus::Playing | PlaybackStatus::Loading => "Playing",
                PlaybackStatus::Paused => "Paused",
                PlaybackStatus::Stopped => "Stopped",
                PlaybackStatus::Error(_) => "Error",
            };
            app.set_status(status);
        }
        Err(e) => app.set_status(e.to_string()),
    }
}

fn skip(app: &mut App, player: &Player, forward: bool) {
    let result = if forward { player.next() } else { player.prev() };
    match result {
        Ok(()) => {
            app.follow_playback_on();
            app.set_status(if forward {
                "Next track"
            } else {
                "Previous track"
            });
        }
        Err(e) => app.set_status(e.to_string()),
    }
}

fn scrub(app: &mut App, player: &Player, forward: bool, seconds: u64) {
    let elapsed = player.snapshot().elapsed;
    let delta = Duration::from_secs(seconds);
    let target = if forward {
        elapsed + delta
    } else {
        elapsed.saturating_sub(delta)
    };
    match player.seek_to(target) {
        Ok(()) => {}
        Err(CommandError::SeekUnsupported) => app.set_status("This track cannot seek"),
        Err(e) => app.set_status(e.to_string()),
    }
}

fn change_volume(app: &mut App, player: &Player, up: bool, step: u8) {
    let current = player.snapshot().volume;
    let target = if up {
        current.saturating_add(step).min(100)
    } else {
        current.saturating_sub(step)
    };
    match player.set_volume(target) {
        Ok(()) => app.set_status(format!("Volume: {target}%")),
        Err(e) => app.set_status(e.to_string()),
    }
}

fn add_selected_to_playlist(app: &mut App, playlists: &mut PlaylistStore) {
    let Some(id) = app.selected_song_id() else {
        app.set_status("No song selected");
        return;
    };
    let Some(name) = app.selected_playlist().map(str::to_string) else {
        app.set_status("No playlist selected (press n to create one)");
        return;
    };
    let Some((path, display)) = app
        .catalog
        .lookup(id)
        .map(|t| (t.path.clone(), t.display.clone()))
    else {
        return;
    };

    match playlists.add_track(&name, path) {
        Ok(()) => app.set_status(format!("Added to {name}: {display}")),
        Err(e) => app.set_status(e.to_string()),
    }
}

fn remove_selected_from_playlist(app: &mut App, playlists: &mut PlaylistStore) {
    let Some(id) = app.selected_song_id() else {
        app.set_status("No song selected");
        return;
    };
    let Some(name) = app.selected_playlist().map(str::to_string) else {
        app.set_status("No playlist selected");
        return;
    };
    let Some((path, display)) = app
        .catalog
        .lookup(id)
        .map(|t| (t.path.clone(), t.display.clone()))
    else {
        return;
    };

    match playlists.remove_track(&name, &path) {
        Ok(()) => app.set_status(format!("Removed from {name}: {display}")),
        Err(e) => app.set_status(e.to_string()),
    }
}

fn delete_selected_playlist(app: &mut App, playlists: &mut PlaylistStore) {
    let Some(name) = app.selected_playlist().map(str::to_string) else {
        app.set_status("No playlist selected");
        return;
    };
    match playlists.delete(&name) {
        Ok(()) => {
            app.playlist_names = playlists.names();
            app.clamp_selections();
            app.set_status(format!("Deleted playlist: {name}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
}
