//! Application model types: `App` and `Panel`.
//!
//! The `App` struct holds the current panel selections, search state and
//! the active queue. Playback state itself lives in the engine; the app
//! only keeps what is needed to map it back to tracks on screen.

use std::sync::Arc;

use crate::library::{Catalog, TrackId};
use crate::playback::StateHandle;

/// Synthetic first row of the artists panel that selects the whole library.
pub const ALL_ARTISTS: &str = "All Artists";

/// Which panel currently has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Artists,
    Songs,
    Playlists,
}

impl Panel {
    pub fn next(self) -> Self {
        match self {
            Panel::Artists => Panel::Songs,
            Panel::Songs => Panel::Playlists,
            Panel::Playlists => Panel::Artists,
        }
    }
}

/// The main application model.
pub struct App {
    pub catalog: Arc<Catalog>,
    pub panel: Panel,

    /// Artist labels for the artists panel; row 0 is [`ALL_ARTISTS`].
    artists: Vec<String>,
    pub artist_selected: usize,
    /// Index into [`App::visible_songs`].
    pub song_selected: usize,
    pub playlist_selected: usize,

    /// Playlist names, kept in sync with the store by the runtime.
    pub playlist_names: Vec<String>,

    pub filter_mode: bool,
    pub filter_query: String,

    /// Name-input mode for creating a playlist.
    pub naming_mode: bool,
    pub name_input: String,

    pub follow_playback: bool,
    pub status_message: String,

    /// The queue last handed to the engine; maps the engine's
    /// `queue_position` back to catalog tracks.
    pub active_queue: Vec<TrackId>,
    /// Where the active queue came from, for the status line.
    pub active_queue_label: Option<String>,

    pub state_handle: Option<StateHandle>,
    pub metadata_window: bool,
}

impl App {
    /// Create a new `App` over `catalog`.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let mut artists = vec![ALL_ARTISTS.to_string()];
        artists.extend(catalog.artists());

        Self {
            catalog,
            panel: Panel::Songs,
            artists,
            artist_selected: 0,
            song_selected: 0,
            playlist_selected: 0,
            playlist_names: Vec::new(),
            filter_mode: false,
            filter_query: String::new(),
            naming_mode: false,
            name_input: String::new(),
            follow_playback: true,
            status_message: "Welcome to tremolo".to_string(),
            active_queue: Vec::new(),
            active_queue_label: None,
            state_handle: None,
            metadata_window: false,
        }
    }

    /// Attach the engine's snapshot handle.
    pub fn set_state_handle(&mut self, handle: StateHandle) {
        self.state_handle = Some(handle);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn artist_labels(&self) -> &[String] {
        &self.artists
    }

    /// The artist narrowing the songs panel, if any.
    pub fn selected_artist(&self) -> Option<&str> {
        if self.artist_selected == 0 {
            None
        } else {
            self.artists.get(self.artist_selected).map(String::as_str)
        }
    }

    /// Track ids shown in the songs panel: the selected artist's tracks
    /// (or the whole library), narrowed by the fuzzy filter.
    pub fn visible_songs(&self) -> Vec<TrackId> {
        let base = match self.selected_artist() {
            Some(artist) => self.catalog.ids_by_artist(artist),
            None => self.catalog.all_ids(),
        };

        let query = self.filter_query.trim();
        if query.is_empty() {
            return base;
        }
        base.into_iter()
            .filter(|&id| {
                self.catalog
                    .lookup(id)
                    .is_some_and(|t| Self::fuzzy_match_positions(&t.display, query).is_some())
            })
            .collect()
    }

    /// The id under the songs cursor.
    pub fn selected_song_id(&self) -> Option<TrackId> {
        self.visible_songs().get(self.song_selected).copied()
    }

    /// The playlist name under the playlists cursor.
    pub fn selected_playlist(&self) -> Option<&str> {
        self.playlist_names
            .get(self.playlist_selected)
            .map(String::as_str)
    }

    /// Record the queue that was handed to the engine.
    pub fn set_active_queue(&mut self, queue: Vec<TrackId>, label: Option<String>) {
        self.active_queue = queue;
        self.active_queue_label = label;
    }

    /// Map an engine queue position back to a track id.
    pub fn now_playing_id(&self, queue_position: Option<usize>) -> Option<TrackId> {
        queue_position.and_then(|pos| self.active_queue.get(pos)).copied()
    }

    pub fn cycle_panel(&mut self) {
        self.panel = self.panel.next();
    }

    fn panel_len(&self) -> usize {
        match self.panel {
            Panel::Artists => self.artists.len(),
            Panel::Songs => self.visible_songs().len(),
            Panel::Playlists => self.playlist_names.len(),
        }
    }

    fn panel_cursor_mut(&mut self) -> &mut usize {
        match self.panel {
            Panel::Artists => &mut self.artist_selected,
            Panel::Songs => &mut self.song_selected,
            Panel::Playlists => &mut self.playlist_selected,
        }
    }

    /// Move the active panel's cursor down, wrapping at the end.
    pub fn select_next(&mut self) {
        let len = self.panel_len();
        if len == 0 {
            return;
        }
        let cursor = self.panel_cursor_mut();
        *cursor = (*cursor + 1) % len;
        self.after_cursor_move();
    }

    /// Move the active panel's cursor up, wrapping at the start.
    pub fn select_prev(&mut self) {
        let len = self.panel_len();
        if len == 0 {
            return;
        }
        let cursor = self.panel_cursor_mut();
        *cursor = if *cursor == 0 { len - 1 } else { *cursor - 1 };
        self.after_cursor_move();
    }

    /// Jump the active panel's cursor to the first row.
    pub fn select_first(&mut self) {
        *self.panel_cursor_mut() = 0;
        self.after_cursor_move();
    }

    /// Jump the active panel's cursor to the last row.
    pub fn select_last(&mut self) {
        let len = self.panel_len();
        if len == 0 {
            return;
        }
        *self.panel_cursor_mut() = len - 1;
        self.after_cursor_move();
    }

    fn after_cursor_move(&mut self) {
        // Changing artists invalidates the songs cursor.
        if self.panel == Panel::Artists {
            self.song_selected = 0;
        }
    }

    /// Clamp all cursors into their current ranges; call after anything
    /// that shrinks a list.
    pub fn clamp_selections(&mut self) {
        let songs = self.visible_songs().len();
        if self.song_selected >= songs {
            self.song_selected = songs.saturating_sub(1);
        }
        if self.artist_selected >= self.artists.len() {
            self.artist_selected = self.artists.len().saturating_sub(1);
        }
        let playlists = self.playlist_names.len();
        if self.playlist_selected >= playlists {
            self.playlist_selected = playlists.saturating_sub(1);
        }
    }

    /// Move the songs cursor onto `id` if it is visible.
    pub fn select_song_by_id(&mut self, id: TrackId) {
        if let Some(pos) = self.visible_songs().iter().position(|&v| v == id) {
            self.song_selected = pos;
        }
    }

    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Enter filter mode: the songs panel takes the cursor.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.panel = Panel::Songs;
        self.follow_playback_off();
        self.clamp_selections();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and leave filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.clamp_selections();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.clamp_selections();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.clamp_selections();
    }

    /// Enter name-input mode for a new playlist.
    pub fn enter_naming_mode(&mut self) {
        self.naming_mode = true;
        self.name_input.clear();
    }

    pub fn cancel_naming_mode(&mut self) {
        self.naming_mode = false;
        self.name_input.clear();
    }

    /// Leave naming mode and return the entered name.
    pub fn take_name_input(&mut self) -> String {
        self.naming_mode = false;
        std::mem::take(&mut self.name_input)
    }

    // Fuzzy/subsequence match: return the character positions (by char index)
    // in `title` that match the query, or None if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }
}
