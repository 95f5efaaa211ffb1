use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::library::{Catalog, TrackId};

use super::model::Playlist;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist `{0}` already exists")]
    AlreadyExists(String),
    #[error("playlist `{0}` does not exist")]
    NotFound(String),
    #[error("`{0}` is not a valid playlist name")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed playlist file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk playlist collection: one `<name>.json` file per playlist.
///
/// Every mutation persists the affected file immediately, so a crash
/// never loses more than the in-flight edit.
pub struct PlaylistStore {
    dir: PathBuf,
    playlists: BTreeMap<String, Playlist>,
}

impl PlaylistStore {
    /// Open the store at `dir`, creating the directory if needed and
    /// loading every playlist file found there. Malformed files are
    /// skipped with a warning rather than failing the whole store.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PlaylistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let mut playlists = BTreeMap::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_playlist(&path) {
                Ok(playlist) => {
                    playlists.insert(playlist.name.clone(), playlist);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping malformed playlist file");
                }
            }
        }

        Ok(Self { dir, playlists })
    }

    fn read_playlist(path: &Path) -> Result<Playlist, PlaylistError> {
        let data = fs::read_to_string(path)?;
        let mut playlist: Playlist = serde_json::from_str(&data)?;
        if playlist.name.trim().is_empty() {
            // Fall back to the file stem for files written by hand.
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                playlist.name = stem.to_string();
            }
        }
        Ok(playlist)
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn persist(&self, name: &str) -> Result<(), PlaylistError> {
        let playlist = self
            .playlists
            .get(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        let data = serde_json::to_string_pretty(playlist)?;
        fs::write(self.file_for(name), data)?;
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), PlaylistError> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed.contains(std::path::MAIN_SEPARATOR)
            || trimmed.contains('/')
            || trimmed.starts_with('.')
        {
            return Err(PlaylistError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Playlist names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.playlists.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&Playlist> {
        self.playlists.get(name)
    }

    /// Create an empty playlist and persist it.
    pub fn create(&mut self, name: &str) -> Result<(), PlaylistError> {
        Self::validate_name(name)?;
        let name = name.trim();
        if self.playlists.contains_key(name) {
            return Err(PlaylistError::AlreadyExists(name.to_string()));
        }
        self.playlists.insert(name.to_string(), Playlist::new(name));
        self.persist(name)
    }

    /// Delete a playlist and its file.
    pub fn delete(&mut self, name: &str) -> Result<(), PlaylistError> {
        if self.playlists.remove(name).is_none() {
            return Err(PlaylistError::NotFound(name.to_string()));
        }
        let file = self.file_for(name);
        if file.exists() {
            fs::remove_file(file)?;
        }
        Ok(())
    }

    /// Append a track path to a playlist. Duplicate paths are ignored,
    /// matching how the original library behaves.
    pub fn add_track(&mut self, name: &str, path: impl Into<PathBuf>) -> Result<(), PlaylistError> {
        let path = path.into();
        let playlist = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        if !playlist.tracks.contains(&path) {
            playlist.tracks.push(path);
            self.persist(name)?;
        }
        Ok(())
    }

    /// Remove a track path from a playlist.
    pub fn remove_track(&mut self, name: &str, path: &Path) -> Result<(), PlaylistError> {
        let playlist = self
            .playlists
            .get_mut(name)
            .ok_or_else(|| PlaylistError::NotFound(name.to_string()))?;
        let before = playlist.tracks.len();
        playlist.tracks.retain(|p| p != path);
        if playlist.tracks.len() != before {
            self.persist(name)?;
        }
        Ok(())
    }

    /// Resolve a playlist to track ids against `catalog`.
    ///
    /// Returns `None` for unknown playlists. Paths missing from the
    /// catalog are skipped with a warning: they cannot be represented as
    /// session ids, and unreadable-but-present files still surface as
    /// playback errors when reached.
    pub fn resolve(&self, name: &str, catalog: &Catalog) -> Option<Vec<TrackId>> {
        let playlist = self.playlists.get(name)?;
        let mut ids = Vec::with_capacity(playlist.tracks.len());
        for path in &playlist.tracks {
            match catalog.find_by_path(path) {
                Some(id) => ids.push(id),
                None => {
                    warn!(playlist = name, path = %path.display(), "playlist entry not in library, skipping");
                }
            }
        }
        Some(ids)
    }
}
