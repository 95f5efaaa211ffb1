use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Artist label used for tracks without an artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Clone)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
}

impl Track {
    /// The artist label shown in the artists panel.
    pub fn artist_label(&self) -> &str {
        self.artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
    }
}

/// Opaque identifier of a track inside a session's [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(usize);

/// Read-only registry of the tracks known to this session.
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Resolve a track id. Returns `None` for ids that do not belong to
    /// this catalog.
    pub fn lookup(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id.0)
    }

    /// All track ids in catalog (display) order.
    pub fn all_ids(&self) -> Vec<TrackId> {
        (0..self.tracks.len()).map(TrackId).collect()
    }

    /// Find the id of the track stored at `path`, if any. Used to
    /// resolve playlist entries, which are persisted by path.
    pub fn find_by_path(&self, path: &Path) -> Option<TrackId> {
        self.tracks
            .iter()
            .position(|t| t.path == path)
            .map(TrackId)
    }

    /// Sorted, deduplicated artist labels. Tracks without an artist tag
    /// are grouped under [`UNKNOWN_ARTIST`].
    pub fn artists(&self) -> Vec<String> {
        let mut artists: Vec<String> = self
            .tracks
            .iter()
            .map(|t| t.artist_label().to_string())
            .collect();
        artists.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        artists.dedup();
        artists
    }

    /// Ids of every track whose artist label matches `artist`, in
    /// catalog order.
    pub fn ids_by_artist(&self, artist: &str) -> Vec<TrackId> {
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.artist_label() == artist)
            .map(|(i, _)| TrackId(i))
            .collect()
    }
}
