use super::store::{PlaylistError, PlaylistStore};
use crate::library::{Catalog, Track};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn track(path: &str) -> Track {
    let title = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap()
        .to_string();
    Track {
        path: PathBuf::from(path),
        title: title.clone(),
        artist: None,
        album: None,
        duration: None,
        display: title,
    }
}

#[test]
fn create_add_and_reload_roundtrip() {
    let dir = tempdir().unwrap();

    {
        let mut store = PlaylistStore::open(dir.path()).unwrap();
        store.create("driving").unwrap();
        store.add_track("driving", "/music/a.mp3").unwrap();
        store.add_track("driving", "/music/b.mp3").unwrap();
        // duplicates are ignored
        store.add_track("driving", "/music/a.mp3").unwrap();
    }

    let store = PlaylistStore::open(dir.path()).unwrap();
    assert_eq!(store.names(), vec!["driving".to_string()]);
    let playlist = store.get("driving").unwrap();
    assert_eq!(
        playlist.tracks,
        vec![PathBuf::from("/music/a.mp3"), PathBuf::from("/music/b.mp3")]
    );
}

#[test]
fn create_rejects_duplicates_and_bad_names() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path()).unwrap();

    store.create("mix").unwrap();
    assert!(matches!(
        store.create("mix"),
        Err(PlaylistError::AlreadyExists(_))
    ));
    assert!(matches!(
        store.create(""),
        Err(PlaylistError::InvalidName(_))
    ));
    assert!(matches!(
        store.create("a/b"),
        Err(PlaylistError::InvalidName(_))
    ));
    assert!(matches!(
        store.create(".hidden"),
        Err(PlaylistError::InvalidName(_))
    ));
}

#[test]
fn remove_track_and_delete_update_disk() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path()).unwrap();

    store.create("mix").unwrap();
    store.add_track("mix", "/music/a.mp3").unwrap();
    store.add_track("mix", "/music/b.mp3").unwrap();
    store
        .remove_track("mix", Path::new("/music/a.mp3"))
        .unwrap();

    let reloaded = PlaylistStore::open(dir.path()).unwrap();
    assert_eq!(
        reloaded.get("mix").unwrap().tracks,
        vec![PathBuf::from("/music/b.mp3")]
    );

    store.delete("mix").unwrap();
    assert!(store.get("mix").is_none());
    assert!(!dir.path().join("mix.json").exists());
    assert!(matches!(
        store.delete("mix"),
        Err(PlaylistError::NotFound(_))
    ));
}

#[test]
fn open_skips_malformed_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let mut store = PlaylistStore::open(dir.path()).unwrap();
    assert!(store.names().is_empty());

    // The store still works after encountering a broken file.
    store.create("good").unwrap();
    assert_eq!(store.names(), vec!["good".to_string()]);
}

#[test]
fn resolve_maps_paths_to_catalog_ids_and_skips_unknown() {
    let dir = tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path()).unwrap();

    let catalog = Catalog::new(vec![track("/music/a.mp3"), track("/music/b.mp3")]);

    store.create("mix").unwrap();
    store.add_track("mix", "/music/b.mp3").unwrap();
    store.add_track("mix", "/music/gone.mp3").unwrap();
    store.add_track("mix", "/music/a.mp3").unwrap();

    let ids = store.resolve("mix", &catalog).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(catalog.lookup(ids[0]).unwrap().title, "b");
    assert_eq!(catalog.lookup(ids[1]).unwrap().title, "a");

    assert!(store.resolve("nope", &catalog).is_none());
}
