use super::display::display_from_fields;
use super::model::{Catalog, Track, UNKNOWN_ARTIST};
use crate::config::TrackDisplayField;
use std::path::{Path, PathBuf};

fn t(title: &str, artist: Option<&str>) -> Track {
    Track {
        path: PathBuf::from(format!("/music/{title}.mp3")),
        title: title.into(),
        artist: artist.map(Into::into),
        album: None,
        duration: None,
        display: title.into(),
    }
}

#[test]
fn display_from_fields_can_format_artist_title() {
    let p = Path::new("/tmp/Song.mp3");
    assert_eq!(
        display_from_fields(
            p,
            "Song",
            Some("Artist"),
            None,
            &[TrackDisplayField::Artist, TrackDisplayField::Title],
            " - ",
        ),
        "Artist - Song"
    );
    assert_eq!(
        display_from_fields(
            p,
            "Song",
            Some("  Artist  "),
            None,
            &[TrackDisplayField::Artist, TrackDisplayField::Title],
            " - ",
        ),
        "Artist - Song"
    );
    assert_eq!(
        display_from_fields(
            p,
            "Song",
            None,
            None,
            &[TrackDisplayField::Artist, TrackDisplayField::Title],
            " - ",
        ),
        "Song"
    );
}

#[test]
fn lookup_resolves_only_known_ids() {
    let catalog = Catalog::new(vec![t("Alpha", None), t("Beta", None)]);
    let ids = catalog.all_ids();
    assert_eq!(ids.len(), 2);
    assert_eq!(catalog.lookup(ids[0]).unwrap().title, "Alpha");
    assert_eq!(catalog.lookup(ids[1]).unwrap().title, "Beta");

    let other = Catalog::new(vec![t("Only", None)]);
    // Ids from a bigger catalog do not resolve in a smaller one.
    assert!(other.lookup(ids[1]).is_none());
}

#[test]
fn find_by_path_roundtrips() {
    let catalog = Catalog::new(vec![t("Alpha", None), t("Beta", None)]);
    let id = catalog.find_by_path(Path::new("/music/Beta.mp3")).unwrap();
    assert_eq!(catalog.lookup(id).unwrap().title, "Beta");
    assert!(catalog.find_by_path(Path::new("/music/Gamma.mp3")).is_none());
}

#[test]
fn artists_are_sorted_deduped_and_group_untagged_tracks() {
    let catalog = Catalog::new(vec![
        t("One", Some("Zebra")),
        t("Two", Some("aardvark")),
        t("Three", Some("Zebra")),
        t("Four", None),
        t("Five", Some("   ")),
    ]);

    let artists = catalog.artists();
    assert_eq!(artists, vec!["aardvark", UNKNOWN_ARTIST, "Zebra"]);
}

#[test]
fn ids_by_artist_selects_matching_tracks() {
    let catalog = Catalog::new(vec![
        t("One", Some("Zebra")),
        t("Two", Some("aardvark")),
        t("Three", Some("Zebra")),
        t("Four", None),
    ]);

    let zebra = catalog.ids_by_artist("Zebra");
    assert_eq!(zebra.len(), 2);
    assert_eq!(catalog.lookup(zebra[0]).unwrap().title, "One");
    assert_eq!(catalog.lookup(zebra[1]).unwrap().title, "Three");

    let unknown = catalog.ids_by_artist(UNKNOWN_ARTIST);
    assert_eq!(unknown.len(), 1);
    assert_eq!(catalog.lookup(unknown[0]).unwrap().title, "Four");
}
