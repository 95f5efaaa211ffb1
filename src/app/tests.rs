use super::*;
use crate::library::{Catalog, Track};
use std::path::PathBuf;
use std::sync::Arc;

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

fn app_with(tracks: Vec<Track>) -> App {
    App::new(Arc::new(Catalog::new(tracks)))
}

#[test]
fn fuzzy_match_simple() {
    let title = "Hello World";
    assert!(App::fuzzy_match_positions(title, "hw").is_some());
    assert!(App::fuzzy_match_positions(title, "ello").is_some());
    assert!(App::fuzzy_match_positions(title, "xyz").is_none());
}

#[test]
fn visible_songs_respects_filter_query() {
    let mut app = app_with(vec![t("Alpha", None), t("Beta", None), t("Gamma", None)]);
    assert_eq!(app.visible_songs().len(), 3);

    app.push_filter_char('a');
    assert!(!app.visible_songs().is_empty());

    app.filter_query = "mtbk".into();
    assert!(app.visible_songs().is_empty());
}

#[test]
fn visible_songs_uses_fuzzy_not_substring_only() {
    let mut app = app_with(vec![
        t("Metallica - Blackened", None),
        t("Black Sabbath - Paranoid", None),
    ]);
    app.filter_query = "mtbk".into();

    let visible = app.visible_songs();
    assert_eq!(visible.len(), 1);
    assert_eq!(
        app.catalog.lookup(visible[0]).unwrap().title,
        "Metallica - Blackened"
    );
}

#[test]
fn artists_panel_narrows_songs() {
    let mut app = app_with(vec![
        t("One", Some("Abba")),
        t("Two", Some("Zappa")),
        t("Three", Some("Abba")),
    ]);

    // Row 0 is the synthetic "all artists" entry.
    assert_eq!(app.artist_labels()[0], ALL_ARTISTS);
    assert_eq!(app.visible_songs().len(), 3);

    app.panel = Panel::Artists;
    app.select_next(); // Abba
    assert_eq!(app.selected_artist(), Some("Abba"));
    assert_eq!(app.visible_songs().len(), 2);

    app.select_next(); // Zappa
    assert_eq!(app.selected_artist(), Some("Zappa"));
    assert_eq!(app.visible_songs().len(), 1);
}

#[test]
fn changing_artist_resets_song_cursor() {
    let mut app = app_with(vec![
        t("One", Some("Abba")),
        t("Two", Some("Zappa")),
        t("Three", Some("Abba")),
    ]);
    app.panel = Panel::Songs;
    app.select_next();
    assert_eq!(app.song_selected, 1);

    app.panel = Panel::Artists;
    app.select_next();
    assert_eq!(app.song_selected, 0);
}

#[test]
fn panel_cycle_covers_all_panels() {
    let mut app = app_with(vec![t("A", None)]);
    assert_eq!(app.panel, Panel::Songs);
    app.cycle_panel();
    assert_eq!(app.panel, Panel::Playlists);
    app.cycle_panel();
    assert_eq!(app.panel, Panel::Artists);
    app.cycle_panel();
    assert_eq!(app.panel, Panel::Songs);
}

#[test]
fn selection_wraps_within_panel() {
    let mut app = app_with(vec![t("A", None), t("B", None)]);
    app.panel = Panel::Songs;

    app.select_prev();
    assert_eq!(app.song_selected, 1);
    app.select_next();
    assert_eq!(app.song_selected, 0);

    app.select_last();
    assert_eq!(app.song_selected, 1);
    app.select_first();
    assert_eq!(app.song_selected, 0);
}

#[test]
fn selection_is_safe_on_empty_panels() {
    let mut app = app_with(Vec::new());
    app.panel = Panel::Songs;
    app.select_next();
    app.select_prev();
    app.select_last();
    assert_eq!(app.song_selected, 0);

    app.panel = Panel::Playlists;
    app.select_next();
    assert_eq!(app.playlist_selected, 0);
    assert_eq!(app.selected_playlist(), None);
}

#[test]
fn filter_clamps_song_cursor() {
    let mut app = app_with(vec![t("Alpha", None), t("Beta", None), t("Gamma", None)]);
    app.panel = Panel::Songs;
    app.select_last();
    assert_eq!(app.song_selected, 2);

    app.enter_filter_mode();
    app.push_filter_char('b'); // only Beta remains
    assert_eq!(app.visible_songs().len(), 1);
    assert_eq!(app.song_selected, 0);
    assert_eq!(app.catalog.lookup(app.selected_song_id().unwrap()).unwrap().title, "Beta");

    app.clear_filter();
    assert!(!app.filter_mode);
    assert_eq!(app.visible_songs().len(), 3);
}

#[test]
fn naming_mode_collects_and_returns_input() {
    let mut app = app_with(vec![t("A", None)]);
    app.enter_naming_mode();
    assert!(app.naming_mode);
    app.name_input.push('m');
    app.name_input.push('i');
    app.name_input.push('x');
    assert_eq!(app.take_name_input(), "mix");
    assert!(!app.naming_mode);
    assert!(app.name_input.is_empty());
}

#[test]
fn active_queue_maps_engine_positions_to_tracks() {
    let mut app = app_with(vec![t("A", None), t("B", None), t("C", None)]);
    let ids = app.catalog.all_ids();
    app.set_active_queue(vec![ids[2], ids[0]], Some("mix".into()));

    assert_eq!(app.now_playing_id(Some(0)), Some(ids[2]));
    assert_eq!(app.now_playing_id(Some(1)), Some(ids[0]));
    assert_eq!(app.now_playing_id(Some(9)), None);
    assert_eq!(app.now_playing_id(None), None);
}

#[test]
fn select_song_by_id_moves_cursor_when_visible() {
    let mut app = app_with(vec![t("A", Some("X")), t("B", Some("Y")), t("C", Some("X"))]);
    let ids = app.catalog.all_ids();

    app.select_song_by_id(ids[2]);
    assert_eq!(app.song_selected, 2);

    // Narrow to artist Y; A and C are no longer visible, cursor stays.
    app.panel = Panel::Artists;
    app.artist_selected = app
        .artist_labels()
        .iter()
        .position(|a| a == "Y")
        .unwrap();
    app.panel = Panel::Songs;
    app.song_selected = 0;
    app.select_song_by_id(ids[0]);
    assert_eq!(app.song_selected, 0);
}
