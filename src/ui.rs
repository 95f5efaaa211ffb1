//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`:
//! a header and status line, the artists | songs | details columns
//! (with the playlists panel below the now-playing details) and a
//! controls footer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Panel};
use crate::config::{ControlsSettings, TimeField, TrackDisplayField, UiSettings};
use crate::library::TrackId;
use crate::playback::{PlaybackState, PlaybackStatus};

/// Render the controls help text, incorporating scrub seconds and the
/// volume step.
fn controls_text(controls: &ControlsSettings) -> String {
    [
        "[tab] panel".to_string(),
        "[j/k] up/down".to_string(),
        "[gg/G] top/bottom".to_string(),
        "[enter] play selection".to_string(),
        "[space/p] play/pause".to_string(),
        "[x] stop".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] scrub -/+{}s", controls.scrub_seconds),
        format!("[-/+] volume {}%", controls.volume_step),
        "[/] filter".to_string(),
        "[n] new playlist".to_string(),
        "[a/r] add/remove in playlist".to_string(),
        "[D] delete playlist".to_string(),
        "[K] metadata".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format an optional duration, rounding up partial seconds.
fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Build the now-playing track text according to `ui` settings.
fn now_playing_track_text(app: &App, id: TrackId, ui: &UiSettings) -> String {
    let Some(track) = app.catalog.lookup(id) else {
        return "<unknown track>".to_string();
    };
    let mut parts: Vec<String> = Vec::new();

    for f in &ui.now_playing_track_fields {
        match f {
            TrackDisplayField::Display => {
                if !track.display.trim().is_empty() {
                    parts.push(track.display.clone());
                }
            }
            TrackDisplayField::Title => {
                if !track.title.trim().is_empty() {
                    parts.push(track.title.clone());
                }
            }
            TrackDisplayField::Artist => {
                if let Some(a) = track
                    .artist
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = track
                    .album
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = track.path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.trim().is_empty() {
                        parts.push(stem.to_string());
                    }
                }
            }
            TrackDisplayField::Path => {
                parts.push(track.path.display().to_string());
            }
        }
    }

    if parts.is_empty() {
        track.display.clone()
    } else {
        parts.join(&ui.now_playing_track_separator)
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn panel_block(title: &str, active: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if active {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn status_word(status: &PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Stopped => "Stopped",
        PlaybackStatus::Loading => "Loading",
        PlaybackStatus::Playing => "Playing",
        PlaybackStatus::Paused => "Paused",
        PlaybackStatus::Error(_) => "Error",
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    snapshot: &PlaybackState,
    visible_songs: &[TrackId],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tremolo ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status line
    let status = {
        let mut parts: Vec<String> = Vec::new();

        if app.filter_mode || !app.filter_query.trim().is_empty() {
            parts.push(format!("FILTER: {}", app.filter_query.trim()));
        }
        if app.follow_playback {
            parts.push("CURSOR: Follow".to_string());
        } else {
            parts.push("CURSOR: Free-roam".to_string());
        }
        if let Some(label) = &app.active_queue_label {
            parts.push(format!("Queue: {label}"));
        }
        parts.push(format!("Vol: {}%", snapshot.volume));
        parts.push(app.status_message.clone());

        parts.join(" • ")
    };
    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main columns: artists | songs | details + playlists
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(46),
            Constraint::Percentage(32),
        ])
        .split(chunks[2]);

    draw_artists(frame, app, columns[0]);
    draw_songs(frame, app, visible_songs, columns[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[2]);
    draw_details(frame, app, snapshot, ui_settings, right[0]);
    draw_playlists(frame, app, right[1]);

    // Overlay popups (keep the lists visible under them)
    if app.metadata_window {
        draw_metadata_popup(frame, app, visible_songs, chunks[2]);
    }
    if app.naming_mode {
        draw_naming_popup(frame, app, chunks[2]);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_artists(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .artist_labels()
        .iter()
        .map(|a| ListItem::new(a.as_str()))
        .collect();
    let list = List::new(items)
        .block(panel_block(" artists ", app.panel == Panel::Artists))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if !app.artist_labels().is_empty() {
        state.select(Some(app.artist_selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_songs(frame: &mut Frame, app: &App, visible: &[TrackId], area: Rect) {
    let q = app.filter_query.trim();

    // Center the selected item when possible by creating a visible window.
    // Only build ListItems for the window (avoid allocating the entire list).
    let total = visible.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.song_selected.min(total.saturating_sub(1));
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = if sel_pos > half { sel_pos - half } else { 0 };
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = visible[start..end]
        .iter()
        .map(|&id| {
            let Some(track) = app.catalog.lookup(id) else {
                return ListItem::new("<missing>");
            };
            let title = &track.display;
            if q.is_empty() {
                ListItem::new(title.as_str())
            } else if let Some(positions) = App::fuzzy_match_positions(title, q) {
                // Uppercase the matched characters to show the hit.
                let mut rendered = String::new();
                let mut pos_iter = positions.into_iter();
                let mut next_pos = pos_iter.next();

                for (ci, ch) in title.chars().enumerate() {
                    if next_pos == Some(ci) {
                        for up in ch.to_uppercase() {
                            rendered.push(up);
                        }
                        next_pos = pos_iter.next();
                    } else {
                        rendered.push(ch);
                    }
                }
                ListItem::new(rendered)
            } else {
                ListItem::new(title.as_str())
            }
        })
        .collect();

    let title = if app.filter_mode {
        " songs (filtering) "
    } else {
        " songs "
    };
    let list = List::new(visible_items)
        .block(panel_block(title, app.panel == Panel::Songs))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlists(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.playlist_names.is_empty() {
        vec![ListItem::new("<none — press n to create>")]
    } else {
        app.playlist_names
            .iter()
            .map(|n| ListItem::new(n.as_str()))
            .collect()
    };
    let list = List::new(items)
        .block(panel_block(" playlists ", app.panel == Panel::Playlists))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if !app.playlist_names.is_empty() {
        state.select(Some(app.playlist_selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_details(
    frame: &mut Frame,
    app: &App,
    snapshot: &PlaybackState,
    ui_settings: &UiSettings,
    area: Rect,
) {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Status: {}", status_word(&snapshot.status)));

    if let Some(id) = app.now_playing_id(snapshot.queue_position) {
        lines.push(format!(
            "Song: {}",
            now_playing_track_text(app, id, ui_settings)
        ));
        let total = app.catalog.lookup(id).and_then(|t| t.duration);
        if let Some(time) = now_playing_time_text(snapshot.elapsed, total, ui_settings) {
            lines.push(format!("Time: {time}"));
        }
        if let Some(pos) = snapshot.queue_position {
            lines.push(format!("Track {} of {}", pos + 1, app.active_queue.len()));
        }
    } else {
        lines.push("No track loaded".to_string());
    }

    lines.push(format!("Volume: {}%", snapshot.volume));

    if let PlaybackStatus::Error(_) = snapshot.status {
        if let Some(err) = &snapshot.last_error {
            lines.push(format!("Error: {err}"));
        }
    }

    let details = Paragraph::new(lines.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" now playing ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(details, area);
}

fn draw_metadata_popup(frame: &mut Frame, app: &App, visible: &[TrackId], area: Rect) {
    let popup_area = centered_rect_sized(72, 9, area);
    frame.render_widget(Clear, popup_area);

    let track = visible
        .get(app.song_selected)
        .and_then(|&id| app.catalog.lookup(id));
    let meta = if let Some(track) = track {
        format!(
            "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nPath: {}",
            track.title,
            track.artist.as_deref().unwrap_or("-"),
            track.album.as_deref().unwrap_or("-"),
            format_duration_mmss_ceil(track.duration),
            track.path.display()
        )
    } else {
        "No track selected".to_string()
    };
    let meta_paragraph = Paragraph::new(meta)
        .block(
            Block::default()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .borders(Borders::ALL)
                .title(" metadata (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(meta_paragraph, popup_area);
}

fn draw_naming_popup(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_sized(48, 3, area);
    frame.render_widget(Clear, popup_area);

    let input = Paragraph::new(format!("{}_", app.name_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" new playlist (enter saves, esc cancels) ")
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(input, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mmss_pads_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::ZERO), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
        assert_eq!(format_mmss(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn format_duration_ceil_rounds_up_partial_seconds() {
        assert_eq!(format_duration_mmss_ceil(None), "-");
        assert_eq!(
            format_duration_mmss_ceil(Some(Duration::from_millis(1500))),
            "0:02"
        );
        assert_eq!(
            format_duration_mmss_ceil(Some(Duration::from_secs(61))),
            "1:01"
        );
    }
}
