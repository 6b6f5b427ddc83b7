//! Test Helper Utilities
//!
//! Shared fixtures for showid-ingest integration tests: scripted strategies
//! and collaborators, plus tracing capture.

#![allow(dead_code)]

pub mod log_capture;
pub mod mocks;

pub use log_capture::{capture_logs, LogCapture};
pub use mocks::{CannedSearch, ScriptedLlm, ScriptedStrategy};

use showid_ingest::{AudioFileRecord, SetlistSong, ShowInfo};

pub fn show(artist: Option<&str>, date: Option<&str>, venue: Option<&str>, city: Option<&str>) -> ShowInfo {
    ShowInfo {
        artist: artist.map(str::to_string),
        date: date.map(str::to_string),
        venue: venue.map(str::to_string),
        city: city.map(str::to_string),
        ..Default::default()
    }
}

/// Songs as `(title, set)`, numbered by position within each set
pub fn setlist(songs: &[(&str, u8)]) -> Vec<SetlistSong> {
    let mut positions = [0u32; 4];
    songs
        .iter()
        .map(|(title, set)| {
            positions[*set as usize] += 1;
            SetlistSong::new(*title, *set, positions[*set as usize])
        })
        .collect()
}

/// Untagged files, one per name
pub fn files(names: &[&str]) -> Vec<AudioFileRecord> {
    names
        .iter()
        .map(|name| AudioFileRecord::new(format!("/music/show/{}", name)))
        .collect()
}
