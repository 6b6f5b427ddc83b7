//! Track-to-Setlist Matcher
//!
//! Assigns each audio file to exactly one setlist song.
//!
//! # Architecture
//! An ordered fallback chain; the first step whose precondition holds and
//! which accepts its own result wins:
//!
//! 1. **Tag title** - fuzzy match on tag titles (every file tagged)
//! 2. **Filename title** - fuzzy match on titles parsed from filenames
//! 3. **Tag track number** - sort by (disc, track), assign positionally
//! 4. **Filename position** - sort by parsed (set, track), assign positionally
//! 5. **Natural sort** - numeric-aware filename order, assign positionally
//!
//! Step 5 has no precondition, so the chain only fails when the file count
//! and song count differ.

pub mod natural_sort;
pub mod similarity;

pub use natural_sort::natural_cmp;
pub use similarity::{normalize_title, title_similarity};

use crate::error::TrackCountMismatchError;
use crate::parsing::track_name::parse_track_name;
use crate::types::{AudioFileRecord, MatchedTrack, SetlistSong, ENCORE_SET};
use serde::{Deserialize, Serialize};
use showid_common::config::MatchingConfig;
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};

/// Minimum similarity for a fuzzy step to be accepted
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.5;

/// Fallback step that produced an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    TagTitle,
    FilenameTitle,
    TagTrackNumber,
    FilenamePosition,
    NaturalSort,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::TagTitle => "tag_title",
            MatchMethod::FilenameTitle => "filename_title",
            MatchMethod::TagTrackNumber => "tag_track_number",
            MatchMethod::FilenamePosition => "filename_position",
            MatchMethod::NaturalSort => "natural_sort",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Setlist entry with its post-merge numbering
#[derive(Debug, Clone)]
struct EffectiveSong<'a> {
    song: &'a SetlistSong,
    set: u8,
    track_in_set: u32,
}

/// Move encore songs to the end of set 2
///
/// Every set-3 song becomes set 2 with `position = (set-2 count) + position`.
/// List order is preserved.
pub fn apply_encore_merge(setlist: &[SetlistSong]) -> Vec<SetlistSong> {
    let set2_count = setlist.iter().filter(|song| song.set == 2).count() as u32;

    setlist
        .iter()
        .map(|song| {
            if song.set == ENCORE_SET {
                SetlistSong::new(song.title.clone(), 2, set2_count + song.position)
            } else {
                song.clone()
            }
        })
        .collect()
}

/// Pair each song with its set and 1-indexed position in that set
fn effective_setlist(setlist: &[SetlistSong]) -> Vec<EffectiveSong<'_>> {
    let mut seen_per_set: Vec<(u8, u32)> = Vec::new();

    setlist
        .iter()
        .map(|song| {
            let set = song.set;
            let track_in_set = match seen_per_set.iter_mut().find(|(s, _)| *s == set) {
                Some((_, count)) => {
                    *count += 1;
                    *count
                }
                None => {
                    seen_per_set.push((set, 1));
                    1
                }
            };
            EffectiveSong { song, set, track_in_set }
        })
        .collect()
}

/// Track matcher with a configurable fuzzy acceptance threshold
#[derive(Debug, Clone, Copy)]
pub struct TrackMatcher {
    fuzzy_threshold: f64,
}

impl Default for TrackMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl TrackMatcher {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.fuzzy_threshold)
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Match files to songs
    ///
    /// # Errors
    /// [`TrackCountMismatchError`] when the counts differ; never otherwise
    pub fn match_tracks(
        &self,
        audio_files: &[AudioFileRecord],
        setlist: &[SetlistSong],
        encore_in_set2: bool,
    ) -> Result<Vec<MatchedTrack>, TrackCountMismatchError> {
        self.match_tracks_with_method(audio_files, setlist, encore_in_set2)
            .map(|(tracks, _)| tracks)
    }

    /// Match files to songs, reporting which fallback step succeeded
    ///
    /// Output is in setlist order.
    pub fn match_tracks_with_method(
        &self,
        audio_files: &[AudioFileRecord],
        setlist: &[SetlistSong],
        encore_in_set2: bool,
    ) -> Result<(Vec<MatchedTrack>, MatchMethod), TrackCountMismatchError> {
        if audio_files.len() != setlist.len() {
            return Err(TrackCountMismatchError {
                files: audio_files.to_vec(),
                songs: setlist.to_vec(),
            });
        }

        let merged = if encore_in_set2 {
            apply_encore_merge(setlist)
        } else {
            setlist.to_vec()
        };
        let songs = effective_setlist(&merged);
        if audio_files.is_empty() {
            return Ok((Vec::new(), MatchMethod::NaturalSort));
        }

        let (assignment, method) = self.assign(audio_files, &songs);

        let mut tracks: Vec<(usize, MatchedTrack)> = assignment
            .into_iter()
            .map(|(file_index, song_index)| {
                let effective = &songs[song_index];
                (
                    song_index,
                    MatchedTrack {
                        audio_file: audio_files[file_index].clone(),
                        song: effective.song.clone(),
                        effective_set: effective.set,
                        track_in_set: effective.track_in_set,
                    },
                )
            })
            .collect();
        tracks.sort_by_key(|(song_index, _)| *song_index);

        info!(
            method = %method,
            tracks = tracks.len(),
            encore_in_set2,
            "Matched audio files to setlist"
        );

        Ok((tracks.into_iter().map(|(_, track)| track).collect(), method))
    }

    /// Run the fallback chain; returns `(file_index, song_index)` pairs
    fn assign(&self, files: &[AudioFileRecord], songs: &[EffectiveSong<'_>]) -> (Vec<(usize, usize)>, MatchMethod) {
        // 1. Tag titles
        let tag_titles: Option<Vec<String>> = files
            .iter()
            .map(|file| file.title().map(str::to_string))
            .collect();
        match tag_titles {
            Some(titles) => {
                if let Some(pairs) = self.fuzzy_assign(&titles, songs) {
                    return (pairs, MatchMethod::TagTitle);
                }
                debug!("Tag-title match below threshold, falling back");
            }
            None => debug!("Not every file has a tag title, skipping tag-title match"),
        }

        // 2. Titles parsed from filenames
        let parsed: Vec<_> = files
            .iter()
            .map(|file| parse_track_name(&file.file_name()))
            .collect();
        let filename_titles: Option<Vec<String>> = parsed.iter().map(|p| p.title.clone()).collect();
        match filename_titles {
            Some(titles) => {
                if let Some(pairs) = self.fuzzy_assign(&titles, songs) {
                    return (pairs, MatchMethod::FilenameTitle);
                }
                debug!("Filename-title match below threshold, falling back");
            }
            None => debug!("Not every filename carries a title, skipping filename-title match"),
        }

        // 3. Track-number tags
        if files.iter().all(|file| file.track_number.is_some()) {
            let mut order: Vec<usize> = (0..files.len()).collect();
            order.sort_by_key(|&i| {
                (
                    files[i].disc_number.unwrap_or(1),
                    files[i].track_number.unwrap_or(0),
                )
            });
            return (positional(order), MatchMethod::TagTrackNumber);
        }
        debug!("Not every file has a track-number tag, skipping tag track-number match");

        // 4. Track numbers parsed from filenames
        if parsed.iter().all(|p| p.track.is_some()) {
            let any_set = parsed.iter().any(|p| p.set.is_some());
            let mut order: Vec<usize> = (0..files.len()).collect();
            order.sort_by_key(|&i| {
                let set = if any_set { parsed[i].set.unwrap_or(1) } else { 0 };
                (set, parsed[i].track.unwrap_or(0))
            });
            return (positional(order), MatchMethod::FilenamePosition);
        }
        debug!("Not every filename carries a track number, using natural sort");

        // 5. Natural filename order
        let names: Vec<String> = files.iter().map(AudioFileRecord::file_name).collect();
        let mut order: Vec<usize> = (0..files.len()).collect();
        order.sort_by(|&a, &b| {
            natural_cmp(&names[a], &names[b])
                .then_with(|| files[a].file_path.cmp(&files[b].file_path))
        });
        (positional(order), MatchMethod::NaturalSort)
    }

    /// Greedy fuzzy assignment in file order
    ///
    /// Each file takes its most similar unused song (ties → earliest song).
    /// Returns `None` as soon as any file's best score is below threshold.
    fn fuzzy_assign(&self, titles: &[String], songs: &[EffectiveSong<'_>]) -> Option<Vec<(usize, usize)>> {
        let mut used = vec![false; songs.len()];
        let mut pairs = Vec::with_capacity(titles.len());

        for (file_index, title) in titles.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (song_index, effective) in songs.iter().enumerate() {
                if used[song_index] {
                    continue;
                }
                let score = title_similarity(title, &effective.song.title);
                if best.map_or(true, |(_, best_score)| score.partial_cmp(&best_score) == Some(Ordering::Greater)) {
                    best = Some((song_index, score));
                }
            }

            let (song_index, score) = best?;
            if score < self.fuzzy_threshold {
                debug!(
                    title = %title,
                    best = %songs[song_index].song.title,
                    score,
                    threshold = self.fuzzy_threshold,
                    "Fuzzy title match rejected"
                );
                return None;
            }
            used[song_index] = true;
            pairs.push((file_index, song_index));
        }

        Some(pairs)
    }
}

/// Sorted file `i` → song `i`
fn positional(order: Vec<usize>) -> Vec<(usize, usize)> {
    order.into_iter().enumerate().map(|(song_index, file_index)| (file_index, song_index)).collect()
}

/// Match with the default threshold
pub fn match_tracks(
    audio_files: &[AudioFileRecord],
    setlist: &[SetlistSong],
    encore_in_set2: bool,
) -> Result<Vec<MatchedTrack>, TrackCountMismatchError> {
    TrackMatcher::default().match_tracks(audio_files, setlist, encore_in_set2)
}
