//! showid-ingest - Live Show Ingest
//!
//! Command-line front end for the two engines:
//! - `identify <ARCHIVE>`: rank candidate shows for an archive or directory
//! - `match <AUDIO_DIR> <SETLIST_JSON>`: assign audio files to setlist songs
//!
//! Configuration is read from TOML (see `showid_common::config`); the language
//! model and web-search providers are not wired into the command line, so
//! strategies needing them are skipped.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use showid_common::config::{load_config, TomlConfig};
use showid_common::logging::init_tracing;
use showid_ingest::services::{LocalMediaScanner, MediaScanner};
use showid_ingest::{
    select_candidate, IdentificationResult, MatchedTrack, SetlistSong, ShowIdentifier,
    TrackMatcher,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line arguments for showid-ingest
#[derive(Parser, Debug)]
#[command(name = "showid-ingest")]
#[command(about = "Identify live concert archives and match their tracks to setlists")]
#[command(version)]
struct Args {
    /// Configuration file (overrides SHOWID_CONFIG)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify the show held in an archive or extracted directory
    Identify {
        archive: PathBuf,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Match audio files in a directory against a setlist
    Match {
        audio_dir: PathBuf,

        /// JSON array of `{ "title", "set", "position" }`
        setlist_json: PathBuf,

        /// Fold the encore into set 2
        #[arg(long)]
        encore_in_set2: bool,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    match args.command {
        Command::Identify { archive, json } => identify(&config, &archive, json).await,
        Command::Match {
            audio_dir,
            setlist_json,
            encore_in_set2,
            json,
        } => {
            let encore_in_set2 = encore_in_set2 || config.matching.encore_in_set2;
            match_setlist(&config, &audio_dir, &setlist_json, encore_in_set2, json).await
        }
    }
}

async fn identify(config: &TomlConfig, archive: &Path, json: bool) -> Result<()> {
    info!(archive = %archive.display(), "Identifying archive");

    let identifier = ShowIdentifier::with_default_strategies();
    let candidates = identifier.identify(archive, &config.identify, None, None).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No candidates for {}", archive.display());
        return Ok(());
    }

    for (rank, candidate) in candidates.iter().enumerate() {
        print_candidate(rank + 1, candidate);
    }

    if let Some(threshold) = config.identify.auto_accept_threshold {
        match select_candidate(&candidates, threshold) {
            Some(selected) => println!("\nAuto-accepted: {} ({})", selected.source, selected.confidence),
            None => println!("\nNo candidate reaches auto-accept threshold {}", threshold),
        }
    }

    Ok(())
}

fn print_candidate(rank: usize, candidate: &IdentificationResult) {
    let info = &candidate.show_info;
    println!("{}. [{}] {}", rank, candidate.confidence, candidate.source);
    println!(
        "   {} | {} | {}",
        info.artist().unwrap_or("?"),
        info.date().unwrap_or("?"),
        [info.venue(), info.city(), info.state(), info.country()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    );
    for line in &candidate.evidence {
        println!("     {}", line);
    }
}

async fn match_setlist(
    config: &TomlConfig,
    audio_dir: &Path,
    setlist_json: &Path,
    encore_in_set2: bool,
    json: bool,
) -> Result<()> {
    let setlist_text = tokio::fs::read_to_string(setlist_json)
        .await
        .with_context(|| format!("Failed to read setlist {}", setlist_json.display()))?;
    let setlist: Vec<SetlistSong> =
        serde_json::from_str(&setlist_text).context("Setlist is not a JSON array of songs")?;

    let scanner = LocalMediaScanner::new();
    let paths = scanner
        .list_audio_files(audio_dir)
        .await
        .with_context(|| format!("Failed to list audio in {}", audio_dir.display()))?;
    let audio_files = scanner
        .analyze_audio(&paths)
        .await
        .context("Failed to read audio tags")?;

    let matcher = TrackMatcher::from_config(&config.matching);
    let (tracks, method) = match matcher.match_tracks_with_method(&audio_files, &setlist, encore_in_set2) {
        Ok(matched) => matched,
        Err(mismatch) => {
            eprintln!("Audio files ({}):", mismatch.files.len());
            for file in &mismatch.files {
                eprintln!("  {}", file.file_path.display());
            }
            eprintln!("Setlist songs ({}):", mismatch.songs.len());
            for song in &mismatch.songs {
                eprintln!("  set {} #{} {}", song.set, song.position, song.title);
            }
            bail!(mismatch);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&tracks)?);
    } else {
        println!("Matched {} tracks by {}", tracks.len(), method);
        for track in &tracks {
            print_track(track);
        }
    }

    Ok(())
}

fn print_track(track: &MatchedTrack) {
    println!(
        "  set {} track {:>2}  {:<32} <- {}",
        track.effective_set,
        track.track_in_set,
        track.song.title,
        track.audio_file.file_name()
    );
}
