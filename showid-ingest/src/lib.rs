//! showid-ingest library interface
//!
//! Two engines for bringing live-concert recordings into a collection:
//! - **Identification** ([`identification`]): which show an archive holds,
//!   from several independent evidence strategies fused into ranked candidates
//! - **Track matching** ([`matching`]): which audio file is which setlist song
//!
//! Both engines are pure with respect to their inputs. External capabilities
//! (archive extraction, media scanning, language model, web search) enter
//! through the traits in [`services`].

pub mod error;
pub mod identification;
pub mod matching;
pub mod parsing;
pub mod services;
pub mod types;

pub use crate::error::{ServiceError, StrategyError, TrackCountMismatchError};
pub use crate::identification::{select_candidate, ShowIdentifier};
pub use crate::matching::{match_tracks, MatchMethod, TrackMatcher};
pub use crate::types::{
    AudioFileRecord, EvidenceStrategy, IdentificationContext, IdentificationResult, MatchedTrack,
    SetlistSong, ShowInfo, StrategyCapabilities,
};
