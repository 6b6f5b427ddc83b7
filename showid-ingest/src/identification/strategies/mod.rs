//! Evidence Strategies
//!
//! Each strategy implements [`EvidenceStrategy`](crate::types::EvidenceStrategy)
//! and produces at most one weighted guess.
//!
//! | Strategy            | Needs              | Base | Cap |
//! |---------------------|--------------------|------|-----|
//! | `filename`          | -                  | 50   | 90  |
//! | `audio_tracklist`   | extraction         | 60   | 90  |
//! | `info_file`         | extraction         | 55   | 90  |
//! | `archive_structure` | extraction + LLM   | LLM  | 100 |
//! | `web_search`        | web search         | 50   | 85  |

pub mod archive_structure;
pub mod audio_tracklist;
pub mod filename;
pub mod info_file;
pub mod web_search;

pub use archive_structure::ArchiveStructureStrategy;
pub use audio_tracklist::AudioTracklistStrategy;
pub use filename::FilenameStrategy;
pub use info_file::InfoFileStrategy;
pub use web_search::WebSearchStrategy;

use crate::types::EvidenceStrategy;
use std::sync::Arc;

/// Built-in strategies in registration order (the confidence tie-break)
pub fn default_strategies() -> Vec<Arc<dyn EvidenceStrategy>> {
    vec![
        Arc::new(FilenameStrategy::new()),
        Arc::new(AudioTracklistStrategy::new()),
        Arc::new(InfoFileStrategy::new()),
        Arc::new(ArchiveStructureStrategy::new()),
        Arc::new(WebSearchStrategy::new()),
    ]
}
