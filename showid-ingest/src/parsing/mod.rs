//! Text parsers shared by the strategies and the track matcher
//!
//! - [`dates`] - date recognition and normalisation to `YYYY-MM-DD`
//! - [`location`] - venue / city / state recognition
//! - [`show_name`] - archive filename layouts
//! - [`track_name`] - track filename layouts

pub mod dates;
pub mod location;
pub mod show_name;
pub mod track_name;

pub use dates::{find_calendar_dates, find_month_first_date, find_show_date, DateQuality, FoundDate};
pub use location::{parse_location, ParsedLocation};
pub use show_name::{parse_show_name, ParsedShowName};
pub use track_name::{parse_track_name, ParsedTrackName};
