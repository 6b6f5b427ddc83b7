//! Venue / city / state recognition
//!
//! Three passes, each filling only what is still missing:
//! 1. `Venue, City, ST` or `City, ST` comma layout (or a trailing bare state code)
//! 2. Gazetteer lookup of known taping cities
//! 3. Venue-suffix heuristic (`... Coliseum`, `... Theatre`, ...)

use once_cell::sync::Lazy;
use regex::Regex;

/// Two-letter codes for US states and DC
pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

/// Known city
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownCity {
    pub name: &'static str,
    pub state: Option<&'static str>,
    pub country: &'static str,
}

const fn us(name: &'static str, state: &'static str) -> KnownCity {
    KnownCity { name, state: Some(state), country: "USA" }
}

const fn abroad(name: &'static str, country: &'static str) -> KnownCity {
    KnownCity { name, state: None, country }
}

/// Cities that show up often in concert recordings
pub const KNOWN_CITIES: &[KnownCity] = &[
    us("New York", "NY"),
    us("Brooklyn", "NY"),
    us("Buffalo", "NY"),
    us("Glens Falls", "NY"),
    us("Saratoga Springs", "NY"),
    us("Albany", "NY"),
    us("Boston", "MA"),
    us("Worcester", "MA"),
    us("Philadelphia", "PA"),
    us("Pittsburgh", "PA"),
    us("Hampton", "VA"),
    us("Richmond", "VA"),
    us("Washington", "DC"),
    us("Baltimore", "MD"),
    us("Atlanta", "GA"),
    us("Chicago", "IL"),
    us("Detroit", "MI"),
    us("Cleveland", "OH"),
    us("Cincinnati", "OH"),
    us("Columbus", "OH"),
    us("Nashville", "TN"),
    us("Memphis", "TN"),
    us("New Orleans", "LA"),
    us("Austin", "TX"),
    us("Dallas", "TX"),
    us("Houston", "TX"),
    us("Denver", "CO"),
    us("Boulder", "CO"),
    us("Morrison", "CO"),
    us("Las Vegas", "NV"),
    us("Los Angeles", "CA"),
    us("San Francisco", "CA"),
    us("Berkeley", "CA"),
    us("Oakland", "CA"),
    us("Mountain View", "CA"),
    us("Portland", "OR"),
    us("Seattle", "WA"),
    us("Burlington", "VT"),
    us("Providence", "RI"),
    us("Hartford", "CT"),
    us("New Haven", "CT"),
    us("Minneapolis", "MN"),
    us("Milwaukee", "WI"),
    us("St. Louis", "MO"),
    us("Kansas City", "MO"),
    us("Miami", "FL"),
    us("Orlando", "FL"),
    us("Raleigh", "NC"),
    us("Charlotte", "NC"),
    us("Asheville", "NC"),
    us("Athens", "GA"),
    abroad("London", "UK"),
    abroad("Manchester", "UK"),
    abroad("Glasgow", "UK"),
    abroad("Dublin", "Ireland"),
    abroad("Paris", "France"),
    abroad("Amsterdam", "Netherlands"),
    abroad("Berlin", "Germany"),
    abroad("Hamburg", "Germany"),
    abroad("Copenhagen", "Denmark"),
    abroad("Stockholm", "Sweden"),
    abroad("Tokyo", "Japan"),
    abroad("Toronto", "Canada"),
    abroad("Montreal", "Canada"),
    abroad("Vancouver", "Canada"),
];

const VENUE_SUFFIXES: &str = "Hall|Arena|Theat(?:re|er)|Coliseum|Colosseum|Center|Centre|Auditorium|Amphitheat(?:re|er)|Ballroom|Stadium|Garden|Gardens|Pavilion|Club|Fieldhouse|Gym|Gymnasium|Forum|Bowl|Dome|Civic|Music Hall|Opera House|Fillmore|Tavern|Lounge|Cafe|Bar";

/// Capitalised words ending in a venue noun
static VENUE_TITLE_CASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b((?:[A-Z][\w'&.]*\s+){{0,4}}(?:{}))\b",
        VENUE_SUFFIXES
    ))
    .expect("valid regex")
});

/// Lowercase fallback for names like `hampton_coliseum`
static VENUE_ANY_CASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b((?:[a-z][\w'&]*\s+){{1,2}}(?:{}))\b",
        VENUE_SUFFIXES
    ))
    .expect("valid regex")
});

static LEADING_FILLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:(?:live|at|@|from|in)\s+)+").expect("valid regex"));

/// Venue, city, state and country recognised in a text fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLocation {
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl ParsedLocation {
    pub fn is_empty(&self) -> bool {
        self.venue.is_none() && self.city.is_none() && self.state.is_none() && self.country.is_none()
    }
}

/// True for an uppercase US state code
pub fn is_state_code(token: &str) -> bool {
    token.len() == 2 && US_STATE_CODES.contains(&token)
}

/// Known city named somewhere in `text`, longest name first
pub fn find_known_city(text: &str) -> Option<&'static KnownCity> {
    let lower = text.to_lowercase();
    let mut candidates: Vec<&'static KnownCity> = KNOWN_CITIES.iter().collect();
    candidates.sort_by_key(|city| std::cmp::Reverse(city.name.len()));

    candidates
        .into_iter()
        .find(|city| contains_word(&lower, &city.name.to_lowercase()))
}

/// Exact (case-insensitive) gazetteer entry for a city name
pub fn lookup_city(name: &str) -> Option<&'static KnownCity> {
    KNOWN_CITIES.iter().find(|city| city.name.eq_ignore_ascii_case(name.trim()))
}

/// `needle` appears in `haystack` bounded by non-alphanumerics
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.' | ','));
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Strip "Live at" style filler from a venue candidate
pub fn clean_venue(text: &str) -> Option<String> {
    let stripped = LEADING_FILLER.replace(text.trim(), "");
    non_empty(&stripped)
}

/// Find a venue by its suffix noun
pub fn find_venue(text: &str) -> Option<String> {
    VENUE_TITLE_CASE
        .captures(text)
        .or_else(|| VENUE_ANY_CASE.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean_venue(m.as_str()))
}

/// Comma layout: `[Venue, ]City, ST[ ...]`
fn parse_comma_layout(text: &str, location: &mut ParsedLocation) -> bool {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();

    for i in 1..parts.len() {
        let Some(state) = parts[i].split_whitespace().next() else {
            continue;
        };
        if !is_state_code(state) {
            continue;
        }

        location.state = Some(state.to_string());
        location.city = non_empty(parts[i - 1]);
        if i >= 2 {
            location.venue = clean_venue(&parts[..i - 1].join(", "));
        }
        location.country = Some("USA".to_string());
        return true;
    }

    false
}

/// Parse a free-text location fragment
pub fn parse_location(text: &str) -> ParsedLocation {
    let text = text.replace('_', " ");
    let mut location = ParsedLocation::default();

    if !parse_comma_layout(&text, &mut location) {
        // Trailing bare state code: "Hampton Coliseum Hampton VA"
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if let Some(last) = tokens.last() {
            if tokens.len() > 1 && is_state_code(last) {
                location.state = Some(last.to_string());
                location.country = Some("USA".to_string());
            }
        }
    }

    if let Some(city) = location.city.as_deref().and_then(lookup_city) {
        location.city = Some(city.name.to_string());
        location.country = Some(city.country.to_string());
    } else if location.city.is_none() {
        if let Some(city) = find_known_city(&text) {
            location.city = Some(city.name.to_string());
            if location.state.is_none() {
                location.state = city.state.map(str::to_string);
            }
            location.country = Some(city.country.to_string());
        }
    }

    if location.venue.is_none() {
        location.venue = find_venue(&text);
    }

    location
}
