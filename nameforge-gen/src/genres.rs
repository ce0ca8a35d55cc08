//! Canonical genre vocabulary
//!
//! Provider tags ("classic rock", "Hip Hop", "edm", "shoegaze") are folded
//! onto a small canonical set shared by the normalizer, the genre matrix and
//! the pattern selector.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

pub const CANONICAL_GENRES: &[&str] = &[
    "rock", "metal", "punk", "indie", "pop", "electronic", "hip-hop", "rnb", "jazz", "blues",
    "folk", "country", "classical", "ambient", "soul", "funk", "reggae", "latin",
];

const GENRE_ALIASES: &[(&str, &str)] = &[
    ("classic rock", "rock"),
    ("hard rock", "rock"),
    ("alternative", "rock"),
    ("alternative rock", "rock"),
    ("grunge", "rock"),
    ("psychedelic rock", "rock"),
    ("prog rock", "rock"),
    ("progressive rock", "rock"),
    ("heavy metal", "metal"),
    ("death metal", "metal"),
    ("black metal", "metal"),
    ("thrash metal", "metal"),
    ("doom metal", "metal"),
    ("metalcore", "metal"),
    ("punk rock", "punk"),
    ("post-punk", "punk"),
    ("hardcore", "punk"),
    ("emo", "punk"),
    ("indie rock", "indie"),
    ("indie pop", "indie"),
    ("shoegaze", "indie"),
    ("dream pop", "indie"),
    ("synthpop", "pop"),
    ("dance pop", "pop"),
    ("k-pop", "pop"),
    ("electropop", "pop"),
    ("edm", "electronic"),
    ("electronica", "electronic"),
    ("house", "electronic"),
    ("techno", "electronic"),
    ("trance", "electronic"),
    ("dubstep", "electronic"),
    ("synthwave", "electronic"),
    ("idm", "electronic"),
    ("drum and bass", "electronic"),
    ("dance", "electronic"),
    ("hip hop", "hip-hop"),
    ("hiphop", "hip-hop"),
    ("rap", "hip-hop"),
    ("trap", "hip-hop"),
    ("r&b", "rnb"),
    ("rhythm and blues", "rnb"),
    ("bebop", "jazz"),
    ("swing", "jazz"),
    ("smooth jazz", "jazz"),
    ("jazz fusion", "jazz"),
    ("delta blues", "blues"),
    ("folk rock", "folk"),
    ("americana", "folk"),
    ("singer-songwriter", "folk"),
    ("bluegrass", "country"),
    ("orchestral", "classical"),
    ("baroque", "classical"),
    ("opera", "classical"),
    ("chillout", "ambient"),
    ("downtempo", "ambient"),
    ("new age", "ambient"),
    ("lo-fi", "ambient"),
    ("neo soul", "soul"),
    ("motown", "soul"),
    ("gospel", "soul"),
    ("disco", "funk"),
    ("ska", "reggae"),
    ("dub", "reggae"),
    ("dancehall", "reggae"),
    ("salsa", "latin"),
    ("reggaeton", "latin"),
    ("latin pop", "latin"),
    ("bossa nova", "latin"),
];

static ALIAS_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, &'static str> =
        CANONICAL_GENRES.iter().map(|g| (*g, *g)).collect();
    map.extend(GENRE_ALIASES.iter().copied());
    map
});

/// Sorted keys so fuzzy matching is deterministic
static SORTED_KEYS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut keys: Vec<&'static str> = ALIAS_MAP.keys().copied().collect();
    keys.sort_unstable();
    keys
});

fn clean(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a free-text genre onto the canonical set
///
/// Order: exact/alias match, then a canonical genre appearing as a word
/// ("experimental rock" -> rock), then fuzzy match for typos.
pub fn canonicalize(raw: &str) -> Option<&'static str> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Some(canonical) = ALIAS_MAP.get(cleaned.as_str()) {
        return Some(*canonical);
    }

    for word in cleaned.rsplit(|c: char| c.is_whitespace() || c == '-') {
        if let Some(canonical) = ALIAS_MAP.get(word) {
            return Some(*canonical);
        }
    }

    for key in SORTED_KEYS.iter() {
        if strsim::normalized_levenshtein(&cleaned, key) > 0.85 {
            debug!("Fuzzy matched genre '{}' to '{}'", raw, key);
            return ALIAS_MAP.get(key).copied();
        }
    }

    None
}

/// Split a blended genre ("jazz/rock", "folk + electronic") into canonical parts
pub fn parse_blend(raw: &str) -> Vec<&'static str> {
    if let Some(single) = ALIAS_MAP.get(clean(raw).as_str()) {
        return vec![*single];
    }

    let mut parts = Vec::new();
    for piece in raw.split(['/', '+', ',']) {
        if let Some(canonical) = canonicalize(piece) {
            if !parts.contains(&canonical) {
                parts.push(canonical);
            }
        }
    }
    parts
}
