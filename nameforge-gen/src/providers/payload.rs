//! Raw provider payloads
//!
//! One variant per provider response shape. Adapters build these from the
//! wire format; `normalizer` is the only consumer.

use crate::types::Domain;
use serde::{Deserialize, Serialize};

/// Datamuse `/words` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatamuseWord {
    pub word: String,
    #[serde(default)]
    pub score: Option<f64>,
    /// Part-of-speech tags ("n", "adj", "v", "adv") plus Datamuse extras
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatamusePayload {
    pub query: String,
    pub words: Vec<DatamuseWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastFmArtistPayload {
    pub name: String,
    pub mbid: Option<String>,
    pub url: Option<String>,
    pub listeners: Option<u64>,
    pub tags: Vec<String>,
    pub similar: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastFmTrackMatch {
    pub name: String,
    pub artist: String,
    pub listeners: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastFmTrackPayload {
    pub query: String,
    pub tracks: Vec<LastFmTrackMatch>,
}

/// Top artists for a Last.fm tag (genre lookups)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastFmTagPayload {
    pub tag: String,
    pub artists: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: Option<u8>,
    pub followers: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyArtistPayload {
    pub query: String,
    pub artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    pub popularity: Option<u8>,
    pub artists: Vec<String>,
    pub album: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotifyTrackPayload {
    pub query: String,
    pub tracks: Vec<SpotifyTrack>,
}

/// Text completion; `lines` holds one suggestion or word per entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmCompletionPayload {
    pub topic: String,
    pub domain: Domain,
    pub model: String,
    pub lines: Vec<String>,
}

/// Tagged union of every provider response shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawPayload {
    Datamuse(DatamusePayload),
    LastFmArtist(LastFmArtistPayload),
    LastFmTrack(LastFmTrackPayload),
    LastFmTag(LastFmTagPayload),
    SpotifyArtist(SpotifyArtistPayload),
    SpotifyTrack(SpotifyTrackPayload),
    LlmCompletion(LlmCompletionPayload),
}

impl RawPayload {
    /// True when the response carries nothing usable
    pub fn is_empty(&self) -> bool {
        match self {
            RawPayload::Datamuse(p) => p.words.is_empty(),
            RawPayload::LastFmArtist(p) => p.name.trim().is_empty(),
            RawPayload::LastFmTrack(p) => p.tracks.is_empty(),
            RawPayload::LastFmTag(p) => p.artists.is_empty(),
            RawPayload::SpotifyArtist(p) => p.artists.is_empty(),
            RawPayload::SpotifyTrack(p) => p.tracks.is_empty(),
            RawPayload::LlmCompletion(p) => p.lines.iter().all(|l| l.trim().is_empty()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RawPayload::Datamuse(_) => "datamuse",
            RawPayload::LastFmArtist(_) => "lastfm_artist",
            RawPayload::LastFmTrack(_) => "lastfm_track",
            RawPayload::LastFmTag(_) => "lastfm_tag",
            RawPayload::SpotifyArtist(_) => "spotify_artist",
            RawPayload::SpotifyTrack(_) => "spotify_track",
            RawPayload::LlmCompletion(_) => "llm_completion",
        }
    }
}
