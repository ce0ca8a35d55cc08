//! Theme profiles
//!
//! A theme is a small themed vocabulary plus the keywords, moods and genres
//! that call for it. The selected theme biases slot draws for dynamic and
//! fused patterns.

use crate::random::{RandomExt, RandomSource};
use crate::words::SlotBias;

/// Probability a biased slot draws from the theme lists
const THEME_BIAS_WEIGHT: f64 = 0.6;

#[derive(Debug)]
pub struct ThemeProfile {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub moods: &'static [&'static str],
    pub genres: &'static [&'static str],
    pub adjectives: &'static [&'static str],
    pub nouns: &'static [&'static str],
    pub verbs: &'static [&'static str],
}

impl ThemeProfile {
    pub fn bias(&self) -> SlotBias<'static> {
        SlotBias {
            adjectives: self.adjectives,
            nouns: self.nouns,
            verbs: self.verbs,
            weight: THEME_BIAS_WEIGHT,
        }
    }

    /// Overlap score against request context
    pub fn affinity(&self, keywords: &[String], genre: Option<&str>, mood: Option<&str>) -> f64 {
        let keyword_hits = keywords
            .iter()
            .filter(|k| {
                let k = k.as_str();
                self.keywords.contains(&k) || self.nouns.contains(&k) || self.adjectives.contains(&k)
            })
            .count() as f64;
        let mood_hit = mood.map_or(false, |m| self.moods.contains(&m));
        let genre_hit = genre.map_or(false, |g| self.genres.contains(&g));

        keyword_hits + if mood_hit { 2.0 } else { 0.0 } + if genre_hit { 2.0 } else { 0.0 }
    }
}

pub static THEMES: &[ThemeProfile] = &[
    ThemeProfile {
        name: "cosmic",
        keywords: &["space", "star", "galaxy", "planet", "orbit", "cosmos", "moon", "nebula"],
        moods: &["mysterious", "uplifting", "chill"],
        genres: &["electronic", "ambient", "rock"],
        adjectives: &["astral", "celestial", "lunar", "stellar", "infinite", "orbital", "cosmic"],
        nouns: &["comet", "nebula", "orbit", "quasar", "eclipse", "satellite", "galaxy"],
        verbs: &["drift", "orbit", "collide", "shine", "launch"],
    },
    ThemeProfile {
        name: "nature",
        keywords: &["forest", "river", "mountain", "tree", "rain", "earth", "valley", "wild"],
        moods: &["chill", "uplifting", "melancholic"],
        genres: &["folk", "country", "indie", "ambient"],
        adjectives: &["wild", "mossy", "verdant", "rugged", "misty", "autumn", "wooden"],
        nouns: &["pine", "river", "meadow", "canyon", "sparrow", "willow", "harvest"],
        verbs: &["bloom", "wander", "grow", "roam", "flow"],
    },
    ThemeProfile {
        name: "urban",
        keywords: &["city", "street", "concrete", "subway", "neon", "block", "night"],
        moods: &["energetic", "aggressive", "dark"],
        genres: &["hip-hop", "punk", "electronic", "rnb"],
        adjectives: &["concrete", "neon", "restless", "gritty", "downtown", "electric"],
        nouns: &["avenue", "skyline", "subway", "alley", "rooftop", "siren", "billboard"],
        verbs: &["hustle", "cruise", "riot", "flicker", "grind"],
    },
    ThemeProfile {
        name: "mythic",
        keywords: &["dragon", "god", "legend", "myth", "king", "sword", "throne", "oracle"],
        moods: &["mysterious", "aggressive", "dark"],
        genres: &["metal", "rock", "classical"],
        adjectives: &["ancient", "mythic", "iron", "sacred", "fallen", "eternal", "titanic"],
        nouns: &["dragon", "oracle", "titan", "throne", "serpent", "citadel", "rune"],
        verbs: &["conquer", "summon", "awaken", "rise", "forge"],
    },
    ThemeProfile {
        name: "melancholy",
        keywords: &["rain", "tears", "lonely", "grey", "loss", "memory", "ghost", "faded"],
        moods: &["melancholic", "sad", "dark"],
        genres: &["indie", "blues", "folk", "soul"],
        adjectives: &["faded", "hollow", "lonely", "pale", "distant", "quiet", "broken"],
        nouns: &["echo", "memory", "ghost", "letter", "photograph", "winter", "ashes"],
        verbs: &["fade", "weep", "linger", "forget", "drown"],
    },
    ThemeProfile {
        name: "rebellion",
        keywords: &["riot", "rebel", "revolution", "fight", "anarchy", "fire", "war"],
        moods: &["aggressive", "energetic"],
        genres: &["punk", "metal", "rock", "hip-hop"],
        adjectives: &["reckless", "defiant", "savage", "burning", "loud", "rotten", "feral"],
        nouns: &["riot", "barricade", "anthem", "molotov", "outlaw", "uprising", "spark"],
        verbs: &["burn", "break", "resist", "shout", "smash"],
    },
    ThemeProfile {
        name: "romance",
        keywords: &["love", "heart", "kiss", "rose", "desire", "lover", "sweet"],
        moods: &["romantic", "happy", "chill"],
        genres: &["pop", "rnb", "soul", "latin", "jazz"],
        adjectives: &["tender", "velvet", "sweet", "golden", "sultry", "blushing", "honey"],
        nouns: &["rose", "heart", "lover", "candle", "promise", "serenade", "kiss"],
        verbs: &["hold", "dance", "whisper", "embrace", "melt"],
    },
    ThemeProfile {
        name: "machine",
        keywords: &["robot", "circuit", "digital", "chrome", "data", "signal", "wire"],
        moods: &["energetic", "mysterious"],
        genres: &["electronic", "metal", "hip-hop"],
        adjectives: &["chrome", "digital", "synthetic", "binary", "static", "mechanical"],
        nouns: &["circuit", "signal", "android", "engine", "pixel", "voltage", "transistor"],
        verbs: &["compute", "glitch", "pulse", "reboot", "transmit"],
    },
    ThemeProfile {
        name: "ocean",
        keywords: &["sea", "ocean", "wave", "tide", "shore", "sail", "storm", "salt"],
        moods: &["chill", "melancholic", "mysterious"],
        genres: &["reggae", "ambient", "indie", "folk"],
        adjectives: &["briny", "tidal", "sunken", "coastal", "drifting", "azure", "salty"],
        nouns: &["harbor", "lighthouse", "current", "reef", "anchor", "mariner", "tide"],
        verbs: &["sail", "drift", "sink", "crash", "swell"],
    },
    ThemeProfile {
        name: "night",
        keywords: &["night", "midnight", "moon", "dark", "shadow", "dream", "sleep"],
        moods: &["dark", "mysterious", "romantic", "chill"],
        genres: &["jazz", "electronic", "blues", "rnb"],
        adjectives: &["nocturnal", "midnight", "shadowed", "moonlit", "sleepless", "dusky"],
        nouns: &["shadow", "lantern", "insomnia", "moon", "dream", "streetlight", "owl"],
        verbs: &["haunt", "dream", "prowl", "glow", "vanish"],
    },
];

pub fn theme_by_name(name: &str) -> Option<&'static ThemeProfile> {
    THEMES.iter().find(|t| t.name == name)
}

/// Best-matching theme for the request context
///
/// Ties are broken at random. Returns `None` when nothing overlaps, leaving
/// slots to draw from context and built-in words only.
pub fn select_theme(
    keywords: &[String],
    genre: Option<&str>,
    mood: Option<&str>,
    rng: &dyn RandomSource,
) -> Option<&'static ThemeProfile> {
    let scored: Vec<(&'static ThemeProfile, f64)> = THEMES
        .iter()
        .map(|t| (t, t.affinity(keywords, genre, mood)))
        .collect();
    let best = scored.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
    if best <= 0.0 {
        return None;
    }

    let top: Vec<&'static ThemeProfile> = scored
        .into_iter()
        .filter(|(_, s)| *s >= best)
        .map(|(t, _)| t)
        .collect();
    rng.pick(&top).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn test_mood_and_genre_pick_theme() {
        let rng = SeededRandom::from_seed(3);
        let theme = select_theme(&[], Some("metal"), Some("aggressive"), &rng).unwrap();
        assert!(["mythic", "rebellion"].contains(&theme.name));
    }

    #[test]
    fn test_keywords_dominate() {
        let rng = SeededRandom::from_seed(3);
        let keywords: Vec<String> = ["tide", "harbor", "anchor"].iter().map(|s| s.to_string()).collect();
        let theme = select_theme(&keywords, None, None, &rng).unwrap();
        assert_eq!(theme.name, "ocean");
    }

    #[test]
    fn test_no_overlap_gives_none() {
        let rng = SeededRandom::from_seed(3);
        assert!(select_theme(&["zzz".to_string()], Some("zzz"), None, &rng).is_none());
    }

    #[test]
    fn test_bias_lists_are_single_words() {
        for theme in THEMES {
            let bias = theme.bias();
            for word in bias.adjectives.iter().chain(bias.nouns).chain(bias.verbs) {
                assert!(!word.contains(' '), "{} has multi-word '{}'", theme.name, word);
            }
        }
        assert!(theme_by_name("night").is_some());
    }
}
