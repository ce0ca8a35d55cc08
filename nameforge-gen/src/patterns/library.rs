//! Built-in pattern library

use super::{Applicability, FusionMethod, PatternCategory, PatternDefinition, PatternKind};
use crate::error::PatternError;
use crate::types::ContentType;
use tracing::warn;

use Applicability::{Band, Both, Song};
use PatternCategory::*;

/// (id, category, template, weight, applicability, genres, moods)
type TemplateRow = (
    &'static str,
    PatternCategory,
    &'static str,
    f64,
    Applicability,
    &'static [&'static str],
    &'static [&'static str],
);

const TEMPLATES: &[TemplateRow] = &[
    // One word
    ("single-noun", Classic, "{noun}", 1.0, Both, &[], &[]),
    ("single-plural", Classic, "{plural}", 1.0, Band, &[], &[]),
    ("single-compound", Compound, "{compound}", 1.2, Both, &["metal", "electronic", "hip-hop"], &[]),
    ("single-gerund", Action, "{gerund}", 0.8, Song, &[], &["energetic", "melancholic"]),
    // Two words
    ("adjective-plural", Classic, "{adjective} {plural}", 1.5, Band, &[], &[]),
    ("adjective-noun", Descriptive, "{adjective} {noun}", 1.3, Both, &[], &[]),
    ("the-plural", Classic, "The {plural}", 1.2, Band, &["rock", "punk", "indie"], &[]),
    ("noun-plural", Compound, "{noun} {plural}", 1.0, Band, &[], &[]),
    ("gerund-noun", Action, "{gerund} {noun}", 1.0, Song, &[], &["energetic", "aggressive"]),
    ("number-plural", Numeric, "{number} {plural}", 0.6, Both, &["punk", "pop", "hip-hop"], &[]),
    ("music-noun", Abstract, "{noun} {music}", 0.7, Song, &["classical", "jazz", "ambient"], &[]),
    ("past-noun", Narrative, "{past} {noun}", 0.8, Song, &[], &["melancholic", "sad"]),
    // Three words
    ("the-adjective-plural", Classic, "The {adjective} {plural}", 1.6, Band, &[], &[]),
    ("adjective-noun-plural", Descriptive, "{adjective} {noun} {plural}", 1.0, Band, &[], &[]),
    ("noun-of-plural", Narrative, "{noun} of {plural}", 1.2, Both, &["metal", "folk", "classical"], &["dark", "mysterious"]),
    ("gerund-the-noun", Action, "{gerund} the {noun}", 1.2, Song, &["rock", "punk"], &["energetic", "aggressive"]),
    ("noun-verbs-adjective", Abstract, "{noun} {verbs} {adjective}", 0.7, Song, &[], &[]),
    ("adjective-adjective-noun", Descriptive, "{adjective} {adjective} {noun}", 0.8, Both, &[], &[]),
    ("number-adjective-plural", Numeric, "{number} {adjective} {plural}", 0.6, Band, &[], &[]),
    ("verb-the-noun", Action, "{verb} the {noun}", 1.0, Song, &["pop", "rock", "hip-hop"], &["uplifting", "happy"]),
    // Four words
    ("noun-of-the-plural", Narrative, "{noun} of the {plural}", 1.3, Both, &["metal", "folk"], &["dark", "mysterious"]),
    ("gerund-in-the-noun", Narrative, "{gerund} in the {noun}", 1.2, Song, &[], &["melancholic", "chill", "romantic"]),
    ("the-adjective-noun-plural", Descriptive, "The {adjective} {noun} {plural}", 1.0, Band, &[], &[]),
    ("adjective-noun-of-plural", Abstract, "{adjective} {noun} of {plural}", 0.9, Both, &["indie", "ambient"], &[]),
    ("when-the-plural-verb", Narrative, "When the {plural} {verb}", 0.8, Song, &["folk", "country", "blues"], &["melancholic", "sad"]),
    ("plural-and-plural", Classic, "{plural} and {plural}", 0.9, Band, &["folk", "indie"], &[]),
    // Five words
    ("the-adjective-plural-of-noun", Narrative, "The {adjective} {plural} of {noun}", 1.0, Band, &[], &["mysterious", "dark"]),
    ("gerund-through-the-adjective-noun", Action, "{gerund} through the {adjective} {noun}", 1.0, Song, &[], &["energetic", "uplifting"]),
    ("noun-of-the-adjective-plural", Narrative, "{noun} of the {adjective} {plural}", 1.1, Both, &["metal", "rock"], &[]),
    ("all-the-adjective-plural-verb", Abstract, "All the {adjective} {plural} {verb}", 0.7, Song, &["pop", "indie"], &[]),
    // Six words
    ("song-dont-verb-the-adjective-noun", Narrative, "Don't {verb} the {adjective} {noun} tonight", 0.8, Song, &["pop", "rock", "country"], &["romantic", "happy"]),
    ("the-adjective-noun-and-the-plural", Classic, "The {adjective} {noun} and the {plural}", 0.8, Band, &["indie", "folk"], &[]),
    ("plural-in-the-noun-of-noun", Narrative, "{plural} in the {noun} of {noun}", 0.7, Song, &[], &["mysterious", "dark"]),
];

/// Registry of every pattern the selector can draw
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<PatternDefinition>,
}

impl PatternLibrary {
    pub fn builtin() -> Self {
        let mut patterns: Vec<PatternDefinition> = TEMPLATES
            .iter()
            .filter_map(|(id, category, source, weight, applicability, genres, moods)| {
                match PatternDefinition::template(id, *category, source, *weight, *applicability) {
                    Ok(p) => Some(p.with_genres(genres).with_moods(moods)),
                    Err(e) => {
                        warn!(pattern = id, error = %e, "Skipping malformed built-in pattern");
                        None
                    }
                }
            })
            .collect();

        patterns.push(PatternDefinition {
            id: "dynamic-structure".to_string(),
            category: PatternCategory::Dynamic,
            min_word_count: 1,
            max_word_count: 10,
            weight: 1.0,
            applicability: Both,
            genres: Vec::new(),
            moods: Vec::new(),
            kind: PatternKind::Dynamic,
        });

        for (method, min, max, weight) in [
            (FusionMethod::Combine, 3, 10, 0.9),
            (FusionMethod::Interweave, 4, 10, 0.6),
            (FusionMethod::Transform, 2, 8, 0.8),
        ] {
            patterns.push(PatternDefinition {
                id: format!("fused-{}", method.as_str()),
                category: PatternCategory::Fused,
                min_word_count: min,
                max_word_count: max,
                weight,
                applicability: Both,
                genres: Vec::new(),
                moods: Vec::new(),
                kind: PatternKind::Fused(method),
            });
        }

        Self { patterns }
    }

    /// Library from explicit definitions
    pub fn from_patterns(patterns: Vec<PatternDefinition>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[PatternDefinition] {
        &self.patterns
    }

    pub fn get(&self, id: &str) -> Option<&PatternDefinition> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns that can produce `word_count` words for `content_type`
    pub fn candidates(&self, word_count: usize, content_type: ContentType) -> Vec<&PatternDefinition> {
        self.patterns
            .iter()
            .filter(|p| p.supports(word_count) && p.applicability.allows(content_type))
            .collect()
    }

    pub fn require_candidates(
        &self,
        word_count: usize,
        content_type: ContentType,
    ) -> Result<Vec<&PatternDefinition>, PatternError> {
        let found = self.candidates(word_count, content_type);
        if found.is_empty() {
            Err(PatternError::NoPatternForCount(word_count))
        } else {
            Ok(found)
        }
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_templates_parse() {
        let library = PatternLibrary::builtin();
        assert_eq!(library.len(), TEMPLATES.len() + 4);

        let ids: HashSet<&str> = library.patterns().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), library.len(), "duplicate pattern ids");
    }

    #[test]
    fn test_template_ranges_match_word_count() {
        let library = PatternLibrary::builtin();
        for pattern in library.patterns() {
            if let PatternKind::Template(t) = &pattern.kind {
                assert_eq!(pattern.min_word_count, t.word_count(), "{}", pattern.id);
                assert_eq!(pattern.max_word_count, t.word_count(), "{}", pattern.id);
            }
        }
    }

    #[test]
    fn test_every_count_has_candidates() {
        let library = PatternLibrary::builtin();
        for n in 1..=10 {
            for content_type in [ContentType::Band, ContentType::Song] {
                let found = library.require_candidates(n, content_type).unwrap();
                assert!(found.iter().all(|p| p.supports(n)));
            }
        }
        assert!(library.require_candidates(11, ContentType::Band).is_err());
    }
}
