//! Generation patterns
//!
//! A pattern turns word pools into one candidate name with an exact word
//! count. Three kinds:
//!
//! - **Template**: fixed slot template such as `The {adjective} {plural}`
//! - **Dynamic**: structure assembled for the requested count from a theme
//! - **Fused**: two phrases combined, interwoven or transformed, then fitted
//!   to the requested count
//!
//! Patterns are stateless. Generation reads the pools and never mutates the
//! shared word stores.

pub mod dynamic;
pub mod fused;
pub mod library;
pub mod selector;
pub mod themes;

use crate::error::PatternError;
use crate::random::RandomSource;
use crate::types::ContentType;
use crate::words::inflect::title_case;
use crate::words::{Slot, SlotBias, WordPools};
use std::fmt;

pub use fused::FusionMethod;
pub use library::PatternLibrary;
pub use selector::{resolve_word_count, PatternSelector, SelectionCriteria};
pub use themes::{select_theme, ThemeProfile, THEMES};

/// Piece of a template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Word(Slot),
}

/// Parsed slot template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `The {adjective} {plural}`-style text. Every `{slot}` renders
    /// as exactly one word; literal text is kept verbatim.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let malformed = || PatternError::MalformedTemplate(source.to_string());
        let mut segments = Vec::new();
        let mut rest = source.trim();

        while !rest.is_empty() {
            match rest.find('{') {
                Some(0) => {
                    let close = rest.find('}').ok_or_else(malformed)?;
                    let slot = Slot::parse(&rest[1..close]).ok_or_else(malformed)?;
                    segments.push(Segment::Word(slot));
                    rest = &rest[close + 1..];
                }
                Some(open) => {
                    if rest[..open].contains('}') {
                        return Err(malformed());
                    }
                    push_literal(&mut segments, &rest[..open]);
                    rest = &rest[open..];
                }
                None => {
                    if rest.contains('}') {
                        return Err(malformed());
                    }
                    push_literal(&mut segments, rest);
                    rest = "";
                }
            }
        }

        if !segments.iter().any(|s| matches!(s, Segment::Word(_))) {
            return Err(malformed());
        }

        Ok(Self {
            source: source.trim().to_string(),
            segments,
        })
    }

    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        let source = segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.clone(),
                Segment::Word(slot) => format!("{{{:?}}}", slot).to_lowercase(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Words a rendering of this template contains
    pub fn word_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.split_whitespace().count(),
                Segment::Word(_) => 1,
            })
            .sum()
    }

    /// Render lowercase words (not yet title-cased)
    pub fn render_words(
        &self,
        pools: &WordPools,
        bias: Option<&SlotBias<'_>>,
        rng: &dyn RandomSource,
    ) -> Result<Vec<String>, PatternError> {
        let mut words = Vec::with_capacity(self.word_count());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    words.extend(text.split_whitespace().map(str::to_lowercase));
                }
                Segment::Word(slot) => {
                    let mut drawn = pools.draw(*slot, bias, rng)?;
                    // Avoid immediate repeats like "Storm Storm"
                    for _ in 0..3 {
                        if words.last() != Some(&drawn) {
                            break;
                        }
                        drawn = pools.draw(*slot, bias, rng)?;
                    }
                    words.push(drawn);
                }
            }
        }
        Ok(words)
    }

    pub fn render(
        &self,
        pools: &WordPools,
        bias: Option<&SlotBias<'_>>,
        rng: &dyn RandomSource,
    ) -> Result<String, PatternError> {
        Ok(title_case(&self.render_words(pools, bias, rng)?.join(" ")))
    }
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !trimmed.is_empty() {
        segments.push(Segment::Literal(trimmed));
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    Classic,
    Descriptive,
    Action,
    Abstract,
    Narrative,
    Numeric,
    Compound,
    Dynamic,
    Fused,
}

/// Content types a pattern suits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    Band,
    Song,
    Both,
}

impl Applicability {
    pub fn allows(&self, content_type: ContentType) -> bool {
        matches!(
            (self, content_type),
            (Applicability::Both, _)
                | (Applicability::Band, ContentType::Band)
                | (Applicability::Song, ContentType::Song)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKind {
    Template(Template),
    Dynamic,
    Fused(FusionMethod),
}

impl PatternKind {
    pub fn is_template(&self) -> bool {
        matches!(self, PatternKind::Template(_))
    }
}

/// Everything a pattern needs to produce one name
pub struct GenerationContext<'a> {
    pub pools: &'a WordPools,
    pub library: &'a PatternLibrary,
    pub theme: Option<&'static ThemeProfile>,
    pub rng: &'a dyn RandomSource,
}

impl GenerationContext<'_> {
    pub fn bias(&self) -> Option<SlotBias<'static>> {
        self.theme.map(|t| t.bias())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternDefinition {
    pub id: String,
    pub category: PatternCategory,
    pub min_word_count: usize,
    pub max_word_count: usize,
    pub weight: f64,
    pub applicability: Applicability,
    /// Canonical genres the pattern suits; empty means genre-neutral
    pub genres: Vec<&'static str>,
    /// Moods the pattern suits; empty means mood-neutral
    pub moods: Vec<&'static str>,
    pub kind: PatternKind,
}

impl PatternDefinition {
    /// Fixed template; word range is the template's own word count
    pub fn template(
        id: &str,
        category: PatternCategory,
        source: &str,
        weight: f64,
        applicability: Applicability,
    ) -> Result<Self, PatternError> {
        let template = Template::parse(source)?;
        let count = template.word_count();
        Ok(Self {
            id: id.to_string(),
            category,
            min_word_count: count,
            max_word_count: count,
            weight,
            applicability,
            genres: Vec::new(),
            moods: Vec::new(),
            kind: PatternKind::Template(template),
        })
    }

    pub fn with_genres(mut self, genres: &[&'static str]) -> Self {
        self.genres = genres.to_vec();
        self
    }

    pub fn with_moods(mut self, moods: &[&'static str]) -> Self {
        self.moods = moods.to_vec();
        self
    }

    pub fn supports(&self, word_count: usize) -> bool {
        self.min_word_count <= word_count && word_count <= self.max_word_count
    }

    /// Produce a title-cased name with exactly `word_count` words
    pub fn generate(
        &self,
        ctx: &GenerationContext<'_>,
        word_count: usize,
    ) -> Result<String, PatternError> {
        if !self.supports(word_count) {
            return Err(PatternError::NoPatternForCount(word_count));
        }

        let bias = ctx.bias();
        let name = match &self.kind {
            PatternKind::Template(template) => template.render(ctx.pools, bias.as_ref(), ctx.rng)?,
            PatternKind::Dynamic => {
                dynamic::structure(word_count, ctx.rng).render(ctx.pools, bias.as_ref(), ctx.rng)?
            }
            PatternKind::Fused(method) => fused::generate(*method, ctx, word_count)?,
        };

        let actual = name.split_whitespace().count();
        if actual != word_count {
            return Err(PatternError::WordCountMismatch {
                name,
                actual,
                expected: word_count,
            });
        }
        Ok(name)
    }
}
