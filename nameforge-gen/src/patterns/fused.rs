//! Fused patterns
//!
//! Build a name from two rendered phrases:
//!
//! - `Combine`: phrase, connector, phrase ("Velvet Wolves and Broken Glass")
//! - `Interweave`: words of both phrases alternated
//! - `Transform`: one phrase reshaped by adding an article, a music term or
//!   inflecting its head word
//!
//! The result is always fitted to the target word count.

use super::{dynamic, GenerationContext, PatternKind};
use crate::error::PatternError;
use crate::random::{RandomExt, RandomSource};
use crate::words::inflect::{gerund, pluralize, title_case};
use crate::words::{is_stop_word, Slot, SlotBias, WordPools};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FusionMethod {
    Combine,
    Interweave,
    Transform,
}

impl FusionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionMethod::Combine => "combine",
            FusionMethod::Interweave => "interweave",
            FusionMethod::Transform => "transform",
        }
    }
}

const COMBINE_CONNECTORS: &[&str] = &["and", "of", "&", "versus", "in"];

/// Lowercase words of a phrase with exactly `len` words, preferring a
/// fixed template from the library
fn phrase(
    ctx: &GenerationContext<'_>,
    bias: Option<&SlotBias<'_>>,
    len: usize,
) -> Result<Vec<String>, PatternError> {
    let templates: Vec<_> = ctx
        .library
        .patterns()
        .iter()
        .filter_map(|p| match &p.kind {
            PatternKind::Template(t) if t.word_count() == len => Some(t),
            _ => None,
        })
        .collect();

    match ctx.rng.pick(&templates) {
        Some(template) => template.render_words(ctx.pools, bias, ctx.rng),
        None => dynamic::structure(len, ctx.rng).render_words(ctx.pools, bias, ctx.rng),
    }
}

/// Trim or pad `words` to exactly `target`
///
/// Trimming drops inner stop words first, then inner words from the front
/// half. Padding inserts adjectives before the last word.
pub fn fit_to_count(
    mut words: Vec<String>,
    target: usize,
    pools: &WordPools,
    bias: Option<&SlotBias<'_>>,
    rng: &dyn RandomSource,
) -> Result<Vec<String>, PatternError> {
    let target = target.max(1);

    while words.len() > target {
        let inner_stop = (1..words.len().saturating_sub(1)).find(|i| is_stop_word(&words[*i]));
        let index = match inner_stop {
            Some(i) => i,
            None if words.len() > 2 => 1,
            None => words.len() - 1,
        };
        words.remove(index);
    }

    while words.len() < target {
        let adjective = pools.draw(Slot::Adjective, bias, rng)?;
        let at = words.len().saturating_sub(1);
        words.insert(at, adjective);
    }

    Ok(words)
}

fn combine(
    ctx: &GenerationContext<'_>,
    bias: Option<&SlotBias<'_>>,
    target: usize,
) -> Result<Vec<String>, PatternError> {
    if target < 3 {
        return transform(ctx, bias, target);
    }
    let halves = target - 1;
    let left = halves / 2;
    let right = halves - left;

    let mut words = phrase(ctx, bias, left.max(1))?;
    let connector = ctx.rng.pick(COMBINE_CONNECTORS).copied().unwrap_or("and");
    words.push(connector.to_string());
    words.extend(phrase(ctx, bias, right.max(1))?);
    Ok(words)
}

fn interweave(
    ctx: &GenerationContext<'_>,
    bias: Option<&SlotBias<'_>>,
    target: usize,
) -> Result<Vec<String>, PatternError> {
    let left = target.div_ceil(2);
    let right = target - left;
    let first = phrase(ctx, bias, left.max(1))?;
    let second = if right > 0 {
        phrase(ctx, bias, right)?
    } else {
        Vec::new()
    };

    let mut words = Vec::with_capacity(target);
    let mut a = first.into_iter();
    let mut b = second.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (x, y) => {
                words.extend(x);
                words.extend(y);
            }
        }
    }

    // Stop words stranded at the end read badly; move them inward
    if words.len() > 1 && words.last().map(|w| is_stop_word(w)).unwrap_or(false) {
        if let Some(last) = words.pop() {
            words.insert(words.len() - 1, last);
        }
    }
    Ok(words)
}

fn transform(
    ctx: &GenerationContext<'_>,
    bias: Option<&SlotBias<'_>>,
    target: usize,
) -> Result<Vec<String>, PatternError> {
    if target == 1 {
        let head = ctx.pools.draw(Slot::Noun, bias, ctx.rng)?;
        return Ok(vec![if ctx.rng.chance(0.5) { pluralize(&head) } else { head }]);
    }

    match ctx.rng.below(3) {
        0 => {
            let mut words = phrase(ctx, bias, target - 1)?;
            if words.first().map(|w| w == "the").unwrap_or(false) {
                words.push(ctx.pools.draw(Slot::Music, None, ctx.rng)?);
            } else {
                words.insert(0, "the".to_string());
            }
            Ok(words)
        }
        1 => {
            let mut words = phrase(ctx, bias, target - 1)?;
            words.push(ctx.pools.draw(Slot::Music, None, ctx.rng)?);
            Ok(words)
        }
        _ => {
            let mut words = phrase(ctx, bias, target)?;
            if let Some(last) = words.last_mut() {
                *last = if last.ends_with('s') {
                    gerund(&ctx.pools.draw(Slot::Verb, bias, ctx.rng)?)
                } else {
                    pluralize(last)
                };
            }
            Ok(words)
        }
    }
}

/// Generate a fused name with exactly `word_count` words
pub fn generate(
    method: FusionMethod,
    ctx: &GenerationContext<'_>,
    word_count: usize,
) -> Result<String, PatternError> {
    let bias = ctx.bias();
    let bias = bias.as_ref();
    let words = match method {
        FusionMethod::Combine => combine(ctx, bias, word_count)?,
        FusionMethod::Interweave => interweave(ctx, bias, word_count)?,
        FusionMethod::Transform => transform(ctx, bias, word_count)?,
    };
    let fitted = fit_to_count(words, word_count, ctx.pools, bias, ctx.rng)?;
    Ok(title_case(&fitted.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{select_theme, PatternLibrary};
    use crate::random::SeededRandom;
    use crate::words::WordStores;
    use std::sync::Arc;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_trims_stop_words_first() {
        let pools = WordPools::new(Arc::new(WordStores::builtin()));
        let rng = SeededRandom::from_seed(1);
        let fitted =
            fit_to_count(words(&["ghosts", "of", "the", "harbor"]), 2, &pools, None, &rng).unwrap();
        assert_eq!(fitted, words(&["ghosts", "harbor"]));
    }

    #[test]
    fn test_fit_pads_before_last_word() {
        let pools = WordPools::new(Arc::new(WordStores::builtin()));
        let rng = SeededRandom::from_seed(1);
        let fitted = fit_to_count(words(&["wolves"]), 3, &pools, None, &rng).unwrap();
        assert_eq!(fitted.len(), 3);
        assert_eq!(fitted[2], "wolves");
    }

    #[test]
    fn test_every_method_hits_target_count() {
        let pools = WordPools::new(Arc::new(WordStores::builtin()));
        let library = PatternLibrary::builtin();
        let rng = SeededRandom::from_seed(99);
        let theme = select_theme(&[], Some("rock"), Some("dark"), &rng);
        let ctx = GenerationContext {
            pools: &pools,
            library: &library,
            theme,
            rng: &rng,
        };

        for method in [FusionMethod::Combine, FusionMethod::Interweave, FusionMethod::Transform] {
            for n in 1..=10 {
                let name = generate(method, &ctx, n).unwrap();
                assert_eq!(name.split_whitespace().count(), n, "{:?} -> '{}'", method, name);
            }
        }
    }
}
