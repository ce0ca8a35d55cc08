//! Suffix-stripping stemmer and significant-word extraction

use crate::words::is_stop_word;

/// Stems must keep at least this many characters
const MIN_STEM_LEN: usize = 3;

/// Checked in order; longer suffixes first so "less" wins over "s"
const SUFFIXES: &[&str] = &[
    "ness", "ment", "tion", "sion", "ible", "able", "less", "ful", "ous", "ing", "est", "ive",
    "ary", "ory", "ed", "er", "ly", "al", "ic",
];

/// Suffixes after which a doubled final consonant is collapsed ("running" -> "run")
const DOUBLING_SUFFIXES: &[&str] = &["ing", "ed", "er", "est"];

fn collapse_double(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n > MIN_STEM_LEN
        && chars[n - 1] == chars[n - 2]
        && !matches!(chars[n - 1], 'a' | 'e' | 'i' | 'o' | 'u' | 'l' | 's' | 'z')
    {
        chars[..n - 1].iter().collect()
    } else {
        stem.to_string()
    }
}

fn strip_plural(word: &str) -> Option<String> {
    if let Some(base) = word.strip_suffix("ies") {
        if base.chars().count() >= MIN_STEM_LEN - 1 {
            return Some(format!("{}y", base));
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    word.strip_suffix('s')
        .filter(|base| base.chars().count() >= MIN_STEM_LEN)
        .map(str::to_string)
}

/// Reduce a word to a rough stem
pub fn stem(word: &str) -> String {
    let lower = word.trim().to_lowercase();
    let word = strip_plural(&lower).unwrap_or(lower);

    for suffix in SUFFIXES {
        if let Some(base) = word.strip_suffix(suffix) {
            if base.chars().count() >= MIN_STEM_LEN {
                return if DOUBLING_SUFFIXES.contains(suffix) {
                    collapse_double(base)
                } else {
                    base.to_string()
                };
            }
        }
    }
    word
}

/// Lowercase tokens of a name
pub fn tokenize(name: &str) -> Vec<String> {
    name.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Distinct content words at least `min_len` characters long
pub fn significant_words(name: &str, min_len: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for token in tokenize(name) {
        if token.chars().count() < min_len
            || is_stop_word(&token)
            || token.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if !words.contains(&token) {
            words.push(token);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_suffixes() {
        assert_eq!(stem("burning"), "burn");
        assert_eq!(stem("burned"), "burn");
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("darkness"), "dark");
        assert_eq!(stem("fearless"), "fear");
        assert_eq!(stem("wolves"), "wolve");
        assert_eq!(stem("cities"), "city");
        assert_eq!(stem("Shadows"), "shadow");
    }

    #[test]
    fn test_short_words_untouched() {
        assert_eq!(stem("red"), "red");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("glass"), "glass");
        assert_eq!(stem("chorus"), "chorus");
    }

    #[test]
    fn test_significant_words() {
        assert_eq!(
            significant_words("The Wolves of the Velvet Sea", 4),
            vec!["wolves", "velvet"]
        );
        assert_eq!(significant_words("Don't Stop 1999", 4), vec!["stop"]);
        assert!(significant_words("of the", 4).is_empty());
    }
}
