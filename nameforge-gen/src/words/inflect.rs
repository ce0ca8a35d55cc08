//! Minimal English inflection for pattern slots

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("wolf", "wolves"),
    ("knife", "knives"),
    ("thief", "thieves"),
    ("leaf", "leaves"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

const UNCOUNTABLE: &[&str] = &["dust", "thunder", "ash", "voltage", "wildfire", "paradise", "blues", "soul"];

const IRREGULAR_PAST: &[(&str, &str)] = &[
    ("bleed", "bled"),
    ("break", "broke"),
    ("dig", "dug"),
    ("fall", "fell"),
    ("fight", "fought"),
    ("fly", "flew"),
    ("forget", "forgot"),
    ("freeze", "froze"),
    ("grow", "grew"),
    ("hide", "hid"),
    ("kneel", "knelt"),
    ("leave", "left"),
    ("rise", "rose"),
    ("run", "ran"),
    ("shine", "shone"),
    ("sing", "sang"),
    ("sink", "sank"),
    ("sleep", "slept"),
    ("slide", "slid"),
    ("spin", "spun"),
    ("stand", "stood"),
    ("steal", "stole"),
    ("swim", "swam"),
    ("swing", "swung"),
    ("wake", "woke"),
    ("weep", "wept"),
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Consonant-vowel-consonant ending of a short word (run -> running)
fn doubles_final_consonant(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    if n < 3 || n > 4 {
        return false;
    }
    let (a, b, c) = (chars[n - 3], chars[n - 2], chars[n - 1]);
    !is_vowel(a) && is_vowel(b) && !is_vowel(c) && !matches!(c, 'w' | 'x' | 'y')
}

pub fn pluralize(noun: &str) -> String {
    let lower = noun.to_lowercase();
    if let Some((_, plural)) = IRREGULAR_PLURALS.iter().find(|(s, _)| *s == lower) {
        return plural.to_string();
    }
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return lower;
    }
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", lower);
    }
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1).unwrap_or('a');
        if !is_vowel(before) {
            return format!("{}ies", &lower[..lower.len() - 1]);
        }
    }
    format!("{}s", lower)
}

pub fn gerund(verb: &str) -> String {
    let lower = verb.to_lowercase();
    if lower.ends_with("ie") {
        return format!("{}ying", &lower[..lower.len() - 2]);
    }
    if lower.ends_with('e') && !lower.ends_with("ee") && lower.len() > 2 {
        return format!("{}ing", &lower[..lower.len() - 1]);
    }
    if doubles_final_consonant(&lower) {
        let last = lower.chars().last().unwrap_or_default();
        return format!("{}{}ing", lower, last);
    }
    format!("{}ing", lower)
}

pub fn past_tense(verb: &str) -> String {
    let lower = verb.to_lowercase();
    if let Some((_, past)) = IRREGULAR_PAST.iter().find(|(s, _)| *s == lower) {
        return past.to_string();
    }
    if lower.ends_with('e') {
        return format!("{}d", lower);
    }
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1).unwrap_or('a');
        if !is_vowel(before) {
            return format!("{}ied", &lower[..lower.len() - 1]);
        }
    }
    if doubles_final_consonant(&lower) {
        let last = lower.chars().last().unwrap_or_default();
        return format!("{}{}ed", lower, last);
    }
    format!("{}ed", lower)
}

/// Third person singular ("burn" -> "burns")
pub fn third_person(verb: &str) -> String {
    let lower = verb.to_lowercase();
    if lower.ends_with('s') || lower.ends_with("sh") || lower.ends_with("ch") || lower.ends_with('x') {
        return format!("{}es", lower);
    }
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1).unwrap_or('a');
        if !is_vowel(before) {
            return format!("{}ies", &lower[..lower.len() - 1]);
        }
    }
    format!("{}s", lower)
}

/// Capitalize the first letter of every word, keeping short joiners lowercase
/// unless they open the phrase
pub fn title_case(phrase: &str) -> String {
    const LOWER_JOINERS: &[&str] = &["of", "the", "and", "in", "on", "a", "an", "to", "for", "from", "with", "like"];

    phrase
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && LOWER_JOINERS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
