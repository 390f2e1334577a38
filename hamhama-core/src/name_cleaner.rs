//! Ingredient name cleanup.
//!
//! The model is asked for bare ingredient names but regularly leaves sizes,
//! amounts and preparation notes behind ("2 small acorn squash, chopped").
//! This strips that noise before the name is used as the `ingredients` key.

use std::sync::LazyLock;

use regex::Regex;

/// Parenthetical asides, e.g. "(3½–4-lb.)".
static PARENTHETICAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("Invalid parenthetical regex"));

/// Digits, decimal/slash fractions and unicode fraction glyphs.
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9½¼¾⅓⅔⅛⅜⅝⅞⅕⅙⅚]+(?:[./⁄][0-9]+)*").expect("Invalid quantity regex")
});

/// Unit words, sizes and preparation notes. Longer alternatives come first
/// so "extra-large" wins over "large".
static NOISE_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:tablespoons?|teaspoons?|tbsps?|tbs|tsps?|cups?|pounds?|lbs?|ounces?|oz|grams?|kg|ml|pinch|dash|whole|extra-large|small|medium|large|freshly ground|finely|coarsely|roughly|thinly|chopped|diced|minced|sliced|grated|divided|to taste|optional)\b",
    )
    .expect("Invalid noise word regex")
});

/// Characters that never belong in a stored name.
static STRAY_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'<>]"#).expect("Invalid stray character regex"));

/// Clean a raw ingredient description down to the bare ingredient name.
///
/// Returns an empty string when nothing is left; callers skip such entries.
/// The result is a fixed point of the cleanup, so cleaning it again returns
/// it unchanged.
pub fn clean_ingredient_name(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        // After the first pass the text is whitespace-normalized, so every
        // further pass either shortens it or leaves it unchanged.
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(text: &str) -> String {
    let text = PARENTHETICAL_REGEX.replace_all(text, " ");
    let text = QUANTITY_REGEX.replace_all(&text, " ");
    let text = NOISE_WORD_REGEX.replace_all(&text, " ");
    let text = STRAY_CHAR_REGEX.replace_all(&text, "");

    let joined = text
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" ");

    joined
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}
