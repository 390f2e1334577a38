//! The recipe dataset file used for ingredient and image import.
//!
//! A JSON array of objects with `Title`, `Cleaned_Ingredients` and
//! `Image_Name`. `Cleaned_Ingredients` is usually a Python list literal
//! stored as a string (`"['1 cup flour', \"baker's yeast\"]"`); a real JSON
//! array is accepted too.

use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid ingredient list {literal:?}: {reason}")]
    IngredientList { literal: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetRecipe {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Cleaned_Ingredients", deserialize_with = "ingredient_list")]
    pub ingredients: Vec<String>,
    #[serde(rename = "Image_Name", default)]
    pub image_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIngredients {
    List(Vec<String>),
    Literal(String),
}

fn ingredient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawIngredients::deserialize(deserializer)? {
        RawIngredients::List(items) => Ok(items),
        RawIngredients::Literal(literal) => {
            parse_string_list(&literal).map_err(serde::de::Error::custom)
        }
    }
}

pub fn load_dataset(path: &Path) -> Result<Vec<DatasetRecipe>, DatasetError> {
    let text = fs::read_to_string(path)?;
    parse_dataset(&text)
}

pub fn parse_dataset(text: &str) -> Result<Vec<DatasetRecipe>, DatasetError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a Python-style list of string literals.
///
/// Handles single and double quotes, trailing commas and the escapes Python
/// `repr` produces (`\\xa0`, `\\u2013`, `\\n`, octal, ...). Anything else
/// (numbers, nested lists) is rejected.
pub fn parse_string_list(literal: &str) -> Result<Vec<String>, DatasetError> {
    let fail = |reason: &str| DatasetError::IngredientList {
        literal: literal.chars().take(80).collect(),
        reason: reason.to_string(),
    };

    let inner = literal
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| fail("not a list"))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(quote) = chars.next() else {
            return Ok(items);
        };
        if quote != '\'' && quote != '"' {
            return Err(fail("expected a quoted string"));
        }

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err(fail("unterminated string")),
                Some('\\') => {
                    decode_escape(&mut chars, &mut item).map_err(|reason| fail(reason))?
                }
                Some(c) if c == quote => break,
                Some(c) => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => return Ok(items),
            Some(',') => {}
            Some(_) => return Err(fail("expected ',' between items")),
        }
    }
}

/// Decode one escape sequence (the backslash is already consumed) into `out`.
///
/// Unrecognized escapes are kept verbatim, backslash included, as Python does.
fn decode_escape(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<(), &'static str> {
    let Some(c) = chars.next() else {
        return Err("unterminated escape");
    };

    let decoded = match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0c}',
        'v' => '\u{0b}',
        '\\' | '\'' | '"' => c,
        // Line continuation.
        '\n' => return Ok(()),
        'x' => hex_escape(chars, 2)?,
        'u' => hex_escape(chars, 4)?,
        'U' => hex_escape(chars, 8)?,
        '0'..='7' => {
            let mut value = c.to_digit(8).unwrap_or(0);
            for _ in 0..2 {
                match chars.next_if(|d| d.is_digit(8)) {
                    Some(d) => value = value * 8 + d.to_digit(8).unwrap_or(0),
                    None => break,
                }
            }
            char::from_u32(value).ok_or("invalid octal escape")?
        }
        other => {
            out.push('\\');
            other
        }
    };

    out.push(decoded);
    Ok(())
}

/// Read exactly `digits` hex digits and return the code point they name.
fn hex_escape(chars: &mut Peekable<Chars<'_>>, digits: usize) -> Result<char, &'static str> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next_if(char::is_ascii_hexdigit)
            .and_then(|d| d.to_digit(16))
            .ok_or("truncated hex escape")?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or("hex escape is not a valid code point")
}
