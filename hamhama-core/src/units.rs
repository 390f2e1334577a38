//! Unit normalization.
//!
//! Maps free-text unit tokens (as returned by the model or found in recipe
//! text) onto the fixed vocabulary stored in `recipe_ingredients.unit`.

use std::fmt;

/// Canonical unit vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Tablespoon,
    Teaspoon,
    Pound,
    Ounce,
    Cup,
    Pint,
    Quart,
    Gallon,
    Milligram,
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Pinch,
    Dash,
    Whole,
    Clove,
    Bunch,
    Stalk,
    Leaf,
    Slice,
    Can,
    Jar,
}

impl Unit {
    /// Every canonical unit, in the order the prompt lists them.
    pub const ALL: [Unit; 23] = [
        Unit::Tablespoon,
        Unit::Teaspoon,
        Unit::Cup,
        Unit::Pound,
        Unit::Ounce,
        Unit::Gram,
        Unit::Kilogram,
        Unit::Milliliter,
        Unit::Liter,
        Unit::Pinch,
        Unit::Dash,
        Unit::Whole,
        Unit::Clove,
        Unit::Stalk,
        Unit::Leaf,
        Unit::Slice,
        Unit::Can,
        Unit::Jar,
        Unit::Pint,
        Unit::Quart,
        Unit::Gallon,
        Unit::Milligram,
        Unit::Bunch,
    ];

    /// The string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Tablespoon => "Tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Pound => "lb",
            Unit::Ounce => "oz",
            Unit::Cup => "cup",
            Unit::Pint => "pint",
            Unit::Quart => "quart",
            Unit::Gallon => "gallon",
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Pinch => "pinch",
            Unit::Dash => "dash",
            Unit::Whole => "whole",
            Unit::Clove => "clove",
            Unit::Bunch => "bunch",
            Unit::Stalk => "stalk",
            Unit::Leaf => "leaf",
            Unit::Slice => "slice",
            Unit::Can => "can",
            Unit::Jar => "jar",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase spelling -> canonical unit.
fn lookup(token: &str) -> Option<Unit> {
    let unit = match token {
        "tbs" | "tbsp" | "tablespoon" | "tablespoons" => Unit::Tablespoon,
        "tsp" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
        "lb" | "lbs" | "pound" | "pounds" | "#" => Unit::Pound,
        "oz" | "ounce" | "ounces" => Unit::Ounce,
        "c" | "cup" | "cups" => Unit::Cup,
        "pt" | "pint" | "pints" => Unit::Pint,
        "qt" | "quart" | "quarts" => Unit::Quart,
        "gal" | "gallon" | "gallons" => Unit::Gallon,
        "mg" | "milligram" | "milligrams" => Unit::Milligram,
        "g" | "gram" | "grams" => Unit::Gram,
        "kg" | "kilogram" | "kilograms" => Unit::Kilogram,
        "ml" | "milliliter" | "milliliters" => Unit::Milliliter,
        "l" | "liter" | "liters" => Unit::Liter,
        "pinch" | "pinches" => Unit::Pinch,
        "dash" | "dashes" => Unit::Dash,
        "whole" => Unit::Whole,
        "clove" | "cloves" => Unit::Clove,
        "bunch" | "bunches" => Unit::Bunch,
        "stalk" | "stalks" => Unit::Stalk,
        "leaf" | "leaves" => Unit::Leaf,
        "slice" | "slices" => Unit::Slice,
        "can" | "cans" => Unit::Can,
        "jar" | "jars" => Unit::Jar,
        _ => return None,
    };
    Some(unit)
}

/// Normalize a raw unit token to the canonical vocabulary.
///
/// Matching is case-insensitive and ignores trailing periods. The token is
/// tried as-is first, then with one trailing plural "s" removed. Tokens that
/// map to nothing return `None`; an unrecognized unit never blocks a write.
pub fn normalize_unit(raw: Option<&str>) -> Option<Unit> {
    let token = raw?.trim().trim_end_matches('.').to_lowercase();
    if token.is_empty() {
        return None;
    }

    lookup(&token).or_else(|| token.strip_suffix('s').and_then(lookup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_and_plural_tolerant() {
        assert_eq!(normalize_unit(Some("Tbsp")), Some(Unit::Tablespoon));
        assert_eq!(normalize_unit(Some("tbsps")), Some(Unit::Tablespoon));
        assert_eq!(normalize_unit(Some("TBSP")), Some(Unit::Tablespoon));
        assert_eq!(
            normalize_unit(Some("tbsps")).map(|u| u.as_str()),
            Some("Tbsp")
        );
    }

    #[test]
    fn test_abbreviation_ending_in_s() {
        assert_eq!(normalize_unit(Some("tbs")), Some(Unit::Tablespoon));
        assert_eq!(normalize_unit(Some("lbs.")), Some(Unit::Pound));
    }

    #[test]
    fn test_long_forms() {
        assert_eq!(normalize_unit(Some("Tablespoons")), Some(Unit::Tablespoon));
        assert_eq!(normalize_unit(Some("ounces")), Some(Unit::Ounce));
        assert_eq!(normalize_unit(Some("cloves")), Some(Unit::Clove));
        assert_eq!(normalize_unit(Some("leaves")), Some(Unit::Leaf));
        assert_eq!(normalize_unit(Some("#")), Some(Unit::Pound));
        assert_eq!(normalize_unit(Some(" whole ")), Some(Unit::Whole));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(normalize_unit(None), None);
        assert_eq!(normalize_unit(Some("")), None);
        assert_eq!(normalize_unit(Some("   ")), None);
        assert_eq!(normalize_unit(Some("handful")), None);
        assert_eq!(normalize_unit(Some("sprigs")), None);
    }

    #[test]
    fn test_canonical_forms_are_fixed_points() {
        for unit in Unit::ALL {
            assert_eq!(normalize_unit(Some(unit.as_str())), Some(unit));
        }
    }
}
