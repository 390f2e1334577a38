//! Recipe categories and the labels the classifier may return.

use std::fmt;
use std::str::FromStr;

/// Marker the model uses (and we store, when configured) for recipes it
/// cannot classify.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Allowed recipe categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Breakfast,
    Lunch,
    Dinner,
    Appetizer,
    Salad,
    Soup,
    SideDish,
    Dessert,
    Snack,
    Beverage,
    CondimentSauce,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Breakfast,
        Category::Lunch,
        Category::Dinner,
        Category::Appetizer,
        Category::Salad,
        Category::Soup,
        Category::SideDish,
        Category::Dessert,
        Category::Snack,
        Category::Beverage,
        Category::CondimentSauce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Breakfast => "BREAKFAST",
            Category::Lunch => "LUNCH",
            Category::Dinner => "DINNER",
            Category::Appetizer => "APPETIZER",
            Category::Salad => "SALAD",
            Category::Soup => "SOUP",
            Category::SideDish => "SIDE_DISH",
            Category::Dessert => "DESSERT",
            Category::Snack => "SNACK",
            Category::Beverage => "BEVERAGE",
            Category::CondimentSauce => "CONDIMENT_SAUCE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    /// Exact match against the canonical (upper-case) names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(())
    }
}

/// A resolved classification: a real category or the unknown sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Category(Category),
    Unknown,
}

impl Label {
    /// Normalize a label string returned by the model.
    ///
    /// Surrounding whitespace and case are ignored. Returns `None` for values
    /// that are neither a category nor the unknown marker; callers coerce
    /// those to [`Label::Unknown`].
    pub fn parse_normalized(raw: &str) -> Option<Label> {
        let normalized = raw.trim().to_uppercase();
        if normalized == UNKNOWN_LABEL {
            return Some(Label::Unknown);
        }
        normalized.parse().ok().map(Label::Category)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Label::Category(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Category(category) => category.as_str(),
            Label::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
