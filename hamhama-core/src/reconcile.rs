//! Validation and reconciliation of model responses.
//!
//! Structural problems (no JSON, missing container array) are errors and make
//! the retry layer try again. Problems with individual items are never errors:
//! the item is skipped or coerced and a warning is logged, so one bad entry
//! cannot sink a batch.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::category::Label;
use crate::json_extract::extract_json_object;

/// Top-level field holding the classification array.
pub const CLASSIFICATIONS_FIELD: &str = "classifications";

/// Top-level field holding the parsed ingredient array.
pub const INGREDIENTS_FIELD: &str = "Ingredients";

/// The response as a whole is unusable.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("no JSON object found in response")]
    NoJsonObject,

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("response is missing the {0:?} field")]
    MissingField(&'static str),

    #[error("{0:?} is not an array")]
    NotAnArray(&'static str),
}

/// Extract the response object and return its `field` array.
fn container_array(text: &str, field: &'static str) -> Result<Vec<Value>, ResponseError> {
    let json = extract_json_object(text).ok_or(ResponseError::NoJsonObject)?;
    let value: Value = serde_json::from_str(json).map_err(|_| ResponseError::NoJsonObject)?;

    let Value::Object(mut object) = value else {
        return Err(ResponseError::NotAnObject);
    };

    match object.remove(field) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ResponseError::NotAnArray(field)),
        None => Err(ResponseError::MissingField(field)),
    }
}

/// Shape check for one entry of the `classifications` array.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationItem {
    Valid { recipe_id: i64, label: String },
    Malformed { reason: String },
}

impl ClassificationItem {
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::malformed("item is not an object");
        };

        let (Some(id), Some(label)) = (object.get("recipe_id"), object.get("category")) else {
            return Self::malformed("item needs both recipe_id and category");
        };

        let Some(recipe_id) = id.as_i64() else {
            return Self::malformed(format!("recipe_id {} is not an integer", id));
        };

        let label = match label {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Self::Valid { recipe_id, label }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// The reconciled result of one classification batch.
///
/// `labels` always has exactly the expected ids as keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub labels: BTreeMap<i64, Label>,
    /// Ids resolved to a real category.
    pub valid: usize,
    /// Ids resolved to the unknown marker, for whatever reason.
    pub unknown: usize,
    /// Labels outside the allowed set that were turned into unknown.
    pub coerced: usize,
    /// Expected ids the model never mentioned.
    pub missing: usize,
    /// Items dropped as malformed, unexpected or duplicate.
    pub discarded: usize,
}

impl Reconciliation {
    pub fn total(&self) -> usize {
        self.labels.len()
    }
}

/// Validate a classification response against the ids that were sent.
///
/// The first entry for an id wins. Ids that were not sent are dropped; ids the
/// model skipped are filled in as unknown.
pub fn reconcile_classifications(
    text: &str,
    expected: &BTreeSet<i64>,
) -> Result<Reconciliation, ResponseError> {
    let items = container_array(text, CLASSIFICATIONS_FIELD)?;
    let mut result = Reconciliation::default();

    for item in &items {
        let (recipe_id, raw_label) = match ClassificationItem::from_value(item) {
            ClassificationItem::Valid { recipe_id, label } => (recipe_id, label),
            ClassificationItem::Malformed { reason } => {
                tracing::warn!(%item, reason = %reason, "Skipping malformed classification item");
                result.discarded += 1;
                continue;
            }
        };

        if !expected.contains(&recipe_id) {
            tracing::warn!(recipe_id, "Discarding classification for unexpected recipe id");
            result.discarded += 1;
            continue;
        }

        if result.labels.contains_key(&recipe_id) {
            tracing::warn!(recipe_id, "Duplicate recipe id in response, keeping first");
            result.discarded += 1;
            continue;
        }

        let label = match Label::parse_normalized(&raw_label) {
            Some(label) => label,
            None => {
                tracing::warn!(
                    recipe_id,
                    category = %raw_label,
                    "Invalid category, treating as unknown"
                );
                result.coerced += 1;
                Label::Unknown
            }
        };

        result.labels.insert(recipe_id, label);
    }

    for &recipe_id in expected {
        if !result.labels.contains_key(&recipe_id) {
            result.labels.insert(recipe_id, Label::Unknown);
            result.missing += 1;
        }
    }
    if result.missing > 0 {
        tracing::warn!(missing = result.missing, "Response omitted some recipe ids");
    }

    result.valid = result.labels.values().filter(|l| l.is_known()).count();
    result.unknown = result.labels.len() - result.valid;

    tracing::debug!(
        total = result.total(),
        valid = result.valid,
        unknown = result.unknown,
        "Reconciled classification response"
    );

    Ok(result)
}

/// One structurally valid entry of the `Ingredients` array, before cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientItem {
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub name: String,
}

/// Shape check for one entry of the `Ingredients` array.
#[derive(Debug, Clone, PartialEq)]
pub enum IngredientEntry {
    Valid(IngredientItem),
    Malformed { reason: String },
}

impl IngredientEntry {
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Malformed {
                reason: "item is not an object".to_string(),
            };
        };

        let Some(name) = object.get("name").and_then(Value::as_str) else {
            return Self::Malformed {
                reason: "item has no string name".to_string(),
            };
        };

        Self::Valid(IngredientItem {
            quantity: quantity_of(object),
            unit: object
                .get("unit")
                .and_then(Value::as_str)
                .map(str::to_string),
            name: name.to_string(),
        })
    }
}

/// Numbers and numeric strings are accepted; anything else is no quantity.
fn quantity_of(object: &Map<String, Value>) -> Option<f64> {
    match object.get("quantity")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|q| q.is_finite())
}

/// Validate an ingredient parsing response, returning the usable items in
/// response order.
pub fn validate_ingredient_response(text: &str) -> Result<Vec<IngredientItem>, ResponseError> {
    let items = container_array(text, INGREDIENTS_FIELD)?;

    Ok(items
        .iter()
        .filter_map(|value| match IngredientEntry::from_value(value) {
            IngredientEntry::Valid(item) => Some(item),
            IngredientEntry::Malformed { reason } => {
                tracing::warn!(item = %value, reason = %reason, "Skipping malformed ingredient item");
                None
            }
        })
        .collect())
}
