//! Parsing mode: one recipe's free-text ingredients through the model and
//! back out as clean `(quantity, unit, name)` triples.

use crate::config::BatchConfig;
use crate::llm::LlmProvider;
use crate::name_cleaner::clean_ingredient_name;
use crate::prompts::parse_ingredients::PARSE_INGREDIENTS_PROMPT_NAME;
use crate::prompts::render_parse_ingredients_prompt;
use crate::reconcile::{validate_ingredient_response, IngredientItem};
use crate::retry::{call_with_retry, BatchFailure};
use crate::units::{normalize_unit, Unit};

/// An ingredient ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedIngredient {
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    pub name: String,
}

impl NormalizedIngredient {
    /// Clean the name and canonicalize the unit. `None` if nothing of the
    /// name survives cleaning.
    pub fn from_item(item: IngredientItem) -> Option<Self> {
        let name = clean_ingredient_name(&item.name);
        if name.is_empty() {
            return None;
        }

        Some(Self {
            quantity: item.quantity,
            unit: normalize_unit(item.unit.as_deref()),
            name,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedIngredients {
    pub items: Vec<NormalizedIngredient>,
    /// Items dropped because their cleaned name was empty.
    pub dropped: usize,
}

/// Normalize validated items, keeping response order.
pub fn normalize_items(items: Vec<IngredientItem>) -> ParsedIngredients {
    let mut parsed = ParsedIngredients::default();
    for item in items {
        let raw_name = item.name.clone();
        match NormalizedIngredient::from_item(item) {
            Some(ingredient) => parsed.items.push(ingredient),
            None => {
                tracing::debug!(name = %raw_name, "Dropping ingredient with empty cleaned name");
                parsed.dropped += 1;
            }
        }
    }
    parsed
}

/// Ask the model to parse `raw` and normalize what comes back.
pub async fn parse_ingredients(
    provider: &dyn LlmProvider,
    raw: &[String],
    config: &BatchConfig,
) -> Result<ParsedIngredients, BatchFailure> {
    let request = config.parsing.request(render_parse_ingredients_prompt(raw));

    tracing::debug!(
        prompt = PARSE_INGREDIENTS_PROMPT_NAME,
        lines = raw.len(),
        "Parsing ingredients"
    );

    let items = call_with_retry(
        provider,
        &request,
        &config.retry,
        validate_ingredient_response,
    )
    .await?;

    Ok(normalize_items(items))
}
