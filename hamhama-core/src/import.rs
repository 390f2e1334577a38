//! Ingredient import run: dataset recipes in, recipes with parsed ingredient
//! rows out.

use chrono::{DateTime, Utc};

use crate::config::BatchConfig;
use crate::dataset::DatasetRecipe;
use crate::error::StoreError;
use crate::ingredients::{parse_ingredients, ParsedIngredients};
use crate::llm::LlmProvider;
use crate::store::IngredientStore;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub imported: usize,
    pub skipped_existing: usize,
    pub skipped_untitled: usize,
    pub failed: usize,
    /// `recipe_ingredients` rows written.
    pub ingredient_rows: usize,
    /// Parsed items dropped because nothing was left of their name.
    pub dropped_ingredients: usize,
}

impl ImportSummary {
    fn new(total: usize) -> Self {
        Self {
            started_at: Utc::now(),
            total,
            imported: 0,
            skipped_existing: 0,
            skipped_untitled: 0,
            failed: 0,
            ingredient_rows: 0,
            dropped_ingredients: 0,
        }
    }

    pub fn run_id(&self) -> String {
        self.started_at.format("import-%Y-%m-%d_%H-%M-%S").to_string()
    }
}

/// Import every recipe in `recipes` that is not stored yet.
///
/// Recipes are matched by trimmed title. A recipe whose ingredients cannot be
/// parsed, or whose insert fails, is skipped and counted; the run continues.
/// A failed existence check ends the run with an error.
pub async fn run_ingredient_import<S>(
    store: &mut S,
    provider: &dyn LlmProvider,
    recipes: &[DatasetRecipe],
    config: &BatchConfig,
) -> Result<ImportSummary, StoreError>
where
    S: IngredientStore + ?Sized,
{
    let mut summary = ImportSummary::new(recipes.len());
    let mut called_api = false;

    tracing::info!(
        recipes = recipes.len(),
        provider = provider.provider_name(),
        "Starting ingredient import"
    );

    for (index, recipe) in recipes.iter().enumerate() {
        let title = recipe.title.trim();
        if title.is_empty() {
            tracing::warn!(index, "Skipping recipe without a title");
            summary.skipped_untitled += 1;
            continue;
        }

        if store.recipe_exists(title)? {
            tracing::info!(title, "Skipping existing recipe");
            summary.skipped_existing += 1;
            continue;
        }

        let parsed = if recipe.ingredients.is_empty() {
            ParsedIngredients::default()
        } else {
            if called_api && !config.import_delay.is_zero() {
                tokio::time::sleep(config.import_delay).await;
            }
            called_api = true;

            match parse_ingredients(provider, &recipe.ingredients, config).await {
                Ok(parsed) => parsed,
                Err(failure) => {
                    tracing::error!(title, error = %failure, "Failed to parse ingredients");
                    summary.failed += 1;
                    continue;
                }
            }
        };

        summary.dropped_ingredients += parsed.dropped;

        match store.insert_recipe_with_ingredients(title, &parsed.items) {
            Ok(recipe_id) => {
                tracing::info!(
                    title,
                    recipe_id,
                    ingredients = parsed.items.len(),
                    "Imported recipe"
                );
                for ingredient in &parsed.items {
                    tracing::debug!(
                        name = %ingredient.name,
                        quantity = ?ingredient.quantity,
                        unit = ?ingredient.unit.map(|u| u.as_str()),
                        "Stored ingredient"
                    );
                }
                summary.imported += 1;
                summary.ingredient_rows += parsed.items.len();
            }
            Err(e) => {
                tracing::error!(title, error = %e, "Recipe insert rolled back");
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped_existing,
        failed = summary.failed,
        "Ingredient import complete"
    );

    Ok(summary)
}
