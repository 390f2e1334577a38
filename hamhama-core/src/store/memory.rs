use std::collections::{BTreeMap, HashSet};

use super::{IngredientStore, RecipeRecord, RecipeStore};
use crate::category::Label;
use crate::error::StoreError;
use crate::ingredients::NormalizedIngredient;
use crate::units::Unit;

#[derive(Debug, Clone)]
struct MemoryRecipe {
    name: String,
    category: Option<String>,
}

/// One `recipe_ingredients` row, with the ingredient name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredIngredient {
    pub recipe_id: i64,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
}

/// In-memory store with the same transactional behaviour as [`super::PgStore`].
///
/// Writes can be made to fail so the orchestrators' rollback accounting can
/// be exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    recipes: BTreeMap<i64, MemoryRecipe>,
    ingredient_names: Vec<String>,
    recipe_ingredients: Vec<StoredIngredient>,
    fail_label_writes_for: HashSet<i64>,
    fail_inserts_for: HashSet<String>,
    fail_fetches: bool,
    label_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipe with no category, returning its id.
    pub fn add_recipe(&mut self, name: &str) -> i64 {
        let id = self.next_recipe_id();
        self.recipes.insert(
            id,
            MemoryRecipe {
                name: name.to_string(),
                category: None,
            },
        );
        id
    }

    /// Stored category of a recipe.
    pub fn category(&self, recipe_id: i64) -> Option<&str> {
        self.recipes
            .get(&recipe_id)
            .and_then(|r| r.category.as_deref())
    }

    pub fn recipe_id(&self, name: &str) -> Option<i64> {
        self.recipes
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(id, _)| *id)
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Distinct ingredient names, in insertion order.
    pub fn ingredient_names(&self) -> &[String] {
        &self.ingredient_names
    }

    pub fn ingredients_of(&self, recipe_id: i64) -> Vec<&StoredIngredient> {
        self.recipe_ingredients
            .iter()
            .filter(|row| row.recipe_id == recipe_id)
            .collect()
    }

    /// Number of label write transactions attempted.
    pub fn label_writes(&self) -> usize {
        self.label_writes
    }

    /// Make any label write that touches `recipe_id` fail.
    pub fn fail_label_writes_for(&mut self, recipe_id: i64) {
        self.fail_label_writes_for.insert(recipe_id);
    }

    /// Make inserting the recipe called `name` fail.
    pub fn fail_insert_for(&mut self, name: &str) {
        self.fail_inserts_for.insert(name.to_string());
    }

    /// Make every fetch fail.
    pub fn fail_fetches(&mut self) {
        self.fail_fetches = true;
    }

    fn next_recipe_id(&self) -> i64 {
        self.recipes.keys().next_back().map_or(1, |id| id + 1)
    }
}

impl RecipeStore for MemoryStore {
    fn fetch_unclassified(
        &mut self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<RecipeRecord>, StoreError> {
        if self.fail_fetches {
            return Err(StoreError::Unavailable("fetch failed".to_string()));
        }

        let lower = after_id.map_or(i64::MIN, |id| id.saturating_add(1));
        Ok(self
            .recipes
            .range(lower..)
            .filter(|(_, r)| r.category.is_none())
            .take(limit)
            .map(|(id, r)| RecipeRecord {
                id: *id,
                name: r.name.clone(),
            })
            .collect())
    }

    fn write_labels(&mut self, updates: &[(i64, Label)]) -> Result<usize, StoreError> {
        self.label_writes += 1;

        if let Some((id, _)) = updates
            .iter()
            .find(|(id, _)| self.fail_label_writes_for.contains(id))
        {
            return Err(StoreError::Unavailable(format!(
                "write rejected for recipe {}",
                id
            )));
        }

        let mut updated = 0;
        for (id, label) in updates {
            if let Some(recipe) = self.recipes.get_mut(id) {
                recipe.category = Some(label.as_str().to_string());
                updated += 1;
            }
        }
        Ok(updated)
    }
}

impl IngredientStore for MemoryStore {
    fn recipe_exists(&mut self, name: &str) -> Result<bool, StoreError> {
        Ok(self.recipes.values().any(|r| r.name == name))
    }

    fn insert_recipe_with_ingredients(
        &mut self,
        name: &str,
        parsed: &[NormalizedIngredient],
    ) -> Result<i64, StoreError> {
        if self.fail_inserts_for.contains(name) {
            return Err(StoreError::Unavailable(format!(
                "insert rejected for {:?}",
                name
            )));
        }

        let recipe_id = self.add_recipe(name);
        for ingredient in parsed {
            if !self.ingredient_names.contains(&ingredient.name) {
                self.ingredient_names.push(ingredient.name.clone());
            }
            self.recipe_ingredients.push(StoredIngredient {
                recipe_id,
                name: ingredient.name.clone(),
                quantity: ingredient.quantity,
                unit: ingredient.unit,
            });
        }
        Ok(recipe_id)
    }
}
