//! Storage seams for the two batch modes.
//!
//! The orchestrators only see these traits. [`PgStore`] is the real
//! implementation; [`MemoryStore`] backs the tests and can be told to fail.

mod memory;
mod pg;

pub use memory::{MemoryStore, StoredIngredient};
pub use pg::PgStore;

use crate::category::Label;
use crate::error::StoreError;
use crate::ingredients::NormalizedIngredient;
pub use crate::models::RecipeRecord;

/// Recipes waiting for a category, and somewhere to put the answers.
pub trait RecipeStore {
    /// Up to `limit` recipes with no category and an id above `after_id`,
    /// in id order.
    fn fetch_unclassified(
        &mut self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<RecipeRecord>, StoreError>;

    /// Write all labels in one transaction. Either every row is updated or
    /// none is.
    fn write_labels(&mut self, updates: &[(i64, Label)]) -> Result<usize, StoreError>;
}

/// Recipe rows plus their parsed ingredients.
pub trait IngredientStore {
    fn recipe_exists(&mut self, name: &str) -> Result<bool, StoreError>;

    /// Insert a recipe, its ingredient names and the joining rows in one
    /// transaction, returning the new recipe id.
    fn insert_recipe_with_ingredients(
        &mut self,
        name: &str,
        ingredients: &[NormalizedIngredient],
    ) -> Result<i64, StoreError>;
}
