use diesel::prelude::*;

use super::{IngredientStore, RecipeRecord, RecipeStore};
use crate::category::Label;
use crate::db::DbPool;
use crate::error::StoreError;
use crate::ingredients::NormalizedIngredient;
use crate::models::{NewIngredient, NewRecipe, NewRecipeIngredient};
use crate::schema::{ingredients, recipe_ingredients, recipes};

/// PostgreSQL store backed by the shared pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RecipeStore for PgStore {
    fn fetch_unclassified(
        &mut self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<RecipeRecord>, StoreError> {
        let mut conn = self.pool.get()?;

        let mut query = recipes::table
            .filter(recipes::category.is_null())
            .select(RecipeRecord::as_select())
            .order(recipes::id.asc())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .into_boxed();
        if let Some(after_id) = after_id {
            query = query.filter(recipes::id.gt(after_id));
        }

        Ok(query.load(&mut conn)?)
    }

    fn write_labels(&mut self, updates: &[(i64, Label)]) -> Result<usize, StoreError> {
        let mut conn = self.pool.get()?;

        let updated = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let mut updated = 0;
            for &(recipe_id, label) in updates {
                updated += diesel::update(recipes::table.find(recipe_id))
                    .set(recipes::category.eq(label.as_str()))
                    .execute(conn)?;
            }
            Ok(updated)
        })?;

        Ok(updated)
    }
}

impl IngredientStore for PgStore {
    fn recipe_exists(&mut self, name: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.get()?;

        let exists = diesel::select(diesel::dsl::exists(
            recipes::table.filter(recipes::name.eq(name)),
        ))
        .get_result(&mut conn)?;

        Ok(exists)
    }

    fn insert_recipe_with_ingredients(
        &mut self,
        name: &str,
        parsed: &[NormalizedIngredient],
    ) -> Result<i64, StoreError> {
        let mut conn = self.pool.get()?;

        let recipe_id = conn.transaction::<i64, diesel::result::Error, _>(|conn| {
            let recipe_id: i64 = diesel::insert_into(recipes::table)
                .values(&NewRecipe {
                    name,
                    description: "",
                })
                .returning(recipes::id)
                .get_result(conn)?;

            for ingredient in parsed {
                diesel::insert_into(ingredients::table)
                    .values(&NewIngredient {
                        name: &ingredient.name,
                    })
                    .on_conflict(ingredients::name)
                    .do_nothing()
                    .execute(conn)?;

                let ingredient_id: i64 = ingredients::table
                    .filter(ingredients::name.eq(&ingredient.name))
                    .select(ingredients::id)
                    .first(conn)?;

                diesel::insert_into(recipe_ingredients::table)
                    .values(&NewRecipeIngredient {
                        recipe_id,
                        ingredient_id,
                        quantity: ingredient.quantity,
                        unit: ingredient.unit.map(|u| u.as_str()),
                    })
                    .execute(conn)?;
            }

            Ok(recipe_id)
        })?;

        Ok(recipe_id)
    }
}
