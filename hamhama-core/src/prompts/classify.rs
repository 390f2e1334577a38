//! Batch classification prompt: one category per recipe name.

use serde_json::{json, Value};

use crate::category::{Category, UNKNOWN_LABEL};

/// Prompt name for logs.
pub const CLASSIFY_PROMPT_NAME: &str = "classify_recipes";

/// Compact JSON array of `{"recipe_id", "name"}` objects, in batch order.
pub fn render_recipe_list<'a, I>(recipes: I) -> String
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    let list: Vec<Value> = recipes
        .into_iter()
        .map(|(id, name)| json!({"recipe_id": id, "name": name}))
        .collect();
    Value::Array(list).to_string()
}

/// Render the classification prompt for a batch of `(id, name)` pairs.
pub fn render_classify_prompt<'a, I>(recipes: I) -> String
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    let categories = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an expert recipe classifier. You will receive a JSON list of recipes, each with a "recipe_id" and a "name".
Classify EACH recipe, using only its name, into exactly one of these categories:

{categories}

RULES:
1. Judge every recipe name on its own.
2. Pick the single best category from the list above.
3. If the name alone is not enough to decide, use "{unknown}".
4. Reply with a single JSON object and nothing else. It has one key, "classifications".
5. "classifications" is a JSON list with one entry per input recipe.
6. Each entry has exactly two keys:
   - "recipe_id": the integer id from the input
   - "category": one of the categories above, or "{unknown}"

EXAMPLE INPUT:
[{{"recipe_id":101,"name":"Classic Roast Chicken with Vegetables"}},{{"recipe_id":102,"name":"Fluffy Blueberry Pancakes"}},{{"recipe_id":103,"name":"Ingredient Prep Guide"}}]

EXAMPLE OUTPUT:
{{
  "classifications": [
    {{"recipe_id": 101, "category": "DINNER"}},
    {{"recipe_id": 102, "category": "BREAKFAST"}},
    {{"recipe_id": 103, "category": "{unknown}"}}
  ]
}}

NOW CLASSIFY THESE RECIPES:
{recipes}"#,
        categories = categories,
        unknown = UNKNOWN_LABEL,
        recipes = render_recipe_list(recipes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_list_is_compact() {
        let list = render_recipe_list([(101, "Classic Roast Chicken"), (102, "Pancakes")]);
        assert_eq!(
            list,
            r#"[{"name":"Classic Roast Chicken","recipe_id":101},{"name":"Pancakes","recipe_id":102}]"#
        );
    }

    #[test]
    fn test_render_prompt() {
        let prompt = render_classify_prompt([(7, "Tomato \"Soup\"")]);

        assert!(prompt.contains("CONDIMENT_SAUCE"));
        assert!(prompt.contains("\"classifications\""));
        assert!(prompt.ends_with(r#"[{"name":"Tomato \"Soup\"","recipe_id":7}]"#));
    }
}
