//! Ingredient parsing prompt: free text in, `{quantity, unit, name}` out.

use serde_json::Value;

use crate::units::Unit;

/// Prompt name for logs.
pub const PARSE_INGREDIENTS_PROMPT_NAME: &str = "parse_ingredients";

/// Render the parsing prompt for one recipe's raw ingredient strings.
pub fn render_parse_ingredients_prompt(ingredients: &[String]) -> String {
    let units = Unit::ALL
        .iter()
        .map(Unit::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let input = Value::from(ingredients.to_vec());

    format!(
        r#"You are an expert recipe parser. Turn the ingredient lines into JSON with EXACTLY this structure:
{{
  "Ingredients": [
    {{"quantity": number|null, "unit": "unit"|null, "name": "clean_name"}}
  ]
}}

RULES:
1. quantity:
   - numeric values only (1, 0.5, 0.25)
   - null when there is no quantity ("salt" -> null)
   - fractions become decimals ("¼" -> 0.25)
2. unit:
   - only units from this list: {units}
   - "pinch" for spices and herbs given without a unit
   - "whole" for complete items ("1 chicken")
   - null for anything else given without a unit
3. name:
   - drop every measurement, size and preparation note
   - drop parentheticals and descriptive clauses
   - keep only the base ingredient ("2 small acorn squash" -> "acorn squash")

EXAMPLE INPUT:
["1 (3½–4-lb.) whole chicken", "Freshly ground black pepper"]

EXAMPLE OUTPUT:
{{
  "Ingredients": [
    {{"quantity": 1, "unit": "whole", "name": "chicken"}},
    {{"quantity": null, "unit": "pinch", "name": "black pepper"}}
  ]
}}

NOW PARSE THESE INGREDIENTS:
{input:#}"#,
        units = units,
        input = input,
    )
}
