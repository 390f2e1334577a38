//! Prompt templates for the two batch modes.

pub mod classify;
pub mod parse_ingredients;

pub use classify::render_classify_prompt;
pub use parse_ingredients::render_parse_ingredients_prompt;
