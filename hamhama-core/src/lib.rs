pub mod category;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod images;
pub mod import;
pub mod ingredients;
pub mod json_extract;
pub mod llm;
pub mod models;
pub mod name_cleaner;
pub mod orchestrator;
pub mod prompts;
pub mod reconcile;
pub mod retry;
pub mod schema;
pub mod store;
pub mod units;

pub use category::{Category, Label, UNKNOWN_LABEL};
pub use config::{BatchConfig, ConfigError, GenerationSettings, LlmConfig, UnknownPolicy};
pub use dataset::{load_dataset, DatasetError, DatasetRecipe};
pub use db::{create_pool, DbPool};
pub use error::StoreError;
pub use images::{relocate_images, ImageSummary};
pub use import::{run_ingredient_import, ImportSummary};
pub use ingredients::{parse_ingredients, NormalizedIngredient, ParsedIngredients};
pub use json_extract::extract_json_object;
pub use llm::{create_provider, FakeProvider, GeminiProvider, LlmError, LlmProvider};
pub use name_cleaner::clean_ingredient_name;
pub use orchestrator::{run_classification, ClassificationSummary};
pub use reconcile::{reconcile_classifications, Reconciliation, ResponseError};
pub use retry::{call_with_retry, BatchFailure, RetryPolicy};
pub use store::{IngredientStore, MemoryStore, PgStore, RecipeRecord, RecipeStore};
pub use units::{normalize_unit, Unit};
