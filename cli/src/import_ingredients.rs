use std::path::Path;

use anyhow::{Context, Result};
use hamhama_core::{
    create_pool, create_provider, load_dataset, run_ingredient_import, BatchConfig, PgStore,
};

pub async fn import_ingredients(data: &Path) -> Result<()> {
    let config = BatchConfig::from_env().context("Invalid configuration")?;
    let recipes = load_dataset(data)
        .with_context(|| format!("Failed to load dataset {}", data.display()))?;
    let provider = create_provider(&config.llm).context("Failed to create LLM provider")?;
    let pool = create_pool(&config.database_url).context("Failed to connect to database")?;
    let mut store = PgStore::new(pool);

    let summary = run_ingredient_import(&mut store, provider.as_ref(), &recipes, &config)
        .await
        .context("Ingredient import aborted")?;

    println!();
    println!("Ingredient Import Results");
    println!("=========================");
    println!("Run ID: {}", summary.run_id());
    println!("Recipes in dataset: {}", summary.total);
    println!("Imported: {}", summary.imported);
    println!("Already present: {}", summary.skipped_existing);
    if summary.skipped_untitled > 0 {
        println!("Without title: {}", summary.skipped_untitled);
    }
    println!("Failed: {}", summary.failed);
    println!(
        "Ingredient rows: {} ({} dropped)",
        summary.ingredient_rows, summary.dropped_ingredients
    );

    Ok(())
}
