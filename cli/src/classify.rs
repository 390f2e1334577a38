use anyhow::{Context, Result};
use hamhama_core::{create_pool, create_provider, run_classification, BatchConfig, PgStore};

pub async fn classify() -> Result<()> {
    let config = BatchConfig::from_env().context("Invalid configuration")?;
    let provider = create_provider(&config.llm).context("Failed to create LLM provider")?;
    let pool = create_pool(&config.database_url).context("Failed to connect to database")?;
    let mut store = PgStore::new(pool);

    let summary = run_classification(&mut store, provider.as_ref(), &config)
        .await
        .context("Classification run aborted")?;

    println!();
    println!("Classification Results");
    println!("======================");
    println!("Run ID: {}", summary.run_id());
    println!("Pages: {}", summary.pages);
    println!(
        "Batches: {} ({} failed)",
        summary.batches, summary.failed_batches
    );
    println!("Recipes processed: {}", summary.processed);
    println!("Categorized: {}", summary.updated);
    println!("Unknown: {}", summary.unknown);
    println!("Failed: {}", summary.failed);

    Ok(())
}
