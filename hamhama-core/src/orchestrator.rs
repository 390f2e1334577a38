//! Classification run: page through unclassified recipes, classify them in
//! sub-batches and write the results back.

use chrono::{DateTime, Utc};

use crate::category::Label;
use crate::classify::classify_batch;
use crate::config::{BatchConfig, UnknownPolicy};
use crate::error::StoreError;
use crate::llm::LlmProvider;
use crate::store::{RecipeRecord, RecipeStore};

/// Totals for one classification run.
///
/// Every fetched recipe lands in exactly one of `updated`, `unknown` or
/// `failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationSummary {
    pub started_at: DateTime<Utc>,
    pub pages: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub processed: usize,
    pub updated: usize,
    pub unknown: usize,
    pub failed: usize,
}

impl ClassificationSummary {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            pages: 0,
            batches: 0,
            failed_batches: 0,
            processed: 0,
            updated: 0,
            unknown: 0,
            failed: 0,
        }
    }

    pub fn run_id(&self) -> String {
        self.started_at.format("classify-%Y-%m-%d_%H-%M-%S").to_string()
    }
}

/// Classify every recipe that has no category yet.
///
/// Pages are read with an id cursor, so a recipe left unclassified in this
/// run is not offered again until the next one. Model failures and failed
/// writes are counted and the run moves on; a failed read ends the run with
/// an error, keeping everything already committed.
pub async fn run_classification<S>(
    store: &mut S,
    provider: &dyn LlmProvider,
    config: &BatchConfig,
) -> Result<ClassificationSummary, StoreError>
where
    S: RecipeStore + ?Sized,
{
    let mut summary = ClassificationSummary::new();
    let mut cursor = None;

    tracing::info!(
        provider = provider.provider_name(),
        model = provider.model_name(),
        page_size = config.db_page_size,
        batch_size = config.prompt_batch_size,
        "Starting classification run"
    );

    loop {
        let page = store.fetch_unclassified(cursor, config.db_page_size)?;
        let Some(last) = page.last() else {
            break;
        };
        cursor = Some(last.id);
        summary.pages += 1;

        tracing::info!(
            page = summary.pages,
            recipes = page.len(),
            first_id = page[0].id,
            last_id = last.id,
            "Fetched page"
        );

        let batches: Vec<&[RecipeRecord]> = page.chunks(config.prompt_batch_size).collect();
        for (index, batch) in batches.iter().enumerate() {
            process_batch(store, provider, config, batch, &mut summary).await;

            if index + 1 < batches.len() && !config.batch_delay.is_zero() {
                tokio::time::sleep(config.batch_delay).await;
            }
        }
    }

    tracing::info!(
        processed = summary.processed,
        updated = summary.updated,
        unknown = summary.unknown,
        failed = summary.failed,
        "Classification run complete"
    );

    Ok(summary)
}

async fn process_batch<S>(
    store: &mut S,
    provider: &dyn LlmProvider,
    config: &BatchConfig,
    batch: &[RecipeRecord],
    summary: &mut ClassificationSummary,
) where
    S: RecipeStore + ?Sized,
{
    summary.batches += 1;
    summary.processed += batch.len();

    let reconciliation = match classify_batch(provider, batch, config).await {
        Ok(reconciliation) => reconciliation,
        Err(failure) => {
            tracing::error!(
                batch = summary.batches,
                recipes = batch.len(),
                error = %failure,
                "Batch failed, leaving recipes unclassified"
            );
            summary.failed_batches += 1;
            summary.failed += batch.len();
            return;
        }
    };

    let updates: Vec<(i64, Label)> = reconciliation
        .labels
        .iter()
        .filter(|(_, label)| {
            label.is_known() || config.unknown_policy == UnknownPolicy::PersistSentinel
        })
        .map(|(id, label)| (*id, *label))
        .collect();
    let sentinel_writes = updates.iter().filter(|(_, l)| !l.is_known()).count();
    let unknown_unwritten = reconciliation.unknown - sentinel_writes;

    if updates.is_empty() {
        summary.unknown += reconciliation.unknown;
        return;
    }

    match store.write_labels(&updates) {
        Ok(_) => {
            summary.updated += updates.len() - sentinel_writes;
            summary.unknown += reconciliation.unknown;
            tracing::info!(
                batch = summary.batches,
                updated = updates.len() - sentinel_writes,
                unknown = reconciliation.unknown,
                "Batch committed"
            );
        }
        Err(e) => {
            tracing::error!(
                batch = summary.batches,
                rows = updates.len(),
                error = %e,
                "Batch write rolled back"
            );
            summary.failed += updates.len();
            summary.unknown += unknown_unwritten;
        }
    }
}
