//! Classification mode: one batch of recipes through the model.

use std::collections::BTreeSet;

use crate::config::BatchConfig;
use crate::llm::LlmProvider;
use crate::models::RecipeRecord;
use crate::prompts::classify::CLASSIFY_PROMPT_NAME;
use crate::prompts::render_classify_prompt;
use crate::reconcile::{reconcile_classifications, Reconciliation};
use crate::retry::{call_with_retry, BatchFailure};

/// Classify `batch` in a single prompt, retrying per the configured policy.
///
/// On success every recipe in the batch has exactly one label.
pub async fn classify_batch(
    provider: &dyn LlmProvider,
    batch: &[RecipeRecord],
    config: &BatchConfig,
) -> Result<Reconciliation, BatchFailure> {
    let expected: BTreeSet<i64> = batch.iter().map(|r| r.id).collect();
    let prompt = render_classify_prompt(batch.iter().map(|r| (r.id, r.name.as_str())));
    let request = config.generation.request(prompt);

    tracing::debug!(
        prompt = CLASSIFY_PROMPT_NAME,
        recipes = batch.len(),
        model = provider.model_name(),
        "Classifying batch"
    );

    call_with_retry(provider, &request, &config.retry, |text| {
        reconcile_classifications(text, &expected)
    })
    .await
}
