use std::collections::HashMap;

use hamhama_core::{
    run_classification, BatchConfig, ClassificationSummary, FakeProvider, LlmError, MemoryStore,
};
use tokio::time::Instant;

fn config(overrides: &[(&str, &str)]) -> BatchConfig {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://unused"),
        ("HAMHAMA_LLM_PROVIDER", "fake"),
        ("HAMHAMA_BATCH_DELAY_MS", "0"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    BatchConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

fn assert_accounted(summary: &ClassificationSummary) {
    assert_eq!(
        summary.processed,
        summary.updated + summary.unknown + summary.failed,
        "{:?}",
        summary
    );
}

#[tokio::test(start_paused = true)]
async fn test_single_recipe_is_categorized() {
    let mut store = MemoryStore::new();
    let id = store.add_recipe("Classic Roast Chicken");
    let provider = FakeProvider::new();
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "dinner"}}]}}"#,
        id
    ));

    let summary = run_classification(&mut store, &provider, &config(&[]))
        .await
        .unwrap();

    assert_eq!(store.category(id), Some("DINNER"));
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unknown, 0);
    assert_eq!(provider.calls(), 1);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_missing_id_is_left_unset() {
    let mut store = MemoryStore::new();
    let soup = store.add_recipe("Tomato Soup");
    let mystery = store.add_recipe("Grandma's Special");
    let provider = FakeProvider::new();
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "SOUP"}}]}}"#,
        soup
    ));

    let summary = run_classification(&mut store, &provider, &config(&[]))
        .await
        .unwrap();

    assert_eq!(store.category(soup), Some("SOUP"));
    assert_eq!(store.category(mystery), None);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unknown, 1);
    // The cursor moves past the unknown recipe instead of fetching it again.
    assert_eq!(provider.calls(), 1);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_sentinel_is_persisted_when_configured() {
    let mut store = MemoryStore::new();
    let soup = store.add_recipe("Tomato Soup");
    let mystery = store.add_recipe("Grandma's Special");
    let provider = FakeProvider::new();
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "SOUP"}}, {{"recipe_id": {}, "category": "UNKNOWN"}}]}}"#,
        soup, mystery
    ));

    let summary = run_classification(
        &mut store,
        &provider,
        &config(&[("HAMHAMA_UNKNOWN_POLICY", "persist")]),
    )
    .await
    .unwrap();

    assert_eq!(store.category(mystery), Some("UNKNOWN"));
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unknown, 1);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_rolled_back_sentinel_write_counts_as_failed() {
    let mut store = MemoryStore::new();
    let ids: Vec<i64> = [
        "Tomato Soup",
        "Grandma's Special",
        "Leftovers",
        "Pot Roast",
        "Mystery Bake",
    ]
    .iter()
    .map(|name| store.add_recipe(name))
    .collect();
    store.fail_label_writes_for(ids[0]);

    let provider = FakeProvider::new();
    // ids[2] is omitted and becomes unknown.
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "SOUP"}}, {{"recipe_id": {}, "category": "UNKNOWN"}}]}}"#,
        ids[0], ids[1]
    ));
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "DINNER"}}, {{"recipe_id": {}, "category": "UNKNOWN"}}]}}"#,
        ids[3], ids[4]
    ));

    let summary = run_classification(
        &mut store,
        &provider,
        &config(&[
            ("HAMHAMA_UNKNOWN_POLICY", "persist"),
            ("HAMHAMA_PROMPT_BATCH_SIZE", "3"),
        ]),
    )
    .await
    .unwrap();

    for id in &ids[..3] {
        assert_eq!(store.category(*id), None);
    }
    assert_eq!(store.category(ids[3]), Some("DINNER"));
    assert_eq!(store.category(ids[4]), Some("UNKNOWN"));
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unknown, 1);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_unparseable_responses_fail_the_batch() {
    let mut store = MemoryStore::new();
    let a = store.add_recipe("Pancakes");
    let b = store.add_recipe("Waffles");
    let provider =
        FakeProvider::new().with_default_response("I'd be happy to help classify recipes!");

    let start = Instant::now();
    let summary = run_classification(&mut store, &provider, &config(&[]))
        .await
        .unwrap();

    assert_eq!(provider.calls(), 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.failed_batches, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(store.label_writes(), 0);
    assert_eq!(store.category(a), None);
    assert_eq!(store.category(b), None);
    assert_eq!(start.elapsed().as_secs(), 2 + 3);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_rolled_back_write_does_not_stop_the_run() {
    let mut store = MemoryStore::new();
    let ids: Vec<i64> = ["Omelette", "Granola", "Chili", "Brownies"]
        .iter()
        .map(|name| store.add_recipe(name))
        .collect();
    store.fail_label_writes_for(ids[1]);

    let provider = FakeProvider::new();
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "BREAKFAST"}}, {{"recipe_id": {}, "category": "BREAKFAST"}}]}}"#,
        ids[0], ids[1]
    ));
    provider.push_response(&format!(
        r#"{{"classifications": [{{"recipe_id": {}, "category": "DINNER"}}, {{"recipe_id": {}, "category": "DESSERT"}}]}}"#,
        ids[2], ids[3]
    ));

    let summary = run_classification(
        &mut store,
        &provider,
        &config(&[("HAMHAMA_PROMPT_BATCH_SIZE", "2")]),
    )
    .await
    .unwrap();

    assert_eq!(store.category(ids[0]), None);
    assert_eq!(store.category(ids[1]), None);
    assert_eq!(store.category(ids[2]), Some("DINNER"));
    assert_eq!(store.category(ids[3]), Some("DESSERT"));
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(store.label_writes(), 2);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_pages_until_exhausted() {
    let mut store = MemoryStore::new();
    for i in 0..5 {
        store.add_recipe(&format!("Recipe {}", i));
    }
    // Nothing ever gets classified; the run must still terminate.
    let provider = FakeProvider::new().with_default_response(r#"{"classifications": []}"#);

    let summary = run_classification(
        &mut store,
        &provider,
        &config(&[
            ("HAMHAMA_DB_PAGE_SIZE", "2"),
            ("HAMHAMA_PROMPT_BATCH_SIZE", "1"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.batches, 5);
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.unknown, 5);
    assert_eq!(provider.calls(), 5);
    assert_accounted(&summary);
}

#[tokio::test(start_paused = true)]
async fn test_delay_between_sub_batches_only() {
    let mut store = MemoryStore::new();
    for i in 0..3 {
        store.add_recipe(&format!("Recipe {}", i));
    }
    let provider = FakeProvider::new().with_default_response(r#"{"classifications": []}"#);

    let start = Instant::now();
    run_classification(
        &mut store,
        &provider,
        &config(&[
            ("HAMHAMA_PROMPT_BATCH_SIZE", "1"),
            ("HAMHAMA_BATCH_DELAY_MS", "3000"),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(start.elapsed().as_secs(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_then_success() {
    let mut store = MemoryStore::new();
    let id = store.add_recipe("Lemonade");
    let provider = FakeProvider::new();
    provider.push_error(LlmError::ApiError {
        status: 503,
        message: "overloaded".to_string(),
    });
    provider.push_response(&format!(
        "```json\n{{\"classifications\": [{{\"recipe_id\": {}, \"category\": \"Beverage\"}}]}}\n```",
        id
    ));

    let summary = run_classification(&mut store, &provider, &config(&[]))
        .await
        .unwrap();

    assert_eq!(store.category(id), Some("BEVERAGE"));
    assert_eq!(summary.failed, 0);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_aborts() {
    let mut store = MemoryStore::new();
    store.add_recipe("Anything");
    store.fail_fetches();
    let provider = FakeProvider::default();

    let result = run_classification(&mut store, &provider, &config(&[])).await;

    assert!(result.is_err());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_store() {
    let mut store = MemoryStore::new();
    let provider = FakeProvider::default();

    let summary = run_classification(&mut store, &provider, &config(&[]))
        .await
        .unwrap();

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.pages, 0);
    assert_eq!(provider.calls(), 0);
}
