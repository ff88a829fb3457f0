//! End-to-end tests for bulk generation against a SQLite page store.

mod common;

use common::{love_quotes_request, quiet_settings, temp_store, FlakyStore, TEST_BASE_URL};
use content_forge::bulk::{BulkError, BulkGenerator, GenerationRequest};
use content_forge::dimensions::{CombinationSpace, Theme};
use content_forge::generator::is_valid_combination;
use content_forge::page_store::PageStore;
use std::collections::HashSet;
use std::sync::Arc;

/// How many indices in `[0, target)` the validity rules reject.
fn expected_invalid(request: &GenerationRequest, target: usize) -> u64 {
    let space = request.space().unwrap();
    (0..target)
        .filter(|i| !is_valid_combination(&space.tuple_at(*i)))
        .count() as u64
}

#[test]
fn test_bulk_run_inserts_every_valid_combination() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    let request = love_quotes_request(200, 3);

    let report = bulk.run(&request).unwrap();
    let invalid = expected_invalid(&request, 200);

    assert!(invalid > 0);
    assert_eq!(report.requested, 200);
    assert_eq!(report.target, 200);
    assert_eq!(report.workers, 3);
    assert_eq!(report.processed, 200);
    assert_eq!(report.skipped_invalid, invalid);
    assert_eq!(report.inserted, 200 - invalid);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.errors, 0);
    assert!(report.worker_failures.is_empty());
    assert!(!report.cancelled);
    assert_eq!(store.count_pages().unwrap(), report.inserted);
}

#[test]
fn test_stored_pages_are_unique_by_slug_and_hash() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    let request = love_quotes_request(120, 4);
    bulk.run(&request).unwrap();

    let space = request.space().unwrap();
    let mut hashes = HashSet::new();
    let mut found = 0;
    for i in 0..120 {
        let tuple = space.tuple_at(i);
        if !is_valid_combination(&tuple) {
            continue;
        }
        let slug_prefix = tuple
            .present_values()
            .iter()
            .map(|v| v.replace('_', "-"))
            .collect::<Vec<_>>()
            .join("-");
        let page = content_forge::ContentGenerator::new(quiet_settings().generator)
            .generate(&tuple, 0)
            .unwrap();
        assert!(page.slug.starts_with(&slug_prefix));

        let stored = store.get_by_slug(&page.slug).unwrap().unwrap();
        assert_eq!(stored.page, page);
        assert!(stored.page.seo.canonical_url.starts_with(TEST_BASE_URL));
        assert!(hashes.insert(stored.page.generation.content_hash.clone()));
        found += 1;
    }
    assert_eq!(found as u64, store.count_pages().unwrap());
}

#[test]
fn test_rerun_is_idempotent() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    let request = love_quotes_request(150, 2);

    let first = bulk.run(&request).unwrap();
    assert!(first.inserted > 0);

    let second = bulk.run(&request).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, first.inserted);
    assert_eq!(second.skipped_invalid, first.skipped_invalid);
    assert_eq!(second.errors, 0);
    assert_eq!(store.count_pages().unwrap(), first.inserted);
}

#[test]
fn test_worker_count_does_not_change_the_result() {
    let (_dir_a, store_a) = temp_store();
    let (_dir_b, store_b) = temp_store();
    let request_one = love_quotes_request(90, 1);
    let request_many = love_quotes_request(90, 5);

    let one = BulkGenerator::new(store_a.clone(), quiet_settings())
        .run(&request_one)
        .unwrap();
    let many = BulkGenerator::new(store_b.clone(), quiet_settings())
        .run(&request_many)
        .unwrap();

    assert_eq!(one.inserted, many.inserted);
    assert_eq!(one.skipped_invalid, many.skipped_invalid);
    assert_eq!(many.workers, 5);
}

#[test]
fn test_new_offset_produces_new_pages() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    let mut request = love_quotes_request(60, 2);

    let first = bulk.run(&request).unwrap();
    request.variation_offset = 1000;
    let second = bulk.run(&request).unwrap();

    assert_eq!(second.inserted, first.inserted);
    assert_eq!(store.count_pages().unwrap(), first.inserted * 2);
}

#[test]
fn test_generator_is_reusable_after_reaching_target() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    let mut request = love_quotes_request(20, 2);
    request.themes = vec![Theme::MotivationalQuotes];
    assert_eq!(expected_invalid(&request, 20), 0);

    let first = bulk.run(&request).unwrap();
    assert_eq!(first.inserted, 20);
    assert!(!first.cancelled);
    assert!(!bulk.cancellation_token().is_cancelled());

    request.variation_offset = 1000;
    let second = bulk.run(&request).unwrap();
    assert_eq!(second.processed, 20);
    assert_eq!(second.inserted, first.inserted);
    assert!(!second.cancelled);
    assert_eq!(store.count_pages().unwrap(), 40);
}

#[test]
fn test_target_is_clamped_to_space_size() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    let mut request = love_quotes_request(1_000_000, 2);
    request.themes = vec![Theme::CareerAdvice];
    let space_len = request.space().unwrap().len();
    assert!(space_len < 1_000_000);

    let report = bulk.run(&request).unwrap();
    assert_eq!(report.requested, 1_000_000);
    assert_eq!(report.target, space_len);
    assert_eq!(report.processed, space_len as u64);
    assert_eq!(
        report.inserted + report.skipped_invalid,
        space_len as u64
    );
}

#[test]
fn test_generate_bulk_over_full_space() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());

    let report = bulk.generate_bulk(40, 2).unwrap();
    let invalid = expected_invalid(&GenerationRequest::new(40, 2), 40);

    assert_eq!(report.processed, 40);
    assert_eq!(report.inserted, 40 - invalid);
    assert_eq!(store.count_pages().unwrap(), report.inserted);
    assert!(CombinationSpace::full().len() > 40);
}

#[test]
fn test_zero_target_does_nothing() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());

    let report = bulk.generate_bulk(0, 4).unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.inserted, 0);
    assert_eq!(store.count_pages().unwrap(), 0);
}

#[test]
fn test_cancelled_run_stops_before_generating() {
    let (_dir, store) = temp_store();
    let bulk = BulkGenerator::new(store.clone(), quiet_settings());
    bulk.cancellation_token().cancel();

    let report = bulk.run(&love_quotes_request(100, 2)).unwrap();
    assert!(report.cancelled);
    assert_eq!(report.processed, 0);
    assert_eq!(store.count_pages().unwrap(), 0);
}

#[test]
fn test_unreachable_store_aborts_run() {
    let (_dir, store) = temp_store();
    let flaky = Arc::new(FlakyStore::unreachable(store));
    let bulk = BulkGenerator::new(flaky, quiet_settings());

    let result = bulk.run(&love_quotes_request(10, 1));
    assert!(matches!(result, Err(BulkError::StoreUnavailable(_))));
}

#[test]
fn test_fatal_insert_stops_every_worker() {
    let (_dir, store) = temp_store();
    let flaky = Arc::new(FlakyStore::failing_after(store.clone(), 0));
    let bulk = BulkGenerator::new(flaky, quiet_settings());

    let report = bulk.run(&love_quotes_request(200, 2)).unwrap();
    assert_eq!(report.worker_failures.len(), 2);
    assert!(!report.is_success());
    assert_eq!(report.inserted, 0);
    assert!(report.errors > 0);
    assert!(report.processed < 200);
    assert_eq!(store.count_pages().unwrap(), 0);
}

#[test]
fn test_partial_failure_keeps_committed_batches() {
    let (_dir, store) = temp_store();
    let flaky = Arc::new(FlakyStore::failing_after(store.clone(), 1));
    let bulk = BulkGenerator::new(flaky, quiet_settings());

    let report = bulk.run(&love_quotes_request(200, 2)).unwrap();
    assert!(!report.worker_failures.is_empty());
    assert!(report.inserted > 0);
    assert_eq!(store.count_pages().unwrap(), report.inserted);
}

#[test]
fn test_request_with_unknown_theme_does_not_parse() {
    let request: Result<GenerationRequest, _> =
        serde_json::from_str(r#"{"target_count": 5, "worker_count": 1, "themes": ["cat_memes"]}"#);
    assert!(request.is_err());
}
