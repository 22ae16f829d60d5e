use std::sync::Arc;

use claims_batch::{list_images, BatchOrchestrator};
use claims_core::{group_claims, ClaimOutcome, ClaimsError, ImageSide};
use claims_tests::{write_images, StubExtractor};

const OK_REPLY: &str = r#"{"claim":"ok"}"#;

// ---------------------------------------------------------------------------
// End-to-end runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn crash_statements_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(
        input.path(),
        &["crash1_front.jpeg", "crash1_back.jpeg", "crash2_front.jpeg"],
    );
    let output_path = output.path().join("gpt").join("gpt4_statement_results.json");

    let extractor = Arc::new(StubExtractor::replying(OK_REPLY));
    let report = BatchOrchestrator::new(extractor.clone())
        .run(input.path(), &output_path)
        .await
        .expect("batch run should succeed");

    let document = std::fs::read_to_string(&output_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&document).unwrap();
    assert_eq!(parsed, serde_json::json!({ "crash1": OK_REPLY }));
    assert_eq!(document, "{\n  \"crash1\": \"{\\\"claim\\\":\\\"ok\\\"}\"\n}");

    assert_eq!(report.processed(), 1);
    assert_eq!(report.total_claims(), 2);
    assert_eq!(report.files_scanned, 3);
    assert_eq!(extractor.pair_calls(), 1);
    assert_eq!(
        report.claims["crash2"],
        ClaimOutcome::SkippedIncomplete {
            missing: ImageSide::Back
        }
    );
}

#[tokio::test]
async fn only_complete_pairs_are_extracted() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(input.path(), &["c1_front.jpg", "c1_back.jpg", "c2_front.png"]);

    let extractor = Arc::new(StubExtractor::replying(OK_REPLY));
    let report = BatchOrchestrator::new(extractor.clone())
        .run(input.path(), &output.path().join("results.json"))
        .await
        .unwrap();

    assert_eq!(extractor.pair_calls(), 1);
    assert_eq!(extractor.fronts_seen(), vec!["c1_front.jpg"]);
    assert_eq!(report.results.keys().collect::<Vec<_>>(), vec!["c1"]);
    assert_eq!(report.attempted(), 1);
}

#[tokio::test]
async fn extraction_failure_leaves_empty_document() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(input.path(), &["c1_front.jpg", "c1_back.jpg", "c2_front.png"]);
    let output_path = output.path().join("results.json");

    let extractor = Arc::new(StubExtractor::replying(OK_REPLY).failing_on("c1_"));
    let report = BatchOrchestrator::new(extractor)
        .run(input.path(), &output_path)
        .await
        .expect("a failed claim must not abort the batch");

    assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "{}");
    assert_eq!(report.processed(), 0);
    assert_eq!(report.attempted(), 1);
    let failed = report.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "c1");
    assert!(failed[0].1.contains("provider rejected"));
}

#[tokio::test]
async fn one_failure_does_not_block_other_claims() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(
        input.path(),
        &[
            "a1_front.jpg",
            "a1_back.jpg",
            "b2_front.jpg",
            "b2_back.jpg",
            "c3_front.jpg",
            "c3_back.jpg",
        ],
    );

    let extractor = Arc::new(StubExtractor::replying(OK_REPLY).failing_on("b2_"));
    let report = BatchOrchestrator::new(extractor.clone())
        .with_max_concurrency(3)
        .run(input.path(), &output.path().join("results.json"))
        .await
        .unwrap();

    assert_eq!(extractor.pair_calls(), 3);
    assert_eq!(report.processed(), 2);
    assert!(report.results.contains_key("a1"));
    assert!(report.results.contains_key("c3"));
    assert!(!report.results.contains_key("b2"));
    assert!(matches!(
        report.claims["b2"],
        ClaimOutcome::SkippedExtractionFailed { .. }
    ));
}

#[tokio::test]
async fn repeated_runs_write_identical_documents() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(
        input.path(),
        &[
            "z9_back.png",
            "z9_front.png",
            "a1_front.jpg",
            "a1_back.jpg",
            "m5_front.jpeg",
            "m5_back.JPEG",
        ],
    );
    let first = output.path().join("first.json");
    let second = output.path().join("second.json");

    let orchestrator = BatchOrchestrator::new(Arc::new(StubExtractor::replying(OK_REPLY)));
    orchestrator.run(input.path(), &first).await.unwrap();
    orchestrator.run(input.path(), &second).await.unwrap();

    let first = std::fs::read(&first).unwrap();
    let second = std::fs::read(&second).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn rerun_overwrites_previous_document() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_path = output.path().join("results.json");
    std::fs::write(&output_path, "stale").unwrap();
    write_images(input.path(), &["c1_front.jpg", "c1_back.jpg"]);

    BatchOrchestrator::new(Arc::new(StubExtractor::replying("fresh")))
        .run(input.path(), &output_path)
        .await
        .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(parsed["c1"], "fresh");
}

#[tokio::test]
async fn duplicate_side_resolves_to_last_sorted_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(input.path(), &["c1_front.png", "c1_front.jpg", "c1_back.jpg"]);

    let extractor = Arc::new(StubExtractor::replying(OK_REPLY));
    let report = BatchOrchestrator::new(extractor.clone())
        .run(input.path(), &output.path().join("results.json"))
        .await
        .unwrap();

    // "c1_front.jpg" sorts before "c1_front.png", so the png is kept.
    assert_eq!(extractor.fronts_seen(), vec!["c1_front.png"]);
    assert_eq!(report.processed(), 1);
}

#[tokio::test]
async fn unparsable_and_unsupported_files_are_reported_or_ignored() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(
        input.path(),
        &["c1_front.jpg", "c1_back.jpg", "cover.jpg", "notes.txt", "c2_front.gif"],
    );

    let report = BatchOrchestrator::new(Arc::new(StubExtractor::replying(OK_REPLY)))
        .run(input.path(), &output.path().join("results.json"))
        .await
        .unwrap();

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.unparsable_files, vec!["cover.jpg".to_string()]);
    assert_eq!(report.total_claims(), 1);
    assert!(!report.claims.contains_key("c2"));
}

#[tokio::test]
async fn empty_directory_writes_empty_document() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let output_path = output.path().join("results.json");

    let report = BatchOrchestrator::new(Arc::new(StubExtractor::replying(OK_REPLY)))
        .run(input.path(), &output_path)
        .await
        .unwrap();

    assert_eq!(report.total_claims(), 0);
    assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "{}");
}

// ---------------------------------------------------------------------------
// Fatal errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn persistence_failure_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_images(input.path(), &["c1_front.jpg", "c1_back.jpg"]);
    let blocker = output.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let err = BatchOrchestrator::new(Arc::new(StubExtractor::replying(OK_REPLY)))
        .run(input.path(), &blocker.join("results.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClaimsError::Persistence { .. }));
}

#[tokio::test]
async fn missing_input_directory_is_an_error() {
    let output = tempfile::tempdir().unwrap();
    let result = BatchOrchestrator::new(Arc::new(StubExtractor::replying(OK_REPLY)))
        .run(&output.path().join("absent"), &output.path().join("results.json"))
        .await;

    assert!(matches!(result, Err(ClaimsError::Io(_))));
    assert!(!output.path().join("results.json").exists());
}

// ---------------------------------------------------------------------------
// Scan + group without extraction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scan_then_group_matches_expected_groups() {
    let input = tempfile::tempdir().unwrap();
    write_images(input.path(), &["c1_front.jpg", "c1_back.jpg", "c2_front.png"]);

    let groups = group_claims(list_images(input.path()).await.unwrap());

    assert_eq!(groups.len(), 2);
    assert_eq!(groups.get("c1").unwrap().front(), Some("c1_front.jpg"));
    assert_eq!(groups.get("c1").unwrap().back(), Some("c1_back.jpg"));
    assert_eq!(groups.get("c2").unwrap().front(), Some("c2_front.png"));
    assert_eq!(groups.get("c2").unwrap().back(), None);
}
