//! Integration tests for Literature Review
//!
//! These tests run whole batches through the public API: the production HTTP
//! clients against mock servers, and scripted collaborators for failure paths.

use literature_review::config::Config;
use literature_review::models::Year;
use literature_review::pipeline::{discover_documents, BatchCoordinator, FixedPhrase, RunOptions};
use literature_review::sources::{
    CrossRefSource, GeminiBackend, MockExtractor, MockGenerationBackend, MockMetadataSource,
};
use literature_review::utils::{CallOutcome, CitationStyle};
use mockito::Matcher;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.input.folder = dir.path().join("papers");
    config.output.summary_file = dir.path().join("literature_review.txt");
    config.output.review_file = dir.path().join("full_literature_review.txt");
    config.output.log_file = dir.path().join("log.txt");
    config.generation.backoff_unit_ms = 5;
    config.concurrency.max_workers = Some(4);
    config
}

fn add_papers(dir: &TempDir, names: &[&str]) {
    let papers = dir.path().join("papers");
    fs::create_dir_all(&papers).unwrap();
    for name in names {
        fs::write(papers.join(name), b"%PDF-1.4").unwrap();
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn bibliography(summary: &str) -> Vec<String> {
    summary
        .split_once("\nBibliography:\n")
        .map(|(_, lines)| lines.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

fn quiet() -> RunOptions {
    RunOptions {
        generate_review: true,
        quiet: true,
    }
}

#[tokio::test]
async fn test_full_run_against_http_services() {
    let dir = tempdir().unwrap();
    add_papers(&dir, &["LeCun_2015.pdf"]);
    let extractor = MockExtractor::new().with_text(
        "LeCun_2015.pdf",
        "Deep learning allows computational models... doi:10.1038/nature14539",
    );

    let mut gemini = mockito::Server::new_async().await;
    let summary_mock = gemini
        .mock("POST", Matcher::Regex(r":generateContent".to_string()))
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Regex("Summarize the following paper".to_string()))
        .with_status(200)
        .with_body(
            json!({"candidates": [{"content": {"parts": [{"text": "This study reviews deep learning."}]}}]})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let review_mock = gemini
        .mock("POST", Matcher::Regex(r":generateContent".to_string()))
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Literature Review Entries".to_string()))
        .with_status(200)
        .with_body(
            json!({"candidates": [{"content": {"parts": [{"text": "LITERATURE REVIEW\n\nBody."}]}}]})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut crossref = mockito::Server::new_async().await;
    let crossref_mock = crossref
        .mock("GET", Matcher::Regex(r"^/works/10\.1038".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "status": "ok",
                "message": {
                    "author": [{"family": "LeCun"}, {"family": "Bengio"}, {"family": "Hinton"}],
                    "title": ["Deep learning"],
                    "issued": {"date-parts": [[2015, 5, 27]]}
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let config = config_in(&dir);
    let backend = GeminiBackend::new(
        &gemini.url(),
        "gemini-1.5-flash",
        "test-key",
        Duration::from_secs(5),
    )
    .unwrap();
    let metadata = CrossRefSource::new(crossref.url(), None, Duration::from_secs(5)).unwrap();

    let report = BatchCoordinator::with_chooser(
        config.clone(),
        CitationStyle::Apa,
        Arc::new(extractor),
        Arc::new(backend),
        Arc::new(metadata),
        Arc::new(FixedPhrase(6)),
    )
    .run(quiet())
    .await
    .unwrap();

    summary_mock.assert_async().await;
    review_mock.assert_async().await;
    crossref_mock.assert_async().await;

    assert_eq!(report.processed, 1);
    assert!(report.review_written);

    let summary = read(&config.output.summary_file);
    assert!(summary.starts_with("This work reviews deep learning. (LeCun, 2015)\n\n"));
    assert_eq!(
        bibliography(&summary),
        vec!["[1] LeCun, Bengio, Hinton. \"Deep learning\", 2015. DOI: 10.1038/nature14539."]
    );
    assert_eq!(
        read(&config.output.review_file),
        "LITERATURE REVIEW\n\nBody."
    );
    assert_eq!(read(&config.output.log_file), "");
}

#[tokio::test]
async fn test_rate_limited_summary_recovers() {
    let dir = tempdir().unwrap();
    add_papers(&dir, &["Smith_2020.pdf"]);
    let backend = Arc::new(MockGenerationBackend::scripted(
        vec![CallOutcome::RateLimited, CallOutcome::RateLimited],
        CallOutcome::Success("This study measures Y.".to_string()),
    ));
    let config = config_in(&dir);

    let report = BatchCoordinator::with_chooser(
        config.clone(),
        CitationStyle::Ieee,
        Arc::new(MockExtractor::new().with_text("Smith_2020.pdf", "No identifier here.")),
        backend.clone(),
        Arc::new(MockMetadataSource::new()),
        Arc::new(FixedPhrase(0)),
    )
    .run(RunOptions {
        generate_review: false,
        quiet: true,
    })
    .await
    .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(backend.calls(), 3);

    let summary = read(&config.output.summary_file);
    assert!(summary.starts_with("This study measures Y. [1]\n\n"));
    assert_eq!(
        bibliography(&summary),
        vec!["[1] Smith, \"Smith 2020\", 2020."]
    );

    let log = read(&config.output.log_file);
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.contains(" - Rate limit exceeded in summary")));
}

#[tokio::test]
async fn test_exhausted_summary_keeps_entry_with_marker() {
    let dir = tempdir().unwrap();
    add_papers(&dir, &["report.pdf"]);
    let backend = Arc::new(MockGenerationBackend::scripted(
        Vec::new(),
        CallOutcome::RateLimited,
    ));
    let config = config_in(&dir);

    let report = BatchCoordinator::new(
        config.clone(),
        CitationStyle::Mla,
        Arc::new(MockExtractor::new().with_text("report.pdf", "Quarterly figures.")),
        backend.clone(),
        Arc::new(MockMetadataSource::new()),
    )
    .run(quiet())
    .await
    .unwrap();

    // three summary attempts, three review attempts
    assert_eq!(backend.calls(), 6);
    assert_eq!(report.processed, 1);
    assert_eq!(report.summary_failures, 1);
    assert!(!report.review_written);

    let summary = read(&config.output.summary_file);
    assert!(summary.starts_with("Error: Failed after multiple attempts. report (n.d.)\n\n"));
    assert_eq!(bibliography(&summary), vec!["[1] report. \"report.\" (n.d.)."]);
    assert!(!config.output.review_file.exists());
}

#[tokio::test]
async fn test_mixed_batch_orders_bibliography_and_drops_failures() {
    let dir = tempdir().unwrap();
    let names = ["Adams_2001.pdf", "corrupt.pdf", "Baker_2002.pdf", "Clark_2003.pdf", "notes.txt"];
    add_papers(&dir, &names);

    let extractor = MockExtractor::new()
        .with_text("Adams_2001.pdf", "First.")
        .with_text("Baker_2002.pdf", "Second, see 10.5555/baker.2002")
        .with_text("Clark_2003.pdf", "Third.");
    let metadata = MockMetadataSource::new().with_record(
        "10.5555/baker.2002",
        &["Baker", "Young"],
        "Resolved Title",
        Year::Known(2002),
    );
    let backend = Arc::new(
        MockGenerationBackend::always("Summary text.").with_delay(Duration::from_millis(3)),
    );
    let config = config_in(&dir);

    let report = BatchCoordinator::new(
        config.clone(),
        CitationStyle::Ieee,
        Arc::new(extractor),
        backend,
        Arc::new(metadata),
    )
    .run(RunOptions {
        generate_review: false,
        quiet: true,
    })
    .await
    .unwrap();

    assert_eq!(report.discovered, 4);
    assert_eq!(report.processed, 3);
    assert_eq!(report.skipped, 1);

    let summary = read(&config.output.summary_file);
    let lines = bibliography(&summary);
    assert_eq!(lines.len(), 3);

    // Ordinals come from discovery order, so they are increasing but may skip
    // the number given to the failed document.
    let ordinals: Vec<usize> = lines
        .iter()
        .map(|l| l[1..l.find(']').unwrap()].parse().unwrap())
        .collect();
    assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    assert!(ordinals.iter().all(|&n| (1..=4).contains(&n)));
    assert!(lines
        .iter()
        .any(|l| l.ends_with("Baker, Young. \"Resolved Title\", 2002. DOI: 10.5555/baker.2002.")));

    let log = read(&config.output.log_file);
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("corrupt.pdf"));
}

#[tokio::test]
async fn test_bibliography_follows_ordinals_when_documents_finish_in_reverse() {
    let dir = tempdir().unwrap();
    add_papers(&dir, &["Adams_2001.pdf", "Baker_2002.pdf", "Clark_2003.pdf", "Davis_2004.pdf"]);
    let config = config_in(&dir);
    let documents = discover_documents(&config.input.folder, "pdf").unwrap();
    let count = documents.len() as u64;

    // Later ordinals answer sooner, so completion order is the reverse of discovery
    let mut extractor = MockExtractor::new();
    let mut backend = MockGenerationBackend::always("Summary.");
    for document in &documents {
        let marker = format!("Document number {}.", document.ordinal);
        extractor = extractor.with_text(&document.file_name(), &marker);
        let wait = (count + 1 - document.ordinal as u64) * 60;
        backend = backend.with_delay_for(&marker, Duration::from_millis(wait));
    }

    let report = BatchCoordinator::new(
        config.clone(),
        CitationStyle::Ieee,
        Arc::new(extractor),
        Arc::new(backend),
        Arc::new(MockMetadataSource::new()),
    )
    .run(RunOptions {
        generate_review: false,
        quiet: true,
    })
    .await
    .unwrap();

    assert_eq!(report.processed, 4);

    let summary = read(&config.output.summary_file);
    let (entries, _) = summary.split_once("\nBibliography:\n").unwrap();
    let appended: Vec<&str> = entries.split("\n\n").filter(|e| !e.is_empty()).collect();
    assert_eq!(appended, vec!["Summary. [4]", "Summary. [3]", "Summary. [2]", "Summary. [1]"]);

    let lines = bibliography(&summary);
    let expected: Vec<String> = documents
        .iter()
        .map(|document| {
            let stem = document.file_name().replace(".pdf", "");
            let (author, year) = stem.split_once('_').unwrap();
            format!("[{}] {}, \"{} {}\", {}.", document.ordinal, author, author, year, year)
        })
        .collect();
    assert_eq!(lines, expected);
}

#[tokio::test]
async fn test_missing_input_folder() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);

    let result = BatchCoordinator::new(
        config.clone(),
        CitationStyle::Ieee,
        Arc::new(MockExtractor::new()),
        Arc::new(MockGenerationBackend::always("unused")),
        Arc::new(MockMetadataSource::new()),
    )
    .run(quiet())
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Folder '"));
    assert!(err.to_string().ends_with("' does not exist."));
    assert!(!config.output.summary_file.exists());
    assert!(!config.output.log_file.exists());
}
