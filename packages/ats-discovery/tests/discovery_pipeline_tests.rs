//! Integration tests for a full platform run.
//!
//! These tests exercise load -> query -> merge -> persist against a temp
//! directory, using the mock provider or a wiremock-backed Firecrawl API.

use std::fs;
use std::path::Path;

use ats_discovery::search::MockSearchProvider;
use ats_discovery::{
    discover_platform, ApiKey, DiscoveryError, DiscoveryOptions, Orchestrator, PlatformConfig,
    PlatformRegistry, PlatformSelection, ProviderKind, ProviderSettings, StopReason,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn platform(name: &str) -> PlatformConfig {
    PlatformRegistry::builtin()
        .unwrap()
        .get(name)
        .unwrap()
        .clone()
}

fn fast_options() -> DiscoveryOptions {
    DiscoveryOptions::new().without_delays()
}

/// Helper to seed a store file with the given header and rows.
fn seed_store(output_dir: &Path, platform: &PlatformConfig, header: &str, rows: &[&str]) {
    let path = platform.store_path(output_dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();

    let mut contents = format!("{header}\n");
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    fs::write(path, contents).unwrap();
}

fn lever_provider() -> MockSearchProvider {
    MockSearchProvider::new().with_urls(
        "site:jobs.lever.co",
        &[
            "https://jobs.lever.co/acme/job/123",
            "https://jobs.lever.co/beta?ref=x",
        ],
    )
}

#[tokio::test]
async fn test_new_companies_are_merged_into_existing_store() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    seed_store(dir.path(), &lever, "lever_url", &["https://jobs.lever.co/acme"]);

    let report = discover_platform(
        &lever,
        &lever_provider(),
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.companies_found, 2);
    assert_eq!(report.new_companies, 1);
    assert_eq!(report.total_companies, 2);
    assert_eq!(report.new_sample.len(), 1);
    assert_eq!(report.new_sample[0].as_str(), "https://jobs.lever.co/beta");
    assert_eq!(report.stop_reason, StopReason::StrategiesExhausted);
    assert_eq!(report.budget.queries_issued, 15);
    assert_eq!(report.budget.credits_used, 30);

    let written = fs::read_to_string(&report.output_file).unwrap();
    assert_eq!(
        written,
        "lever_url\nhttps://jobs.lever.co/acme\nhttps://jobs.lever.co/beta\n"
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    let provider = lever_provider();

    let first = discover_platform(
        &lever,
        &provider,
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    let after_first = fs::read(&first.output_file).unwrap();

    let second = discover_platform(
        &lever,
        &provider,
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    let after_second = fs::read(&second.output_file).unwrap();

    assert_eq!(first.new_companies, 2);
    assert_eq!(second.new_companies, 0);
    assert!(second.new_sample.is_empty());
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_failed_third_query_still_uses_full_budget() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    let provider = lever_provider()
        .failing_on("site:jobs.lever.co jobs")
        .with_urls("site:jobs.lever.co hiring", &["https://jobs.lever.co/gamma/44"]);

    let report = discover_platform(
        &lever,
        &provider,
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(provider.call_count(), 15);
    assert_eq!(provider.calls()[2], "site:jobs.lever.co jobs");
    assert_eq!(report.budget.queries_issued, 15);
    assert_eq!(report.budget.failed_queries, 1);
    assert_eq!(report.total_companies, 3);
}

#[tokio::test]
async fn test_legacy_url_column_is_read_and_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    seed_store(dir.path(), &lever, "url", &["https://jobs.lever.co/acme", ""]);

    let report = discover_platform(
        &lever,
        &lever_provider(),
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.new_companies, 1);

    let written = fs::read_to_string(&report.output_file).unwrap();
    assert!(written.starts_with("lever_url\n"));
    assert_eq!(written.lines().count(), 3);
}

#[tokio::test]
async fn test_undecodable_row_does_not_drop_existing_companies() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    let path = lever.store_path(dir.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        b"lever_url\nhttps://jobs.lever.co/a\nhttps://jobs.lever.co/b\nhttps://jobs.lever.co/\xff\n",
    )
    .unwrap();

    let provider = MockSearchProvider::new()
        .with_urls("site:jobs.lever.co", &["https://jobs.lever.co/new/job/1"]);

    let report = discover_platform(
        &lever,
        &provider,
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.new_companies, 1);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "lever_url\nhttps://jobs.lever.co/a\nhttps://jobs.lever.co/b\nhttps://jobs.lever.co/new\n"
    );
}

#[tokio::test]
async fn test_unwritable_store_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    // A directory where the store file should be: unreadable and unrenameable
    fs::create_dir_all(lever.store_path(dir.path())).unwrap();

    let result = discover_platform(
        &lever,
        &lever_provider(),
        &fast_options(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(DiscoveryError::Store(_))));
    assert!(!dir.path().join("lever/lever_companies.csv.tmp").exists());
}

#[tokio::test]
async fn test_cancelled_run_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let lever = platform("lever");
    seed_store(dir.path(), &lever, "lever_url", &["https://jobs.lever.co/acme"]);
    let before = fs::read(lever.store_path(dir.path())).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = discover_platform(
        &lever,
        &lever_provider(),
        &fast_options(),
        dir.path(),
        &cancel,
    )
    .await;

    assert!(matches!(result, Err(DiscoveryError::Cancelled)));
    assert_eq!(fs::read(lever.store_path(dir.path())).unwrap(), before);
}

#[tokio::test]
async fn test_all_sweep_writes_every_platform_store() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockSearchProvider::new()
        .with_urls(
            "site:jobs.ashbyhq.com",
            &["https://jobs.ashbyhq.com/acme/abc-123"],
        )
        .with_urls(
            "site:apply.workable.com",
            &[
                "https://apply.workable.com/delta/j/ABC/",
                "https://jobs.workable.com/company/x/delta-inc",
            ],
        );

    let orchestrator = Orchestrator::new(
        PlatformRegistry::builtin().unwrap(),
        provider.clone(),
        fast_options().with_max_queries(2),
        dir.path(),
    );

    let outcomes = orchestrator.run(&PlatformSelection::All).await.unwrap();

    let names: Vec<&str> = outcomes.iter().map(|o| o.platform.as_str()).collect();
    assert_eq!(names, vec!["ashby", "greenhouse", "lever", "workable"]);
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(provider.call_count(), 8);

    let ashby = fs::read_to_string(dir.path().join("ashby/companies.csv")).unwrap();
    assert_eq!(ashby, "ashby_url\nhttps://jobs.ashbyhq.com/acme\n");

    let greenhouse =
        fs::read_to_string(dir.path().join("greenhouse/greenhouse_companies.csv")).unwrap();
    assert_eq!(greenhouse, "greenhouse_url\n");

    let workable = fs::read_to_string(dir.path().join("workable/workable_companies.csv")).unwrap();
    assert_eq!(
        workable,
        "workable_url\nhttps://apply.workable.com/delta\nhttps://jobs.workable.com/company/x/delta-inc\n"
    );
}

#[tokio::test]
async fn test_firecrawl_backed_single_platform_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "web": [
                    {"url": "https://boards.greenhouse.io/acme/jobs/1"},
                    {"url": "https://job-boards.greenhouse.io/beta"},
                    {"url": "https://www.greenhouse.io/pricing"}
                ]
            }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let settings = ProviderSettings {
        kind: ProviderKind::Firecrawl,
        api_key: Some(ApiKey::new("fc-test")),
        base_url: server.uri(),
        pages_per_query: 1,
    };

    let orchestrator = Orchestrator::new(
        PlatformRegistry::builtin().unwrap(),
        settings,
        fast_options().with_max_queries(3),
        dir.path(),
    );

    let outcomes = orchestrator
        .run(&PlatformSelection::One("Greenhouse".to_string()))
        .await
        .unwrap();

    let report = outcomes[0].report.as_ref().unwrap();
    assert_eq!(report.provider, "firecrawl");
    assert_eq!(report.companies_found, 2);
    assert_eq!(report.budget.credits_used, 6);
    assert_eq!(report.stop_reason, StopReason::QueryLimit);

    let written =
        fs::read_to_string(dir.path().join("greenhouse/greenhouse_companies.csv")).unwrap();
    assert_eq!(
        written,
        "greenhouse_url\nhttps://boards.greenhouse.io/acme\nhttps://job-boards.greenhouse.io/beta\n"
    );
}
