use std::path::Path;

use jobwatch::models::Config;
use jobwatch::pipeline::run_watch;
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JOBS: &str = r#"{"jobs": [
    {"title": "SWE Intern", "company": "Acme Inc", "url": "https://x/1"},
    {"title": "Line Cook", "company": "Globex", "url": "https://x/2"},
    {"title": "", "company": "Acme Inc", "url": "https://x/3"}
]}"#;

async fn start_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(JOBS, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&server)
        .await;
    server
}

fn write_config(dir: &Path, server: &MockServer) -> Config {
    std::fs::write(dir.join("companies.txt"), "# tracked\nacme|Tier 1\n").unwrap();
    let config: Config = toml::from_str(&format!(
        r#"
        [notifier]
        token = "123:abc"
        chat_id = "42"
        api_base = "{uri}"

        [[sources]]
        kind = "json"
        name = "mock-api"
        url = "{uri}/jobs"
        items = "/jobs"
        position = "/title"
        company = "/company"
        link = "/url"
        "#,
        uri = server.uri()
    ))
    .unwrap();
    config.validate().unwrap();
    config
}

/// Decoded `text` fields of every message the mock Telegram API received.
async fn sent_messages(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|req| req.url.path().ends_with("/sendMessage"))
        .filter_map(|req| {
            url::form_urlencoded::parse(&req.body)
                .find(|(key, _)| key == "text")
                .map(|(_, value)| value.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn new_posting_is_notified_once() {
    let server = start_server().await;
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &server);

    let first = run_watch(&config, tmp.path(), false).await.unwrap();
    assert_eq!(first.fetched, 2);
    assert_eq!(first.irrelevant, 1);
    assert_eq!(first.notified, 1);
    assert_eq!(first.notify_failures, 0);
    assert_eq!(first.store_size, 1);

    let messages = sent_messages(&server).await;
    assert_eq!(messages.len(), 1);
    for part in ["Tier 1", "SWE Intern", "Acme Inc", "https://x/1"] {
        assert!(messages[0].contains(part), "missing {part} in {}", messages[0]);
    }

    let store: Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("seen.json")).unwrap())
            .unwrap();
    let entries = store.as_object().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries["https://x/1"]["company"], "Acme Inc");

    let audit = std::fs::read_to_string(tmp.path().join("checked_jobs.log")).unwrap();
    assert_eq!(audit.lines().count(), 1);
    assert!(audit.contains("NEW: [Tier 1] SWE Intern at Acme Inc"));

    let second = run_watch(&config, tmp.path(), false).await.unwrap();
    assert_eq!(second.notified, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(sent_messages(&server).await.len(), 1);
}

#[tokio::test]
async fn legacy_store_suppresses_known_postings() {
    let server = start_server().await;
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), &server);
    std::fs::write(tmp.path().join("seen.json"), r#"["https://x/1"]"#).unwrap();

    let report = run_watch(&config, tmp.path(), false).await.unwrap();
    assert_eq!(report.notified, 0);
    assert_eq!(report.duplicates, 1);

    let store: Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("seen.json")).unwrap())
            .unwrap();
    assert_eq!(store["https://x/1"]["timestamp"], "unknown");
    assert_eq!(store["https://x/1"]["company"], "Unknown");
}

#[tokio::test]
async fn unreachable_source_still_saves_store() {
    let server = start_server().await;
    let tmp = TempDir::new().unwrap();
    let mut config = write_config(tmp.path(), &server);
    config.sources.extend(
        toml::from_str::<Config>(
            r#"
            [[sources]]
            kind = "html"
            name = "offline"
            url = "http://127.0.0.1:9/jobs"
            row_selector = "tr"
            position_selector = "td.title"
            company_selector = "td.company"
            "#,
        )
        .unwrap()
        .sources,
    );

    let report = run_watch(&config, tmp.path(), false).await.unwrap();
    assert_eq!(report.source_failures, 1);
    assert_eq!(report.notified, 1);
    assert!(tmp.path().join("seen.json").exists());
}
