use std::collections::HashMap;
use std::time::Duration;

use reqmin_core::config::{Config, HeaderMinConfig};
use reqmin_core::{Orchestrator, RequestData};
use tokio::net::TcpListener;

async fn get_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

async fn spawn_fixture_server() -> u16 {
    let port = get_free_port().await;
    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    tokio::spawn(async move {
        axum::serve(listener, test_fixture_server::build_router())
            .await
            .unwrap();
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    port
}

fn base_request(index: usize, url: String, headers: Vec<(String, String)>) -> RequestData {
    RequestData {
        index,
        method: "GET".to_string(),
        url,
        path: "/essential-header".to_string(),
        query: HashMap::new(),
        headers,
        body_text: None,
        mime_type: None,
    }
}

#[tokio::test]
async fn strips_redundant_headers_but_keeps_the_essential_one() {
    let _ = tracing_subscriber::fmt::try_init();
    let port = spawn_fixture_server().await;

    let request = base_request(
        0,
        format!("http://127.0.0.1:{port}/essential-header"),
        vec![
            ("X-Required".to_string(), "yes".to_string()),
            ("X-Tracking-Id".to_string(), "abc123".to_string()),
            ("X-Session".to_string(), "deadbeef".to_string()),
        ],
    );

    let mut config = Config::default();
    config.minimization.headers = HeaderMinConfig::default();
    config.client.rate_limit.max_concurrent = 4;

    let orchestrator = Orchestrator::new(&config).expect("failed to build orchestrator");
    let processed = orchestrator.run(vec![request]).await;

    assert_eq!(processed.len(), 1);
    let outcome = &processed[0];
    assert!(outcome.result.matched, "minimization should have converged");
    assert!(outcome
        .result
        .headers
        .iter()
        .any(|(name, value)| name.eq_ignore_ascii_case("x-required") && value == "yes"));
    assert!(!outcome.result.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("x-tracking-id")));
    assert!(!outcome.result.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("x-session")));
}

#[tokio::test]
async fn minimizes_json_body_down_to_the_required_field() {
    let _ = tracing_subscriber::fmt::try_init();
    let port = spawn_fixture_server().await;

    let body = r#"{"important":"present","unused":"noise","nested":{"a":1,"b":2}}"#;
    let request = RequestData {
        index: 0,
        method: "POST".to_string(),
        url: format!("http://127.0.0.1:{port}/json-field"),
        path: "/json-field".to_string(),
        query: HashMap::new(),
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body_text: Some(body.to_string()),
        mime_type: Some("application/json".to_string()),
    };

    let config = Config::default();
    let orchestrator = Orchestrator::new(&config).expect("failed to build orchestrator");
    let processed = orchestrator.run(vec![request]).await;

    let outcome = &processed[0];
    assert!(outcome.result.matched);
    let final_body: serde_json::Value = serde_json::from_str(outcome.result.body_text.as_ref().unwrap()).unwrap();
    assert_eq!(final_body.get("important").and_then(|v| v.as_str()), Some("present"));
    assert!(final_body.get("unused").is_none());
    assert!(final_body.get("nested").is_none());
}

#[tokio::test]
async fn report_entries_stay_sorted_by_original_index_under_concurrency() {
    let _ = tracing_subscriber::fmt::try_init();
    let port = spawn_fixture_server().await;

    let requests: Vec<RequestData> = (0..8)
        .map(|i| base_request(i, format!("http://127.0.0.1:{port}/echo"), Vec::new()))
        .collect();

    let mut config = Config::default();
    config.client.rate_limit.max_concurrent = 8;
    let orchestrator = Orchestrator::new(&config).expect("failed to build orchestrator");
    let processed = orchestrator.run(requests).await;

    let indices: Vec<usize> = processed.iter().map(|p| p.request.index).collect();
    assert_eq!(indices, (0..8).collect::<Vec<_>>());
}
