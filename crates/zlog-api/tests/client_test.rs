#![allow(clippy::unwrap_used)]
// Integration tests for `ZlogClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zlog_api::{Error, LogEntry, Project, ProjectId, ZlogClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ZlogClient) {
    let server = MockServer::start().await;
    let client = ZlogClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Project tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_projects_bare_array() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Shop", "api_key": "key-one-0000", "created_at": "2024-06-15T10:30:00Z" },
            { "id": "p2", "name": "Blog", "api_key": "key-two-0000", "created_at": "2024-06-16T10:30:00Z" }
        ])))
        .mount(&server)
        .await;

    let projects: Vec<Project> = client.list_projects().await.unwrap().into_items("projects");
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].id, ProjectId::from("p1"));
    assert_eq!(projects[1].name, "Blog");
}

#[tokio::test]
async fn test_list_projects_wrapped_and_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "projects": [] })))
        .mount(&server)
        .await;

    let projects: Vec<Project> = client.list_projects().await.unwrap().into_items("projects");
    assert!(projects.is_empty());
}

#[tokio::test]
async fn test_create_project_posts_name() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .and(body_json(json!({ "name": "Checkout" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9,
            "name": "Checkout",
            "api_key": "zlog_abcdefghijkl",
            "created_at": "2024-06-17T08:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let project = client.create_project("Checkout").await.unwrap();
    assert_eq!(project.id.as_str(), "9");
    assert_eq!(project.masked_api_key().as_deref(), Some("zlog…ijkl"));
}

// ── Log tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_logs_sends_query_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("project_id", "p1"))
        .and(query_param("q", "500 err"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [
                { "id": 2, "time": "2024-06-15T10:31:00Z", "method": "POST", "path": "/pay", "status": 500, "ip": "10.0.0.2", "latency_ms": 80, "message": "err" },
                { "id": 1, "time": "2024-06-15T10:30:00Z", "method": "GET", "path": "/a", "status": 200, "ip": "10.0.0.1", "latency_ms": 4, "message": "" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let logs: Vec<LogEntry> = client
        .list_logs(&ProjectId::from("p1"), Some("500 err"), 200)
        .await
        .unwrap()
        .into_items("logs");

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].status, 500);
    assert_eq!(logs[1].path, "/a");
}

#[tokio::test]
async fn test_list_logs_omits_empty_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("project_id", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client
        .list_logs(&ProjectId::from("p1"), Some(""), 50)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].url.query().unwrap_or_default().contains("q="));
}

// ── Stats tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_stats_partial_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .and(query_param("project_id", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 5 })))
        .mount(&server)
        .await;

    let stats = client.get_stats(&ProjectId::from("p1")).await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.errors(), 0);
}

// ── Snippets / health ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_snippets() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/snippets"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "express": "// express", "extra": 1 })),
        )
        .mount(&server)
        .await;

    let snippets = client.get_snippets().await.unwrap();
    assert_eq!(snippets.express.as_deref(), Some("// express"));
    assert!(snippets.hono.is_none());
}

#[tokio::test]
async fn test_health_ok() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    client.health().await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_carries_status_and_detail() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "project not found" })))
        .mount(&server)
        .await;

    let err = client.get_stats(&ProjectId::from("nope")).await.unwrap_err();
    match &err {
        Error::Http { status, message } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "project not found");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_error_body_uses_status_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client
        .list_logs(&ProjectId::from("p1"), None, 200)
        .await
        .unwrap_err();
    match err {
        Error::Http { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "503 Service Unavailable");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = client.get_stats(&ProjectId::from("p1")).await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = ZlogClient::from_reqwest(&uri, reqwest::Client::new()).unwrap();
    let result = client.list_projects().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}
