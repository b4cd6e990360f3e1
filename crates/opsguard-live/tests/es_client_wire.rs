use chrono::Utc;
use opsguard_live::seed::{self, DEFAULT_SEED};
use opsguard_live::{EsClient, IndexNames, LiveConfig, LiveError, QueryBackend, SeedData};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path, path_regex, query_param},
    Mock, MockServer, ResponseTemplate,
};

const API_KEY: &str = "test-key";

fn client_for(server: &MockServer) -> EsClient {
    EsClient::new(&LiveConfig::new(&server.uri(), API_KEY)).expect("client")
}

#[tokio::test]
async fn index_counts_uses_cat_indices_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cat/indices/*opsguard*"))
        .and(query_param("format", "json"))
        .and(query_param("h", "index,docs.count,store.size"))
        .and(header("authorization", "ApiKey test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "index": "logs-opsguard-incidents", "docs.count": "1200", "store.size": "1mb" },
            { "index": "metrics-opsguard-system", "docs.count": "300", "store.size": "90kb" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let counts = client_for(&server)
        .index_counts("*opsguard*")
        .await
        .expect("index counts");

    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].index, "logs-opsguard-incidents");
    assert_eq!(counts.iter().map(|c| c.docs()).sum::<u64>(), 1500);
}

#[tokio::test]
async fn esql_posts_query_and_format() {
    let server = MockServer::start().await;
    let query = "FROM logs-opsguard-incidents | STATS n = COUNT(*)";
    Mock::given(method("POST"))
        .and(path("/_query"))
        .and(header("authorization", "ApiKey test-key"))
        .and(body_json(json!({ "query": query, "format": "json" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": [{ "name": "n", "type": "long" }],
            "values": [[42]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).esql(query).await.expect("esql");

    assert_eq!(response.column("n"), Some(0));
    assert_eq!(response.values[0][0], json!(42));
}

#[tokio::test]
async fn non_success_status_keeps_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_query"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .esql("FROM x")
        .await
        .expect_err("401 must fail");

    match err {
        LiveError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn seed_recreates_indices_and_bulk_loads_every_document() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/[^/]+$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception" }
        })))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(header("content-type", "application/x-ndjson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": false,
            "items": [{ "index": { "status": 201 } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/[^/]+/_count$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 17 })))
        .expect(4)
        .mount(&server)
        .await;

    let indices = IndexNames::default();
    let data = SeedData::generate(Utc::now(), DEFAULT_SEED);
    let results = seed::seed(&client_for(&server), &indices, &data, true)
        .await
        .expect("seed");

    let names: Vec<&str> = results.iter().map(|r| r.index.as_str()).collect();
    assert_eq!(
        names,
        vec![
            indices.logs.as_str(),
            indices.metrics.as_str(),
            indices.business.as_str(),
            indices.incidents.as_str(),
        ]
    );
    assert!(results.iter().all(|r| r.count == Some(17)));
    assert!(results.iter().all(|r| r.outcome.failed == 0));

    let requests = server.received_requests().await.expect("recording enabled");
    let bulk_bodies: Vec<String> = requests
        .iter()
        .filter(|request| request.url.path() == "/_bulk")
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .collect();
    let lines: usize = bulk_bodies.iter().map(|body| body.lines().count()).sum();
    assert_eq!(lines, data.total() * 2);
    assert!(bulk_bodies.iter().all(|body| body.ends_with('\n')));
    assert!(bulk_bodies[0].starts_with(r#"{"index":{"_index":"logs-opsguard-incidents"}}"#));
}

#[tokio::test]
async fn existing_index_is_left_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/incidents-opsguard-history"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "resource_already_exists_exception" },
            "status": 400
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create_index("incidents-opsguard-history", &json!({ "properties": {} }))
        .await
        .expect("already-exists is tolerated");

    assert!(!created);
}

#[tokio::test]
async fn other_create_failures_surface() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/bad-index"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "mapper_parsing_exception" }
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .create_index("bad-index", &json!({ "properties": {} }))
        .await;

    assert!(matches!(result, Err(LiveError::Status { status: 400, .. })));
}
