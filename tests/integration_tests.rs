//! Integration tests using wiremock to simulate the service.

use apisdk::auth::{
    AccessToken, AllowedHostsValidator, ApiKeyAuthenticationProvider, ApiKeyLocation,
    BaseBearerTokenAuthenticationProvider, CachingAccessTokenProvider, StaticAccessTokenProvider,
    TokenSource,
};
use apisdk::config::RequestConfiguration;
use apisdk::models::{ErrorBody, ModelArtifactUpdate, ModelArtifactsQuery};
use apisdk::{
    AnonymousAuthenticationProvider, ApiClient, AuthenticationProvider, Error, HttpRequestAdapter,
    HttpTransport, PathBuilder,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Counts requests that actually reach the transport.
#[derive(Clone, Default)]
struct CountingTransport {
    inner: reqwest::Client,
    calls: Arc<AtomicUsize>,
}

impl CountingTransport {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for CountingTransport {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(request).await
    }
}

/// Records whether an in-flight transport call ran to completion or was dropped.
#[derive(Clone, Default)]
struct DropTrackingTransport {
    inner: reqwest::Client,
    started: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

struct SetOnDrop(Arc<AtomicBool>);

impl Drop for SetOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for DropTrackingTransport {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.started.store(true, Ordering::SeqCst);
        let _guard = SetOnDrop(self.dropped.clone());
        let response = self.inner.execute(request).await;
        self.completed.store(true, Ordering::SeqCst);
        response
    }
}

/// Issues `token-1`, `token-2`, ... and counts how often it was asked.
#[derive(Clone, Default)]
struct SequentialTokenSource {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TokenSource for SequentialTokenSource {
    async fn fetch_token(&self) -> apisdk::Result<AccessToken> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(AccessToken::expiring_in(
            format!("token-{}", n),
            Duration::from_secs(3600),
        ))
    }
}

fn client_for(server: &MockServer, transport: &CountingTransport) -> ApiClient {
    client_with_auth(server, transport, AnonymousAuthenticationProvider)
}

fn client_with_auth(
    server: &MockServer,
    transport: &CountingTransport,
    auth: impl AuthenticationProvider + 'static,
) -> ApiClient {
    let adapter = HttpRequestAdapter::builder()
        .auth(auth)
        .base_url(server.uri())
        .unwrap()
        .transport(transport.clone())
        .build()
        .unwrap();
    ApiClient::new(adapter)
}

#[tokio::test]
async fn test_get_assembles_path_in_chain_order() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "y", "name": "Bar Y"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let bar = client.foo("x").bar("y").get().await.unwrap().unwrap();

    assert_eq!(bar.id.as_deref(), Some("y"));
    assert_eq!(bar.name.as_deref(), Some("Bar Y"));
    assert_eq!(transport.calls(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_non_terminal_accessors_perform_no_io() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();
    let client = client_for(&mock_server, &transport);

    let baz = client.baz("x");
    let foo = client.foo("x");
    let bar = foo.bar("y");
    let _ = client.api().model_registry().v1alpha3().model_artifacts().by_modelartifact_id("1");

    assert_eq!(baz.url().unwrap().path(), "/baz/x");
    assert_eq!(bar.url().unwrap().path(), "/foo/x/bar/y");
    assert_eq!(transport.calls(), 0);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_content_yields_none() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let bar = client.foo("x").bar("y").get().await.unwrap();

    assert!(bar.is_none());
}

#[tokio::test]
async fn test_http_error_4xx() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"code": "not-found", "message": "no such bar"})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let err = client.foo("x").bar("missing").get().await.unwrap_err();

    assert!(matches!(err, Error::Api { .. }), "Expected Api error, got {:?}", err);
    assert_eq!(err.status().unwrap().as_u16(), 404);
    let body: ErrorBody = err.error_body().unwrap();
    assert_eq!(body.code, "not-found");
    assert_eq!(body.message, "no such bar");
}

#[tokio::test]
async fn test_http_error_5xx() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Server error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let result = client.foo("x").bar("y").get().await;

    match result {
        Err(Error::Api {
            status,
            raw_response,
            ..
        }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(raw_response, "Server error");
        }
        _ => panic!("Expected Api error, got {:?}", result),
    }
    // No retries in this layer.
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_deserialization_error() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let result = client.foo("x").bar("y").get().await;

    match result {
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        _ => panic!("Expected DeserializationFailed, got {:?}", result),
    }
}

#[tokio::test]
async fn test_connection_failure_is_a_transport_error() {
    // Bind then drop a listener to get a port nobody is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let adapter = HttpRequestAdapter::builder()
        .base_url(format!("http://{}", addr))
        .unwrap()
        .build()
        .unwrap();
    let client = ApiClient::new(adapter);

    let err = client.foo("x").bar("y").get().await.unwrap_err();

    assert!(err.is_transport(), "Expected transport error, got {:?}", err);
    assert!(matches!(err, Error::Network(_)));
    assert!(err.status().is_none());
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "y"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let adapter = HttpRequestAdapter::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .timeout(Duration::from_millis(50))
        .transport(transport.clone())
        .build()
        .unwrap();
    let client = ApiClient::new(adapter);

    let result = client.foo("x").bar("y").get().await;
    assert!(matches!(result, Err(Error::Timeout)), "got {:?}", result);
}

#[tokio::test]
async fn test_dropping_the_call_cancels_it() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "y"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let transport = DropTrackingTransport::default();
    let adapter = HttpRequestAdapter::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .transport(transport.clone())
        .build()
        .unwrap();
    let client = ApiClient::new(adapter);

    let outcome =
        tokio::time::timeout(Duration::from_millis(100), client.foo("x").bar("y").get()).await;

    assert!(outcome.is_err());
    assert!(transport.started.load(Ordering::SeqCst));
    assert!(transport.dropped.load(Ordering::SeqCst));
    assert!(!transport.completed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_concurrent_chains_share_one_client() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path_regex(r"^/foo/[^/]+/bar/[^/]+$"))
        .respond_with(|req: &wiremock::Request| {
            let id = req.url.path().rsplit('/').next().unwrap_or_default().to_string();
            ResponseTemplate::new(200).set_body_json(json!({ "id": id }))
        })
        .expect(10)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);

    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.foo("x").bar(format!("bar-{}", i)).get().await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let bar = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(bar.id, Some(format!("bar-{}", i)));
    }
    assert_eq!(transport.calls(), 10);
}

#[tokio::test]
async fn test_default_and_per_request_headers() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .and(header("user-agent", "apisdk-tests"))
        .and(header("x-request-id", "req-1"))
        .and(query_param("trace", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "y"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = HttpRequestAdapter::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .default_header("User-Agent", "apisdk-tests")
        .unwrap()
        .transport(transport.clone())
        .build()
        .unwrap();
    let client = ApiClient::new(adapter);

    let config = RequestConfiguration::new()
        .with_header("x-request-id", "req-1")
        .unwrap()
        .with_query_param("trace", "1");

    let bar = client.foo("x").bar("y").with_config(config).get().await.unwrap();
    assert!(bar.is_some());
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "y"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = BaseBearerTokenAuthenticationProvider::new(StaticAccessTokenProvider::new(
        "secret-token",
        AllowedHostsValidator::new(["127.0.0.1"]).unwrap(),
    ));
    let client = client_with_auth(&mock_server, &transport, auth);

    let bar = client.foo("x").bar("y").get().await.unwrap();
    assert!(bar.is_some());
}

#[tokio::test]
async fn test_cached_bearer_token_is_fetched_once_for_concurrent_chains() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path_regex(r"^/foo/x/bar/[^/]+$"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "y"})))
        .expect(6)
        .mount(&mock_server)
        .await;

    let source = SequentialTokenSource::default();
    let auth = BaseBearerTokenAuthenticationProvider::new(CachingAccessTokenProvider::new(
        source.clone(),
        AllowedHostsValidator::new(["127.0.0.1"]).unwrap(),
    ));
    let client = client_with_auth(&mock_server, &transport, auth);

    let mut handles = Vec::new();
    for i in 0..6 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.foo("x").bar(format!("bar-{}", i)).get().await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_some());
    }

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(transport.calls(), 6);
}

#[tokio::test]
async fn test_api_key_in_query() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/foo/x/bar/y"))
        .and(query_param("api_key", "k3y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "y"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = ApiKeyAuthenticationProvider::new(
        "k3y",
        "api_key",
        ApiKeyLocation::QueryParameter,
        Vec::<String>::new(),
    )
    .unwrap();
    let client = client_with_auth(&mock_server, &transport, auth);

    client.foo("x").bar("y").get().await.unwrap();
}

#[tokio::test]
async fn test_model_artifacts_list_and_next_page() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("GET"))
        .and(path("/api/model_registry/v1alpha3/model_artifacts"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "1", "name": "mnist", "state": "LIVE"}],
            "nextPageToken": "page-2",
            "pageSize": 1,
            "size": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .and(query_param("nextPageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [],
            "nextPageToken": "",
            "pageSize": 1,
            "size": 0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let artifacts = client.api().model_registry().v1alpha3().model_artifacts();

    let page = artifacts
        .get(&ModelArtifactsQuery {
            page_size: Some(1),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name.as_deref(), Some("mnist"));

    let next = artifacts
        .with_url(&format!("{}/next", mock_server.uri()))
        .unwrap()
        .get(&ModelArtifactsQuery {
            next_page_token: Some(page.next_page_token.clone()),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert!(next.items.is_empty());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_model_artifact_patch_and_delete() {
    let mock_server = MockServer::start().await;
    let transport = CountingTransport::default();

    Mock::given(method("PATCH"))
        .and(path("/api/model_registry/v1alpha3/model_artifacts/42"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"description": "retrained"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "description": "retrained"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/model_registry/v1alpha3/model_artifacts/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, &transport);
    let item = client
        .api()
        .model_registry()
        .v1alpha3()
        .model_artifacts()
        .by_modelartifact_id("42");

    let updated = item
        .patch(&ModelArtifactUpdate {
            description: Some("retrained".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("retrained"));

    item.delete().await.unwrap();
    assert_eq!(transport.calls(), 2);
}
