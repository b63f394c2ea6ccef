use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apichain_core::{ApiRequest, GraphQlRequest, GrpcRequest, RestRequest};
use apichain_exec::{
    ExecutorConfig, GraphQlHandler, GrpcHandler, HttpClient, HttpError, HttpRequestParts,
    HttpResponseParts, ProtocolHandler, ReqwestHttpClient, RestHandler,
};
use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rest_handler(config: ExecutorConfig) -> RestHandler {
    let http = ReqwestHttpClient::new(&config).unwrap();
    RestHandler::new(Arc::new(http), config)
}

#[tokio::test]
async fn rest_get_with_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("userId", "1"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "userId": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let handler = rest_handler(ExecutorConfig {
        base_url: Some(server.uri()),
        ..Default::default()
    });
    let req = ApiRequest::Rest(RestRequest {
        method: "GET".to_string(),
        endpoint: "/posts".to_string(),
        headers: BTreeMap::from([("X-Trace".to_string(), "abc".to_string())]),
        body: None,
        query_params: BTreeMap::from([("userId".to_string(), "1".to_string())]),
    });

    handler.validate(&req).unwrap();
    let resp = handler.execute(&req).await;

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body[0]["userId"], 1);
    assert_eq!(resp.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn rest_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Ada"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let handler = rest_handler(ExecutorConfig::default());
    let req = ApiRequest::Rest(RestRequest {
        method: "POST".to_string(),
        endpoint: format!("{}/users", server.uri()),
        body: Some(json!({"name": "Ada"})),
        ..Default::default()
    });

    let resp = handler.execute(&req).await;
    assert_eq!(resp.status_code, 201);
    assert_eq!(resp.body, json!({"id": 7}));
}

#[tokio::test]
async fn non_json_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let handler = rest_handler(ExecutorConfig::default());
    let req = ApiRequest::Rest(RestRequest {
        method: "GET".to_string(),
        endpoint: format!("{}/health", server.uri()),
        ..Default::default()
    });
    assert_eq!(handler.execute(&req).await.body, json!("OK"));
}

#[tokio::test]
async fn timeout_becomes_failed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let handler = rest_handler(ExecutorConfig {
        request_timeout: Duration::from_millis(200),
        ..Default::default()
    });
    let req = ApiRequest::Rest(RestRequest {
        method: "GET".to_string(),
        endpoint: format!("{}/slow", server.uri()),
        ..Default::default()
    });

    let resp = handler.execute(&req).await;
    assert_eq!(resp.status_code, 0);
    assert_eq!(resp.body["error"]["kind"], "timeout");
    assert!(resp.duration < 2000);
}

#[tokio::test]
async fn oversized_response_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    let handler = rest_handler(ExecutorConfig {
        max_response_bytes: 100,
        ..Default::default()
    });
    let req = ApiRequest::Rest(RestRequest {
        method: "GET".to_string(),
        endpoint: format!("{}/big", server.uri()),
        ..Default::default()
    });

    let resp = handler.execute(&req).await;
    assert_eq!(resp.status_code, 0);
    assert_eq!(resp.body["error"]["kind"], "response_too_large");
}

#[tokio::test]
async fn refused_connection_is_a_transport_failure() {
    let handler = rest_handler(ExecutorConfig::default());
    let req = ApiRequest::Rest(RestRequest {
        method: "GET".to_string(),
        endpoint: "http://127.0.0.1:1/nothing".to_string(),
        ..Default::default()
    });
    let resp = handler.execute(&req).await;
    assert_eq!(resp.status_code, 0);
    assert_eq!(resp.body["error"]["kind"], "network");
}

#[tokio::test]
async fn graphql_posts_query_and_variables() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_json(json!({
            "query": "query Country($code: ID!) { country(code: $code) { name } }",
            "variables": {"code": "BR"},
            "operationName": "Country"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"country": {"name": "Brazil"}}})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ExecutorConfig::default();
    let handler = GraphQlHandler::new(Arc::new(ReqwestHttpClient::new(&config).unwrap()), config);
    let req = ApiRequest::GraphQl(GraphQlRequest {
        endpoint: format!("{}/graphql", server.uri()),
        query: "query Country($code: ID!) { country(code: $code) { name } }".to_string(),
        variables: Some(BTreeMap::from([("code".to_string(), json!("BR"))])),
        operation_name: Some("Country".to_string()),
        headers: BTreeMap::new(),
    });

    let resp = handler.execute(&req).await;
    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body["data"]["country"]["name"], "Brazil");
}

/// Plays a gRPC server that echoes the request frame back.
#[derive(Default)]
struct EchoGrpc {
    seen: Mutex<Option<HttpRequestParts>>,
    status_header: Option<&'static str>,
}

#[async_trait]
impl HttpClient for EchoGrpc {
    async fn send(&self, req: HttpRequestParts, _: Duration, _: usize) -> Result<HttpResponseParts, HttpError> {
        *self.seen.lock().unwrap() = Some(req.clone());
        let mut headers = BTreeMap::from([("content-type".to_string(), "application/grpc+json".to_string())]);
        let body = match self.status_header {
            Some(code) => {
                headers.insert("grpc-status".to_string(), code.to_string());
                headers.insert("grpc-message".to_string(), "no%20such%20user".to_string());
                Vec::new()
            }
            None => req.body,
        };
        Ok(HttpResponseParts { status: 200, headers, body })
    }
}

fn grpc_request() -> ApiRequest {
    ApiRequest::Grpc(GrpcRequest {
        endpoint: "grpc.test:50051".to_string(),
        service: "users.v1.UserService".to_string(),
        method: "GetUser".to_string(),
        message: BTreeMap::from([("id".to_string(), json!("42"))]),
        metadata: BTreeMap::from([("authorization".to_string(), "Bearer t".to_string())]),
        tls: Some(true),
    })
}

#[tokio::test]
async fn grpc_unary_call_round_trips_message() {
    let http = Arc::new(EchoGrpc::default());
    let handler = GrpcHandler::new(http.clone(), ExecutorConfig::default());

    let resp = handler.execute(&grpc_request()).await;

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.body, json!({"id": "42"}));
    assert_eq!(resp.header("grpc-status"), Some("0"));

    let sent = http.seen.lock().unwrap().clone().unwrap();
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.url.as_str(), "https://grpc.test:50051/users.v1.UserService/GetUser");
    assert_eq!(sent.headers.get("te").map(String::as_str), Some("trailers"));
    assert_eq!(sent.headers.get("authorization").map(String::as_str), Some("Bearer t"));
    assert_eq!(sent.body[0], 0);
}

#[tokio::test]
async fn grpc_error_status_is_mapped() {
    let http = Arc::new(EchoGrpc {
        status_header: Some("5"),
        ..Default::default()
    });
    let handler = GrpcHandler::new(http, ExecutorConfig::default());

    let resp = handler.execute(&grpc_request()).await;

    assert_eq!(resp.status_code, 404);
    assert_eq!(resp.body["grpcStatus"], 5);
    assert_eq!(resp.body["grpcMessage"], "no such user");
}

#[test]
fn grpc_requires_service() {
    let handler = GrpcHandler::new(Arc::new(EchoGrpc::default()), ExecutorConfig::default());
    let mut req = grpc_request();
    if let ApiRequest::Grpc(g) = &mut req {
        g.service.clear();
    }
    let err = handler.validate(&req).unwrap_err();
    assert_eq!(err.to_string(), "invalid request: service is required");
}
