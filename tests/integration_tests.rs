//! Integration tests for the toolbelt HTTP server, driven in-process.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_test::assert_ok;
use toolbelt::prelude::*;
use toolbelt::rpc::ErrorCode;
use toolbelt::tool::CallError;

const TOKEN: &str = "s3cret";

/// Counts how often it runs.
struct CountingTool {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ToolHandler for CountingTool {
    async fn call(&self, _arguments: Value, _ctx: &CallContext) -> Result<Value, CallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"ok": true}))
    }
}

fn server(token: Option<&str>) -> (HttpServer, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = ToolRegistry::builder();
    assert_ok!(register_builtin(&mut builder));
    assert_ok!(builder.register(
        ToolDescriptor::new("count", "Counts calls"),
        Box::new(CountingTool {
            calls: calls.clone()
        }),
    ));

    let config = ServerConfig::new()
        .token(token.map(String::from))
        .max_body_size(64 * 1024);
    (HttpServer::new(config, Arc::new(builder.build())), calls)
}

fn post(path: &str, body: &Value, authorization: Option<&str>) -> Request<Full<Bytes>> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("Content-Type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    builder
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
}

async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: Response<Full<Bytes>>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Call a tool on an open server and return the JSON-RPC response.
async fn call_tool(name: &str, arguments: Value) -> Value {
    let (server, _) = server(None);
    let response = server
        .handle(post("/mcp", &tool_call(1, name, arguments), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_echo_over_http() {
    let reply = call_tool("echo", json!({"text": "hello", "uppercase": true})).await;
    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["structuredContent"], json!({"text": "HELLO"}));
    assert_eq!(reply["result"]["isError"], false);
    assert_eq!(reply["result"]["content"][0]["type"], "text");
}

#[tokio::test]
async fn test_reverse_round_trip_multibyte() {
    let once = call_tool("reverse", json!({"text": "Ahoj, světe! 日本"})).await;
    let reversed = once["result"]["structuredContent"]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(reversed, "本日 !etěvs ,johA");

    let twice = call_tool("reverse", json!({"text": reversed})).await;
    assert_eq!(
        twice["result"]["structuredContent"]["text"],
        "Ahoj, světe! 日本"
    );
}

#[tokio::test]
async fn test_hash_known_digests() {
    let md5 = call_tool("hash", json!({"text": "hello", "algorithm": "md5"})).await;
    assert_eq!(
        md5["result"]["structuredContent"],
        json!({"hash": "5d41402abc4b2a76b9719d911017c592", "algorithm": "md5"})
    );

    let sha = call_tool("hash", json!({"text": "hello"})).await;
    assert_eq!(
        sha["result"]["structuredContent"]["hash"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(sha["result"]["structuredContent"]["algorithm"], "sha256");
}

#[tokio::test]
async fn test_hash_unsupported_algorithm_is_client_error() {
    let reply = call_tool("hash", json!({"text": "hello", "algorithm": "sha512"})).await;
    assert!(reply.get("result").is_none());
    assert_eq!(reply["error"]["code"], ErrorCode::INVALID_PARAMS.0);
    assert_eq!(
        reply["error"]["message"],
        "invalid arguments for tool 'hash': unsupported algorithm: sha512 (use md5 or sha256)"
    );
    assert_eq!(reply["error"]["data"]["field"], "algorithm");
}

#[tokio::test]
async fn test_uuid_and_timestamp() {
    let first = call_tool("uuid", json!({})).await;
    let second = call_tool("uuid", Value::Null).await;
    let a = first["result"]["structuredContent"]["uuid"].as_str().unwrap();
    let b = second["result"]["structuredContent"]["uuid"].as_str().unwrap();
    assert_eq!(a.len(), 36);
    assert_ne!(a, b);

    let unix = call_tool("timestamp", json!({"format": "Unix"})).await;
    let ts = unix["result"]["structuredContent"]["timestamp"].as_str().unwrap();
    assert!(!ts.is_empty() && ts.chars().all(|c| c.is_ascii_digit()));

    let default = call_tool("timestamp", json!({})).await;
    assert_eq!(default["result"]["structuredContent"]["format"], "rfc3339");

    let invalid = call_tool("timestamp", json!({"format": "invalid"})).await;
    assert_eq!(invalid["error"]["code"], ErrorCode::INVALID_PARAMS.0);
    assert!(invalid["error"]["message"]
        .as_str()
        .unwrap()
        .ends_with("unsupported format: invalid (use RFC3339, Unix, or UnixMilli)"));
}

#[tokio::test]
async fn test_unknown_tool_is_not_found() {
    let reply = call_tool("nonexistent", json!({})).await;
    assert_eq!(reply["error"]["code"], ErrorCode::METHOD_NOT_FOUND.0);
}

#[tokio::test]
async fn test_missing_token_rejected_before_dispatch() {
    let (server, calls) = server(Some(TOKEN));
    let response = server
        .handle(post("/mcp", &tool_call(1, "count", json!({})), None))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("WWW-Authenticate").unwrap(), "Bearer");
    assert_eq!(body_bytes(response).await, "unauthorized");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_wrong_token_rejected_without_leaking_operation() {
    let (server, calls) = server(Some(TOKEN));
    let response = server
        .handle(post(
            "/mcp",
            &tool_call(1, "count", json!({})),
            Some("Bearer wrong"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_bytes(response).await;
    assert!(!String::from_utf8_lossy(&body).contains("count"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_valid_token_dispatches() {
    let (server, calls) = server(Some(TOKEN));
    let response = server
        .handle(post(
            "/mcp",
            &tool_call(1, "count", json!({})),
            Some("Bearer s3cret"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let reply = body_json(response).await;
    assert_eq!(reply["result"]["structuredContent"], json!({"ok": true}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_token_configured_allows_all() {
    let (server, calls) = server(None);
    let response = server
        .handle(post(
            "/mcp",
            &tool_call(1, "count", json!({})),
            Some("Bearer anything"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_health_bypasses_gate() {
    let (server, _) = server(Some(TOKEN));
    let request = Request::get("/_health").body(Full::new(Bytes::new())).unwrap();
    let response = server.handle(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, "OK");
}

#[tokio::test]
async fn test_routing() {
    let (server, _) = server(None);
    let ping = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});

    let response = server.handle(post("/elsewhere", &ping, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.handle(post("/mcpx", &ping, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.handle(post("/mcp/", &ping, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = server.handle(post("/mcp/messages", &ping, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_not_allowed() {
    let (server, _) = server(None);
    let request = Request::get("/mcp").body(Full::new(Bytes::new())).unwrap();
    let response = server.handle(request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get("Allow").unwrap(), "POST");
}

#[tokio::test]
async fn test_wrong_content_type() {
    let (server, _) = server(None);
    let request = Request::post("/mcp")
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from_static(b"{}")))
        .unwrap();
    let response = server.handle(request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_parse_error() {
    let (server, _) = server(None);
    let request = Request::post("/mcp")
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from_static(b"{not json")))
        .unwrap();
    let response = server.handle(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let reply = body_json(response).await;
    assert_eq!(reply["error"]["code"], ErrorCode::PARSE_ERROR.0);
    assert_eq!(reply["id"], Value::Null);
}

#[tokio::test]
async fn test_body_too_large() {
    let (server, _) = server(None);
    let big = json!({"jsonrpc": "2.0", "id": 1, "method": "ping", "params": {"pad": "x".repeat(70 * 1024)}});
    let response = server.handle(post("/mcp", &big, None)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_notification_is_accepted() {
    let (server, _) = server(None);
    let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let response = server.handle(post("/mcp", &notification, None)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_null_id_is_answered_not_accepted() {
    let (server, calls) = server(None);
    let request = json!({
        "jsonrpc": "2.0",
        "id": null,
        "method": "tools/call",
        "params": {"name": "count"}
    });
    let response = server.handle(post("/mcp", &request, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let reply = body_json(response).await;
    assert_eq!(reply["error"]["code"], ErrorCode::INVALID_REQUEST.0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batch_over_http() {
    let (server, _) = server(None);
    let batch = json!([
        {"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}},
        {"jsonrpc": "2.0", "id": 2, "method": "tools/list"},
    ]);
    let response = server.handle(post("/mcp", &batch, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let replies = body_json(response).await;
    let replies = replies.as_array().unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(replies[1]["result"]["tools"].as_array().unwrap().len(), 6);
}

#[derive(Deserialize, Schema)]
#[allow(dead_code)]
struct CustomInput {
    #[schema(description = "How many")]
    count: i64,
    ratio: Option<f64>,
    #[schema(one_of = "fast, slow")]
    mode: Option<String>,
    verbose: bool,
}

#[test]
fn test_derived_schema() {
    let schema = CustomInput::schema();
    let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["count", "ratio", "mode", "verbose"]);

    let count = schema.get("count").unwrap();
    assert_eq!(count.kind, FieldKind::Integer);
    assert!(count.required);
    assert_eq!(count.description.as_deref(), Some("How many"));

    let ratio = schema.get("ratio").unwrap();
    assert_eq!(ratio.kind, FieldKind::Number);
    assert!(!ratio.required);

    let mode = schema.get("mode").unwrap();
    assert_eq!(mode.one_of, ["fast", "slow"]);

    assert_eq!(schema.get("verbose").unwrap().kind, FieldKind::Boolean);

    assert!(schema
        .validate(&json!({"count": 1, "verbose": true, "mode": "SLOW"}))
        .is_ok());
    assert!(schema
        .validate(&json!({"count": 1, "verbose": true, "mode": "medium"}))
        .is_err());
}

#[derive(Deserialize, Schema)]
#[allow(dead_code)]
struct RenamedInput {
    #[serde(rename = "fileName")]
    file_name: String,
    r#type: Option<String>,
    #[serde(default)]
    #[schema(one_of = "low,high", error = "unsupported level")]
    level: Option<String>,
}

#[test]
fn test_derived_schema_uses_wire_names() {
    let schema = RenamedInput::schema();
    let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["fileName", "type", "level"]);

    assert!(schema
        .validate(&json!({"fileName": "a.txt", "type": "text"}))
        .is_ok());
    assert!(schema.validate(&json!({"file_name": "a.txt"})).is_err());

    let err = schema
        .validate(&json!({"fileName": "a.txt", "level": "max"}))
        .unwrap_err();
    assert_eq!(err.to_string(), "unsupported level: max (use low or high)");

    let decoded: RenamedInput =
        serde_json::from_value(json!({"fileName": "a.txt", "type": "text"})).unwrap();
    assert_eq!(decoded.file_name, "a.txt");
    assert_eq!(decoded.r#type.as_deref(), Some("text"));
}
