//! HTTP server: accept loop, routing and request handling.

use crate::rpc::{Incoming, McpProtocol, Reply, RpcError, RpcResponse};
use crate::runtime::{AccessGate, ConfigError, ServerConfig};
use crate::tool::ToolRegistry;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderValue, ALLOW, CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Liveness endpoint, served outside the base path and the access gate.
pub const HEALTH_PATH: &str = "/_health";

/// Fatal server failure.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

struct ServerState {
    config: ServerConfig,
    gate: AccessGate,
    protocol: McpProtocol,
}

/// The tool server.
///
/// Cheap to clone; every clone shares the same immutable state.
#[derive(Clone)]
pub struct HttpServer {
    state: Arc<ServerState>,
}

impl HttpServer {
    /// Create a server over a frozen registry.
    pub fn new(config: ServerConfig, registry: Arc<ToolRegistry>) -> Self {
        Self::with_protocol(config, McpProtocol::new(registry))
    }

    /// Create a server with a preconfigured protocol handler.
    pub fn with_protocol(config: ServerConfig, protocol: McpProtocol) -> Self {
        let gate = AccessGate::new(config.token.as_deref());
        Self {
            state: Arc::new(ServerState {
                config,
                gate,
                protocol,
            }),
        }
    }

    /// Configuration the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// The frozen tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        self.state.protocol.registry()
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.state.config.bind_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve connections from `listener` until `shutdown` completes.
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!(
            "Streamable HTTP on {} (base {})",
            local_addr, self.state.config.base_path
        );
        if self.state.gate.is_enabled() {
            info!("auth: Bearer token required");
        }

        tokio::pin!(shutdown);

        loop {
            let (stream, remote_addr) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                },
                () = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            };

            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move {
                        Ok::<_, Infallible>(
                            handle_request(req, &server.state, Some(remote_addr)).await,
                        )
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Error serving connection from {}: {:?}", remote_addr, err);
                }
            });
        }

        Ok(())
    }

    /// Handle one request in-process, without a socket.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        handle_request(req, &self.state, None).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Route -> gate -> method -> content type -> body -> protocol.
async fn handle_request<B>(
    req: Request<B>,
    state: &ServerState,
    remote_addr: Option<SocketAddr>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {:?} [{}]",
        method, path, remote_addr, request_id
    );

    if state.config.enable_health && path == HEALTH_PATH {
        return text_response(StatusCode::OK, "OK");
    }

    if !state.config.matches_base_path(&path) {
        return text_response(StatusCode::NOT_FOUND, "not found");
    }

    if let Err(reason) = state.gate.check(req.headers()) {
        warn!(
            "Rejected request from {:?}: {} [{}]",
            remote_addr, reason, request_id
        );
        let mut response = text_response(StatusCode::UNAUTHORIZED, "unauthorized");
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        return response;
    }

    if method != Method::POST {
        let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    if !is_json(req.headers()) {
        return text_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "content type must be application/json",
        );
    }

    let body = match Limited::new(req.into_body(), state.config.max_body_size)
        .collect()
        .await
    {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return text_response(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
        Err(e) => {
            warn!("Failed to read request body: {} [{}]", e, request_id);
            return text_response(StatusCode::BAD_REQUEST, "failed to read request body");
        }
    };

    let incoming = match Incoming::parse(&body) {
        Ok(incoming) => incoming,
        Err(e) => {
            let response =
                RpcResponse::failure(Value::Null, RpcError::parse_error(format!("parse error: {}", e)));
            return json_response(StatusCode::BAD_REQUEST, &response);
        }
    };

    match state.protocol.handle_incoming(incoming, &request_id).await {
        Reply::Single(response) => json_response(StatusCode::OK, &response),
        Reply::Batch(responses) => json_response(StatusCode::OK, &responses),
        Reply::Accepted => empty_response(StatusCode::ACCEPTED),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Full::new(Bytes::from(bytes)));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            error!("Failed to encode response: {}", e);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(is_json(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert!(is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }

    #[test]
    fn test_text_response() {
        let response = text_response(StatusCode::NOT_FOUND, "not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
        assert_eq!(generate_request_id().len(), 32);
    }
}
