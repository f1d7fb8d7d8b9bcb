//! Development relay in front of the local flex service.
//!
//! Incoming requests are rewritten to the shape the flex runtime expects
//! and forwarded with the platform headers attached:
//!
//! | Incoming                      | Forwarded as                         |
//! |-------------------------------|--------------------------------------|
//! | `GET /_flexFunctions/*`       | `POST`, body `{"query": {...}}`      |
//! | `POST /_flexFunctions/*`      | `POST`, body unchanged               |
//! | `GET /_auth/*`                | `POST`, body from the `body` param   |
//! | `GET /:so`, `/:so/_count`, `/:so/:id` | `GET`, no body               |
//!
//! Upstream status, headers and body are passed back unchanged.

use crate::dev::headers::{is_connection_header, FlexHeaders};
use crate::error::{CliError, Result};
use axum::{
    body::{Body, Bytes},
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

/// Shared, read-only relay state.
#[derive(Debug)]
pub struct ProxyState {
    client: reqwest::Client,
    flex_url: String,
    headers: FlexHeaders,
}

impl ProxyState {
    pub fn new(client: reqwest::Client, flex_url: impl Into<String>, headers: FlexHeaders) -> Self {
        let flex_url = flex_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            flex_url,
            headers,
        }
    }

    pub fn flex_url(&self) -> &str {
        &self.flex_url
    }
}

pub type SharedProxyState = Arc<ProxyState>;

/// HTTP client for relaying. Redirects are returned to the caller, never followed.
///
/// # Errors
///
/// Returns [`CliError::Server`] if the TLS backend cannot be initialized.
pub fn relay_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| CliError::Server(format!("Failed to build HTTP client: {}", e)))
}

/// Builds the relay router.
pub fn router(state: SharedProxyState) -> Router {
    Router::new()
        .route(
            "/_flexFunctions/{*handler}",
            get(function_from_query).post(function_from_body),
        )
        .route("/_auth/{*handler}", get(auth_from_query))
        .route("/{service_object}", get(data_request))
        .route("/{service_object}/_count", get(data_request))
        .route("/{service_object}/{id}", get(data_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// The dev proxy listener.
pub struct ProxyServer {
    addr: SocketAddr,
    state: SharedProxyState,
}

impl ProxyServer {
    pub fn new(addr: SocketAddr, state: SharedProxyState) -> Self {
        Self { addr, state }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Binds and serves until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Server`] if the address cannot be bound.
    pub async fn start(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", self.addr, e)))?;

        crate::ui::success(&format!(
            "Development server relaying {} at {}",
            self.state.flex_url(),
            self.server_url()
        ));

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

async fn function_from_query(
    State(state): State<SharedProxyState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let body = json!({ "query": query_object(params) });
    relay(&state, Method::POST, uri.path(), &headers, Some(body.to_string().into())).await
}

async fn function_from_body(
    State(state): State<SharedProxyState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = (!body.is_empty()).then_some(body);
    relay(&state, Method::POST, uri.path(), &headers, body).await
}

async fn auth_from_query(
    State(state): State<SharedProxyState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let body = params
        .into_iter()
        .rev()
        .find(|(key, _)| key == "body")
        .map(|(_, raw)| auth_body(&raw));
    relay(&state, Method::POST, uri.path(), &headers, body).await
}

async fn data_request(
    State(state): State<SharedProxyState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    relay(&state, Method::GET, target, &headers, None).await
}

/// Collapses query pairs into an object; repeated keys become arrays.
fn query_object(params: Vec<(String, String)>) -> Map<String, Value> {
    let mut object = Map::new();
    for (key, value) in params {
        match object.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                object.insert(key, Value::String(value));
            }
        }
    }
    object
}

/// The `body` query parameter is sent as JSON when it parses, as a JSON string otherwise.
fn auth_body(raw: &str) -> Bytes {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Bytes::from(value.to_string()),
        Err(_) => Bytes::from(Value::String(raw.to_string()).to_string()),
    }
}

async fn relay(
    state: &ProxyState,
    method: Method,
    target: &str,
    incoming: &HeaderMap,
    body: Option<Bytes>,
) -> Response {
    let url = format!("{}{}", state.flex_url, target);
    debug!(%method, %url, "relaying request");

    let mut request = state
        .client
        .request(method, &url)
        .headers(state.headers.merge_into(incoming));
    if let Some(body) = body {
        request = request.body(body);
    }

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(err) => {
            warn!(%url, error = %err, "local service unreachable");
            return bad_gateway(&url, &err);
        }
    };

    let status = upstream.status();
    let mut headers = HeaderMap::with_capacity(upstream.headers().len());
    for (name, value) in upstream.headers() {
        if !is_connection_header(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    match upstream.bytes().await {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(err) => {
            warn!(%url, error = %err, "failed to read local service response");
            bad_gateway(&url, &err)
        }
    }
}

fn bad_gateway(url: &str, err: &reqwest::Error) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        format!("Could not reach the local flex service at {url}: {err}"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_object_collects_repeats() {
        let object = query_object(vec![
            ("a".into(), "1".into()),
            ("b".into(), "2".into()),
            ("a".into(), "3".into()),
            ("a".into(), "4".into()),
        ]);
        assert_eq!(Value::Object(object), json!({"a": ["1", "3", "4"], "b": "2"}));
    }

    #[test]
    fn test_auth_body_json_or_string() {
        assert_eq!(auth_body(r#"{"username":"u"}"#), Bytes::from(r#"{"username":"u"}"#));
        assert_eq!(auth_body("plain"), Bytes::from(r#""plain""#));
    }

    #[test]
    fn test_state_trims_trailing_slash() {
        let headers =
            FlexHeaders::new(&crate::config::FlexEnvironment::default(), None).unwrap();
        let state = ProxyState::new(reqwest::Client::new(), "http://localhost:10001/", headers);
        assert_eq!(state.flex_url(), "http://localhost:10001");
    }
}
