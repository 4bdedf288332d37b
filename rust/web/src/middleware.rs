use crate::errors::{ErrorSeverity, IntoErrorResponse};
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use warp::http::{HeaderMap, Method, StatusCode};
use warp::path::FullPath;
use warp::reject::Rejection;
use warp::reply::{Reply, Response};
use warp::Filter;

pub const API_KEY_HEADER: &str = "api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Pre-shared keys accepted on `/api` routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    /// Blank entries are ignored.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .map(|key: String| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("API key missing")]
    Missing,
    #[error("Invalid API key")]
    Invalid,
}

impl warp::reject::Reject for AuthError {}

impl IntoErrorResponse for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Missing => StatusCode::UNAUTHORIZED,
            AuthError::Invalid => StatusCode::FORBIDDEN,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AuthError::Missing => "api_key_missing",
            AuthError::Invalid => "api_key_invalid",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Client
    }
}

/// Rejects requests without a known `API-Key` header.
pub fn with_api_key(
    keys: Arc<ApiKeys>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and(warp::any().map(move || Arc::clone(&keys)))
        .and_then(|headers: HeaderMap, keys: Arc<ApiKeys>| async move {
            let request_id = header_str(&headers, REQUEST_ID_HEADER);
            let key = match header_str(&headers, API_KEY_HEADER) {
                Some(key) => key,
                None => {
                    tracing::warn!(request_id = ?request_id, "api key missing");
                    return Err(warp::reject::custom(AuthError::Missing));
                }
            };

            if !keys.contains(key) {
                tracing::warn!(
                    request_id = ?request_id,
                    key_tail = %key_tail(key),
                    "invalid api key"
                );
                return Err(warp::reject::custom(AuthError::Invalid));
            }

            tracing::info!(
                request_id = ?request_id,
                key_tail = %key_tail(key),
                "auth passed"
            );
            Ok(())
        })
        .untuple_one()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Last four characters of a key, enough to tell keys apart in logs.
fn key_tail(key: &str) -> String {
    let skip = key.chars().count().saturating_sub(4);
    key.chars().skip(skip).collect()
}

/// Middleware for logging HTTP requests and responses
pub fn with_request_logging<F, T>(
    filter: F,
) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone
where
    F: Filter<Extract = (T,), Error = Infallible> + Clone + Send + Sync + 'static,
    T: Reply,
{
    warp::any()
        .and(warp::path::full())
        .and(warp::method())
        .and(warp::header::headers_cloned())
        .map(|path: FullPath, method: Method, headers: HeaderMap| {
            let request_id = header_str(&headers, REQUEST_ID_HEADER).map(str::to_string);
            tracing::info!(
                path = %path.as_str(),
                method = %method,
                request_id = ?request_id,
                "incoming request"
            );
            RequestStart {
                path: path.as_str().to_string(),
                method: method.to_string(),
                started: Instant::now(),
            }
        })
        .and(filter)
        .map(|start: RequestStart, reply: T| {
            let response = reply.into_response();
            let duration_ms = start.started.elapsed().as_millis();
            log_response(response.status(), &start.path, &start.method, duration_ms);
            RequestMetrics::new(
                start.path,
                start.method,
                response.status().as_u16(),
                duration_ms,
            )
            .log();
            response
        })
}

struct RequestStart {
    path: String,
    method: String,
    started: Instant,
}

/// Log response with status code
pub fn log_response(status: StatusCode, path: &str, method: &str, duration_ms: u128) {
    if status.is_client_error() {
        tracing::warn!(
            status = %status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "client error"
        );
    } else if status.is_server_error() {
        tracing::error!(
            status = %status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "server error"
        );
    } else {
        tracing::info!(
            status = %status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "response sent"
        );
    }
}

/// Performance metrics collection
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub path: String,
    pub method: String,
    pub status: u16,
    pub duration_ms: u128,
}

impl RequestMetrics {
    pub fn new(path: String, method: String, status: u16, duration_ms: u128) -> Self {
        Self {
            path,
            method,
            status,
            duration_ms,
        }
    }

    pub fn log(&self) {
        tracing::debug!(
            path = %self.path,
            method = %self.method,
            status = self.status,
            duration_ms = self.duration_ms,
            "request metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TestLogSubscriber;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn guarded_route() -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
        let keys = Arc::new(ApiKeys::new(["secret-1234"]));
        with_api_key(keys)
            .and(warp::path!("test"))
            .map(|| warp::reply::json(&"success").into_response())
            .recover(crate::errors::handle_rejection)
            .unify()
    }

    #[test]
    fn api_keys_ignore_blank_entries() {
        let keys = ApiKeys::new(["a", " ", "", "b "]);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("a"));
        assert!(keys.contains("b"));
    }

    #[test]
    fn key_tail_keeps_last_four() {
        assert_eq!(key_tail("abcdefgh"), "efgh");
        assert_eq!(key_tail("ab"), "ab");
    }

    #[tokio::test]
    async fn missing_key_is_unauthorized() {
        let response = warp::test::request()
            .path("/test")
            .reply(&guarded_route())
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = serde_json::from_slice(response.body()).expect("json");
        assert_eq!(body["message"], "API key missing");
    }

    #[tokio::test]
    async fn unknown_key_is_forbidden() {
        let response = warp::test::request()
            .path("/test")
            .header("API-Key", "nope")
            .reply(&guarded_route())
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = serde_json::from_slice(response.body()).expect("json");
        assert_eq!(body["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn known_key_passes() {
        let response = warp::test::request()
            .path("/test")
            .header("API-Key", "secret-1234")
            .reply(&guarded_route())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_logging_middleware() {
        let subscriber = TestLogSubscriber::new();
        let layer = subscriber.clone().into_layer::<Registry>();
        let registry = Registry::default().with(layer);

        let _guard = tracing::subscriber::set_default(registry);

        let route = warp::path!("test")
            .and(warp::get())
            .map(|| warp::reply::json(&"success").into_response())
            .recover(crate::errors::handle_rejection)
            .unify();

        let logged_route = with_request_logging(route);

        let response = warp::test::request()
            .method("GET")
            .path("/test")
            .header("X-Request-ID", "req-1")
            .reply(&logged_route)
            .await;

        assert_eq!(response.status(), StatusCode::OK);

        let entries = subscriber.entries();
        assert!(entries
            .iter()
            .any(|e| e.level == Level::INFO && e.message.contains("incoming request")));
        assert!(entries
            .iter()
            .any(|e| e.level == Level::INFO && e.message.contains("response sent")));
    }

    #[test]
    fn test_log_response_client_error() {
        let subscriber = TestLogSubscriber::new();
        let layer = subscriber.clone().into_layer::<Registry>();
        let registry = Registry::default().with(layer);

        tracing::subscriber::with_default(registry, || {
            log_response(StatusCode::NOT_FOUND, "/api/games/missing", "GET", 50);
        });

        let entries = subscriber.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::WARN);
        assert!(entries[0].message.contains("client error"));
        assert!(entries[0]
            .fields
            .iter()
            .any(|(k, v)| k == "status" && v.contains("404")));
    }

    #[test]
    fn test_request_metrics_logging() {
        let subscriber = TestLogSubscriber::new();
        let layer = subscriber.clone().into_layer::<Registry>();
        let registry = Registry::default().with(layer);

        tracing::subscriber::with_default(registry, || {
            let metrics =
                RequestMetrics::new("/api/games".to_string(), "POST".to_string(), 201, 75);
            metrics.log();
        });

        let entries = subscriber.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Level::DEBUG);
        assert!(entries[0].message.contains("request metrics"));
        assert!(entries[0]
            .fields
            .iter()
            .any(|(k, v)| k == "status" && v.contains("201")));
    }
}
