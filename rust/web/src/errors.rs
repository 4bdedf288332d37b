/// Error handling for tictac_web
///
/// This module provides:
/// - The JSON error body shared by every endpoint
/// - HTTP status mappings for engine and transport errors
/// - The rejection handler that turns warp rejections into error bodies
use crate::middleware::AuthError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;
use tictac_engine::errors::MatchError;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Rejection, Reply};

/// Standard error response format for all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Always `null`; error bodies keep the `game` key of successful responses
    #[serde(default)]
    pub game: Option<serde_json::Value>,
    /// Machine-readable error code (e.g., "game_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// HTTP status, repeated in the body
    pub status: u16,
    /// Optional additional details (structured data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            game: None,
            error: error.into(),
            message: message.into(),
            status: status.as_u16(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(error, message, status)
        }
    }

    /// Convert to HTTP response with specified status code
    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Client errors (4xx) - expected, normal operation
    Client,
    /// Server errors (5xx) - unexpected, needs investigation
    Server,
    /// Critical errors - system integrity at risk
    Critical,
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait IntoErrorResponse {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;

    fn error_message(&self) -> String;

    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        let status = self.status_code();
        match self.error_details() {
            Some(details) => ErrorResponse::with_details(
                self.error_code(),
                self.error_message(),
                status,
                details,
            ),
            None => ErrorResponse::new(self.error_code(), self.error_message(), status),
        }
    }

    /// Convert to HTTP response with logging
    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let error_response = self.to_error_response();

        match self.severity() {
            ErrorSeverity::Client => tracing::debug!(
                status = status.as_u16(),
                error = %error_response.error,
                message = %error_response.message,
                "client error"
            ),
            ErrorSeverity::Server => tracing::error!(
                status = status.as_u16(),
                error = %error_response.error,
                message = %error_response.message,
                "server error"
            ),
            ErrorSeverity::Critical => tracing::error!(
                status = status.as_u16(),
                error = %error_response.error,
                message = %error_response.message,
                critical = true,
                "critical error"
            ),
        }

        error_response.into_response(status)
    }
}

impl IntoErrorResponse for MatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::Rejected(_) => StatusCode::BAD_REQUEST,
            MatchError::Restricted => StatusCode::METHOD_NOT_ALLOWED,
            MatchError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            MatchError::NotFound(_) => "game_not_found",
            MatchError::Rejected(_) => "invalid_move",
            MatchError::Restricted => "method_not_allowed",
            MatchError::StoragePoisoned => "match_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            MatchError::NotFound(id) => Some(serde_json::json!({ "game_id": id })),
            MatchError::Rejected(reasons) => Some(serde_json::json!({
                "reasons": reasons
                    .reasons()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })),
            _ => None,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            MatchError::StoragePoisoned => ErrorSeverity::Critical,
            _ => ErrorSeverity::Client,
        }
    }
}

/// Failures raised by warp itself before a handler runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Couldn't find this route")]
    NotFound,
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Unhandled rejection: {0}")]
    Unhandled(String),
}

impl warp::reject::Reject for RouteError {}

impl IntoErrorResponse for RouteError {
    fn status_code(&self) -> StatusCode {
        match self {
            RouteError::NotFound => StatusCode::NOT_FOUND,
            RouteError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            RouteError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RouteError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RouteError::NotFound => "route_not_found",
            RouteError::MalformedBody(_) => "malformed_body",
            RouteError::PayloadTooLarge => "payload_too_large",
            RouteError::Unhandled(_) => "internal_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

/// Turns every rejection into a JSON error body.
///
/// Method mismatches are reported as missing routes: a path only exists for the
/// methods it is served with.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let response = if let Some(auth) = err.find::<AuthError>() {
        auth.clone().into_http_response()
    } else if err.is_not_found() || err.find::<warp::reject::MethodNotAllowed>().is_some() {
        tracing::warn!("route not found");
        RouteError::NotFound.into_http_response()
    } else if let Some(route) = err.find::<RouteError>() {
        route.clone().into_http_response()
    } else {
        RouteError::Unhandled(format!("{err:?}")).into_http_response()
    };

    Ok(response)
}
