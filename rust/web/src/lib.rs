pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;

pub use config::{IdScheme, ServerArgs};
pub use errors::{handle_rejection, ErrorResponse, ErrorSeverity, IntoErrorResponse, RouteError};
pub use handlers::{GameResponse, TurnRequest};
pub use logging::{
    init_logging, init_test_logging, with_captured_logs, LogEntry, TestLogSubscriber,
};
pub use middleware::{
    log_response, with_api_key, with_request_logging, ApiKeys, AuthError, RequestMetrics,
};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
