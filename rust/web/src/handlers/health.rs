use serde::Serialize;
use warp::reply::Json;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Liveness check; served without an API key.
pub fn health() -> Json {
    warp::reply::json(&HealthBody { status: "ok" })
}
