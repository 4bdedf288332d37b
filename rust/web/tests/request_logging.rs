use serde_json::json;
use tictac_web::{init_test_logging, AppContext, WebServer};
use tracing::Level;
use warp::http::StatusCode;

#[tokio::test]
async fn rejected_turn_is_logged_with_request_and_match_fields() {
    let subscriber = init_test_logging();
    let ctx = AppContext::new_for_tests();
    let game = ctx.store().create().expect("create");

    let response = warp::test::request()
        .method("POST")
        .path(&format!("/api/games/{}/turn", game.id))
        .header("API-Key", "test-key")
        .header("X-Request-ID", "req-42")
        .json(&json!({ "cellToClaim": 42, "playerId": "nobody" }))
        .reply(&WebServer::routes(&ctx))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let entries = subscriber.entries();
    let rejected = entries
        .iter()
        .find(|entry| entry.message.contains("move rejected"))
        .expect("move rejection logged");
    assert_eq!(rejected.level, Level::WARN);
    assert_eq!(rejected.field("match_id"), Some(game.id.as_str()));
    assert!(rejected
        .field("reasons")
        .is_some_and(|reasons| reasons.contains("Player not found")));

    let auth = entries
        .iter()
        .find(|entry| entry.message.contains("auth passed"))
        .expect("auth logged");
    assert_eq!(auth.field("key_tail"), Some("-key"));
    assert!(auth
        .field("request_id")
        .is_some_and(|id| id.contains("req-42")));

    assert!(entries
        .iter()
        .any(|entry| entry.level == Level::WARN && entry.message.contains("client error")));

    subscriber.clear();
    assert!(subscriber.entries().is_empty());
}
