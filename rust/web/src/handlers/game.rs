use crate::errors::{IntoErrorResponse, RouteError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tictac_engine::errors::MatchError;
use tictac_engine::store::MatchStore;
use tictac_engine::view::PublicMatch;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Body of `POST /api/games/{id}/turn`.
///
/// Fields are kept as raw JSON so that a wrong type is reported as a rejected move
/// with the usual reasons instead of a malformed body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub cell_to_claim: serde_json::Value,
    #[serde(default)]
    pub player_id: serde_json::Value,
}

impl TurnRequest {
    pub fn new(cell_to_claim: i64, player_id: impl Into<String>) -> Self {
        Self {
            cell_to_claim: cell_to_claim.into(),
            player_id: serde_json::Value::String(player_id.into()),
        }
    }

    /// Parses a turn body. An empty body is a turn with nothing filled in, so the
    /// match lookup still decides between 404 and the usual rejection reasons.
    pub fn from_body(body: &[u8]) -> Result<Self, RouteError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|err| RouteError::MalformedBody(err.to_string()))
    }

    /// Integral cell number, if one was sent. `2.0` counts as `2`.
    pub fn cell_to_claim(&self) -> Option<i64> {
        self.cell_to_claim.as_i64().or_else(|| {
            self.cell_to_claim
                .as_f64()
                .filter(|value| value.fract() == 0.0)
                .map(|value| value as i64)
        })
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_str()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub game: PublicMatch,
    pub status: u16,
}

/// Creates a match.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/games`
///
/// # Response Format
/// - **Success (201 Created)**: `{ "game": { ... }, "status": 201 }` with both player
///   ids present. This is the only response that discloses both of them.
pub async fn create_game(store: Arc<MatchStore>) -> Response {
    match store.create() {
        Ok(game) => game_response(StatusCode::CREATED, game),
        Err(err) => match_error(err),
    }
}

/// Reads a match as seen by the optional `Player-ID` header.
///
/// # HTTP Method and Path
/// - **Method**: GET
/// - **Path**: `/api/games/{game_id}`
///
/// # Response Format
/// - **Success (200 OK)**: `{ "game": { ... }, "status": 200 }`; only the requesting
///   player's id is included
/// - **Error (404 Not Found)**: `game_not_found`
pub async fn get_game(
    store: Arc<MatchStore>,
    game_id: String,
    player_id: Option<String>,
) -> Response {
    match store.read(&game_id, player_id.as_deref()) {
        Ok(game) => game_response(StatusCode::OK, game),
        Err(err) => match_error(err),
    }
}

/// Claims a cell for a player.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/games/{game_id}/turn`
///
/// # Request Format
/// ```json
/// { "cellToClaim": 4, "playerId": "aB3dE" }
/// ```
///
/// # Response Format
/// - **Success (200 OK)**: the updated match as seen by `playerId`
/// - **Error (400 Bad Request)**: `invalid_move`, every reason joined with `"; "`
/// - **Error (404 Not Found)**: `game_not_found`
pub async fn submit_turn(
    store: Arc<MatchStore>,
    game_id: String,
    request: TurnRequest,
) -> Response {
    match store.accept_move(&game_id, request.cell_to_claim(), request.player_id()) {
        Ok(game) => game_response(StatusCode::OK, game),
        Err(err) => match_error(err),
    }
}

/// Deletes a match.
///
/// # HTTP Method and Path
/// - **Method**: DELETE
/// - **Path**: `/api/games/{game_id}`
///
/// # Response Format
/// - **Success (204 No Content)**: empty body
/// - **Error (404 Not Found)**: `game_not_found`
/// - **Error (405 Method Not Allowed)**: the server runs in production
pub async fn delete_game(store: Arc<MatchStore>, game_id: String) -> Response {
    match store.remove(&game_id) {
        Ok(true) => reply::with_status(reply::reply(), StatusCode::NO_CONTENT).into_response(),
        Ok(false) => match_error(MatchError::NotFound(game_id)),
        Err(err) => match_error(err),
    }
}

fn game_response(status: StatusCode, game: PublicMatch) -> Response {
    let body = GameResponse {
        game,
        status: status.as_u16(),
    };
    reply::with_status(reply::json(&body), status).into_response()
}

fn match_error(err: MatchError) -> Response {
    err.into_http_response()
}
