//! Caller-facing projections of a [`Match`].
//!
//! Player identifiers are secrets: a player id is what authorizes moves. The
//! projection here is the only place that decides which of them leave the store.

use crate::board::Board;
use crate::game::{Match, MatchId};
use crate::player::Player;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub is_turn: bool,
    pub is_winner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMatch {
    pub id: MatchId,
    pub board: Board,
    pub has_ended: bool,
    pub next_id: Option<MatchId>,
    pub players: Vec<PublicPlayer>,
}

/// Who is looking at the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility<'a> {
    /// Both identifiers disclosed. Only used when the match is handed to its creator.
    Full,
    /// Identifiers disclosed only for the player whose id matches, if any.
    Requester(Option<&'a str>),
}

impl PublicPlayer {
    fn from_player(player: &Player, disclose: bool) -> Self {
        Self {
            id: disclose.then(|| player.id().to_string()),
            name: player.name().to_string(),
            is_turn: player.is_turn(),
            is_winner: player.is_winner(),
            next_id: player
                .next_id()
                .filter(|_| disclose)
                .map(str::to_string),
        }
    }
}

/// Projects a match for a caller.
///
/// # Examples
///
/// ```
/// use tictac_engine::game::Match;
/// use tictac_engine::view::{project, Visibility};
///
/// let game = Match::new("g".into(), "o-id".into(), "x-id".into());
///
/// let anonymous = project(&game, Visibility::Requester(None));
/// assert!(anonymous.players.iter().all(|p| p.id.is_none()));
///
/// let as_o = project(&game, Visibility::Requester(Some("o-id")));
/// assert_eq!(as_o.players[0].id.as_deref(), Some("o-id"));
/// assert_eq!(as_o.players[1].id, None);
/// ```
pub fn project(game: &Match, visibility: Visibility<'_>) -> PublicMatch {
    let disclose = |player: &Player| match visibility {
        Visibility::Full => true,
        Visibility::Requester(Some(requester)) => player.id() == requester,
        Visibility::Requester(None) => false,
    };

    PublicMatch {
        id: game.id().to_string(),
        board: game.board().clone(),
        has_ended: game.has_ended(),
        next_id: game.next_id().map(str::to_string),
        players: game
            .players()
            .iter()
            .map(|player| PublicPlayer::from_player(player, disclose(player)))
            .collect(),
    }
}
