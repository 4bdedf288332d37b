use crate::board::CELL_COUNT;
use crate::errors::{MoveRejection, MoveRejections};
use crate::game::Match;
use crate::player::Seat;

/// A move that passed validation and may be applied without further checks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ValidatedMove {
    pub seat: Seat,
    pub cell: usize,
}

/// Converts a requested cell into a board index, if it is one.
pub fn cell_index(cell_to_claim: Option<i64>) -> Option<usize> {
    cell_to_claim
        .and_then(|cell| usize::try_from(cell).ok())
        .filter(|&cell| cell < CELL_COUNT)
}

/// Validates a move against the current state of a match.
///
/// Checks are not short-circuited: every failing check contributes a reason, grouped
/// as end state, then player resolution, then cell validity.
///
/// # Arguments
///
/// * `game` - Match the move targets
/// * `cell_to_claim` - Requested cell; `None` when the caller did not send an integer
/// * `player_id` - Acting player; `None` when the caller did not send one
///
/// # Errors
///
/// Returns every [`MoveRejection`] that applies, in reporting order.
///
/// # Examples
///
/// ```
/// use tictac_engine::game::Match;
/// use tictac_engine::rules::validate_move;
///
/// let game = Match::new("g".into(), "o".into(), "x".into());
///
/// assert!(validate_move(&game, Some(0), Some("o")).is_ok());
///
/// let rejected = validate_move(&game, Some(42), Some("nobody")).unwrap_err();
/// assert_eq!(
///     rejected.to_string(),
///     "Player not found; cellToClaim should be a number from 0 through 8"
/// );
/// ```
pub fn validate_move(
    game: &Match,
    cell_to_claim: Option<i64>,
    player_id: Option<&str>,
) -> Result<ValidatedMove, MoveRejections> {
    let mut rejections = MoveRejections::new();

    if game.judge().has_ended {
        rejections.push(MoveRejection::AlreadyEnded);
    }

    let seat = player_id.and_then(|id| game.seat_of(id));
    match seat {
        None => rejections.push(MoveRejection::PlayerNotFound),
        Some(seat) if !game.player(seat).is_turn() => {
            rejections.push(MoveRejection::NotPlayersTurn)
        }
        Some(_) => {}
    }

    let cell = cell_index(cell_to_claim);
    match cell {
        None => rejections.push(MoveRejection::InvalidCell),
        Some(index) if game.board().is_occupied(index) => {
            rejections.push(MoveRejection::CellAlreadyClaimed)
        }
        Some(_) => {}
    }

    match (seat, cell) {
        (Some(seat), Some(cell)) if rejections.is_empty() => Ok(ValidatedMove { seat, cell }),
        _ => Err(rejections),
    }
}
