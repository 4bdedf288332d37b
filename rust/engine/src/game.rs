use crate::board::{Board, Judgement};
use crate::player::{Player, Seat};
use crate::rules::ValidatedMove;

pub type MatchId = String;

/// Internal record of one match, identifiers included.
///
/// Only [`crate::store::MatchStore`] mutates it, and only through [`Match::apply`]
/// after the move has been validated.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Match {
    pub(crate) id: MatchId,
    pub(crate) board: Board,
    pub(crate) has_ended: bool,
    pub(crate) next_id: Option<MatchId>,
    pub(crate) players: [Player; 2],
}

impl Match {
    /// Fresh match: empty board, first seat to move.
    pub fn new(id: MatchId, first_player_id: String, second_player_id: String) -> Self {
        Self {
            id,
            board: Board::new(),
            has_ended: false,
            next_id: None,
            players: [
                Player::new(first_player_id, Seat::First),
                Player::new(second_player_id, Seat::Second),
            ],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn has_ended(&self) -> bool {
        self.has_ended
    }

    pub fn next_id(&self) -> Option<&str> {
        self.next_id.as_deref()
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        Seat::ALL
            .into_iter()
            .find(|seat| self.players[seat.index()].id == player_id)
    }

    /// Judges the current board, independent of the stored `has_ended` flag.
    pub fn judge(&self) -> Judgement {
        self.board.judge()
    }

    /// Applies a validated move: claims the cell, passes the turn and settles the
    /// outcome when the board is finished.
    pub(crate) fn apply(&mut self, validated: ValidatedMove) -> Judgement {
        let ValidatedMove { seat, cell } = validated;
        self.board.claim(cell, seat.mark());

        for player in self.players.iter_mut() {
            player.is_turn = !player.is_turn;
        }

        let judgement = self.board.judge();
        if judgement.has_ended {
            self.has_ended = true;
            if let Some(trio) = judgement.winning_trio {
                self.board.record_winning_trio(trio);
                self.players[seat.index()].is_winner = Some(true);
            }
        }
        judgement
    }

    /// Links this finished match to the one created to follow it.
    pub(crate) fn chain_to(&mut self, next: &Match) {
        self.next_id = Some(next.id.clone());
        for (player, next_player) in self.players.iter_mut().zip(next.players.iter()) {
            player.next_id = Some(next_player.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, Mark};

    fn fresh() -> Match {
        Match::new("game1".into(), "p-o".into(), "p-x".into())
    }

    #[test]
    fn first_seat_moves_first() {
        let game = fresh();
        assert!(game.player(Seat::First).is_turn());
        assert!(!game.player(Seat::Second).is_turn());
        assert_eq!(game.player(Seat::First).name(), "Player O");
        assert_eq!(game.player(Seat::Second).name(), "Player X");
        assert!(!game.has_ended());
    }

    #[test]
    fn seat_lookup_by_player_id() {
        let game = fresh();
        assert_eq!(game.seat_of("p-o"), Some(Seat::First));
        assert_eq!(game.seat_of("p-x"), Some(Seat::Second));
        assert_eq!(game.seat_of("nobody"), None);
    }

    #[test]
    fn apply_flips_turns_and_marks_cell() {
        let mut game = fresh();
        game.apply(ValidatedMove {
            seat: Seat::First,
            cell: 4,
        });
        assert_eq!(game.board().cell(4), Some(Cell::Claimed(Mark::O)));
        assert!(!game.player(Seat::First).is_turn());
        assert!(game.player(Seat::Second).is_turn());
    }

    #[test]
    fn chaining_links_match_and_players() {
        let mut game = fresh();
        let next = Match::new("game2".into(), "n-o".into(), "n-x".into());
        game.chain_to(&next);
        assert_eq!(game.next_id(), Some("game2"));
        assert_eq!(game.player(Seat::First).next_id(), Some("n-o"));
        assert_eq!(game.player(Seat::Second).next_id(), Some("n-x"));
    }
}
