use crate::board::Mark;

/// Seat at the table. The first seat plays O and always moves first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    pub fn mark(self) -> Mark {
        match self {
            Seat::First => Mark::O,
            Seat::Second => Mark::X,
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            Seat::First => "Player O",
            Seat::Second => "Player X",
        }
    }
}

/// One of the two participants of a match.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Player {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) is_turn: bool,
    /// `None` until this player wins; never set on a draw.
    pub(crate) is_winner: Option<bool>,
    /// Player id in the follow-up match, when chaining is enabled.
    pub(crate) next_id: Option<String>,
}

impl Player {
    pub fn new(id: String, seat: Seat) -> Self {
        Self {
            id,
            name: seat.default_name().to_string(),
            is_turn: seat == Seat::First,
            is_winner: None,
            next_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_turn(&self) -> bool {
        self.is_turn
    }

    pub fn is_winner(&self) -> Option<bool> {
        self.is_winner
    }

    pub fn next_id(&self) -> Option<&str> {
        self.next_id.as_deref()
    }
}
