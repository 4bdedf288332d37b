use std::fmt;
use thiserror::Error;

/// A single reason a move was turned down.
///
/// The `Display` output is the exact text reported to callers.
#[derive(Debug, Copy, Clone, Error, PartialEq, Eq)]
pub enum MoveRejection {
    #[error("This game has already ended")]
    AlreadyEnded,
    #[error("Player not found")]
    PlayerNotFound,
    #[error("It is not this player's turn")]
    NotPlayersTurn,
    #[error("cellToClaim should be a number from 0 through 8")]
    InvalidCell,
    #[error("This cell has already been claimed")]
    CellAlreadyClaimed,
}

/// Every reason a move was rejected, in reporting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveRejections(Vec<MoveRejection>);

impl MoveRejections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reason: MoveRejection) {
        self.0.push(reason);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reasons(&self) -> &[MoveRejection] {
        &self.0
    }

    pub fn contains(&self, reason: MoveRejection) -> bool {
        self.0.contains(&reason)
    }

    /// Reasons joined with `"; "`.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MoveRejections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, reason) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{reason}")?;
        }
        Ok(())
    }
}

impl From<Vec<MoveRejection>> for MoveRejections {
    fn from(reasons: Vec<MoveRejection>) -> Self {
        Self(reasons)
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Game not found")]
    NotFound(String),
    #[error("{0}")]
    Rejected(MoveRejections),
    #[error("This method or route is not allowed in production")]
    Restricted,
    #[error("Match storage poisoned")]
    StoragePoisoned,
}
