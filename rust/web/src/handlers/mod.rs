pub mod game;
pub mod health;

pub use game::{create_game, delete_game, get_game, submit_turn, GameResponse, TurnRequest};
pub use health::health;
