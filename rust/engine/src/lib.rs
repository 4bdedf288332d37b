//! # tictac-engine: Tic-tac-toe Match Engine
//!
//! The in-memory core behind the tic-tac-toe API: it creates matches, validates and
//! applies moves, detects wins and draws, and decides which player identifiers each
//! caller may see. It knows nothing about HTTP.
//!
//! ## Core Modules
//!
//! - [`board`] - Cells, marks and win/draw judgement
//! - [`ids`] - Identifier generators (alphanumeric codes or UUIDs)
//! - [`player`] - Seats and per-player turn state
//! - [`game`] - The internal match record
//! - [`rules`] - Move validation
//! - [`store`] - The shared match store and its four operations
//! - [`view`] - Caller-specific projections of a match
//! - [`errors`] - Rejection reasons and store errors
//!
//! ## Quick Start
//!
//! ```rust
//! use tictac_engine::store::{MatchStore, StoreConfig};
//!
//! let store = MatchStore::new(StoreConfig::default());
//! let created = store.create().unwrap();
//! let o = created.players[0].id.clone().unwrap();
//!
//! let after = store.accept_move(&created.id, Some(4), Some(&o)).unwrap();
//! assert_eq!(after.board.cells()[4].as_str(), "O");
//! assert!(after.players[1].is_turn);
//! ```

pub mod board;
pub mod errors;
pub mod game;
pub mod ids;
pub mod player;
pub mod rules;
pub mod store;
pub mod view;

pub use board::{Board, Cell, IndexTrio, Judgement, Mark};
pub use errors::{MatchError, MoveRejection, MoveRejections};
pub use game::{Match, MatchId};
pub use ids::{AlphanumericIds, IdGenerator, UuidIds};
pub use player::{Player, Seat};
pub use store::{MatchStore, StoreConfig};
pub use view::{PublicMatch, PublicPlayer, Visibility};
