//! Othello/Reversi core: board model, legal-move generation, fixed-depth
//! minimax opponent and the session state machine a UI drives.
//!
//! - [`board`] - bitboard representation and flip computation
//! - [`state`] - immutable positions with automatic pass handling
//! - [`ai`] - minimax search
//! - [`game`] - session phases and triggers
//! - [`wasm`] - browser bindings

pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod state;
pub mod types;
pub mod wasm;

pub use ai::choose_move;
pub use board::Board;
pub use config::{Difficulty, SearchConfig, SessionConfig};
pub use error::{CoreError, CoreResult};
pub use game::{GameSession, MoveSelector, Phase, Trigger};
pub use state::GameState;
pub use types::{Choice, GameResult, GameSnapshot, Move, Outcome, Position, SearchResult, Side};
