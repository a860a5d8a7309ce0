//! Move selection for the computer player.

pub mod search;

pub use search::{Searcher, choose_move, evaluate};
