use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::BOARD_SIZE;
use crate::config::Difficulty;
use crate::error::{CoreError, CoreResult};
use crate::game::Phase;

/// One of the two players. Black moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// Cell code used in serialized boards: 1=black, 2=white.
    pub fn code(self) -> u8 {
        match self {
            Side::Black => 1,
            Side::White => 2,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Side::Black => 'X',
            Side::White => 'O',
        }
    }
}

/// Content of a single square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Disc(Side),
}

impl Cell {
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Disc(side) => side.code(),
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> CoreResult<Self> {
        if row as usize >= BOARD_SIZE || col as usize >= BOARD_SIZE {
            return Err(CoreError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    /// Square index, `row * 8 + col`.
    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < BOARD_SIZE * BOARD_SIZE);
        Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        }
    }
}

/// Algebraic form: column letter then 1-based row, so (2, 3) is `d3`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

/// Accepts `d3` as well as `2 3` / `2,3` (row then column, 0-based).
impl FromStr for Position {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let bad = || CoreError::ParsePosition(s.trim().to_string());

        let mut chars = text.chars();
        if let (Some(file @ 'a'..='h'), Some(rank @ '1'..='8'), None) =
            (chars.next(), chars.next(), chars.next())
        {
            return Position::new(rank as u8 - b'1', file as u8 - b'a');
        }

        let parts: Vec<&str> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        match parts.as_slice() {
            [row, col] => {
                let row = row.parse::<u8>().map_err(|_| bad())?;
                let col = col.parse::<u8>().map_err(|_| bad())?;
                Position::new(row, col)
            }
            _ => Err(bad()),
        }
    }
}

/// A legal move: where the disc goes, who places it, and what it flips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub position: Position,
    pub side: Side,
    /// Captured discs in direction-scan order, nearest first. Never empty.
    pub flips: Vec<Position>,
}

/// What the engine decided to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Choice {
    Move(Move),
    Pass,
}

/// Engine output for one AI turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub choice: Choice,
    /// Backed-up disc differential from the mover's point of view.
    pub score: i32,
    /// Depth the returned choice was actually searched to.
    pub depth: u8,
    pub nodes: u64,
    /// `true` when the wall-clock cap expired and the choice fell back to depth 1.
    pub timed_out: bool,
}

impl SearchResult {
    pub fn chosen_move(&self) -> Option<&Move> {
        match &self.choice {
            Choice::Move(mv) => Some(mv),
            Choice::Pass => None,
        }
    }
}

/// Final (or provisional) result by disc count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    BlackWins,
    WhiteWins,
    Draw,
}

impl Outcome {
    pub fn from_counts(black: u8, white: u8) -> Self {
        if black > white {
            Outcome::BlackWins
        } else if white > black {
            Outcome::WhiteWins
        } else {
            Outcome::Draw
        }
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::BlackWins => Some(Side::Black),
            Outcome::WhiteWins => Some(Side::White),
            Outcome::Draw => None,
        }
    }
}

/// Session state handed to the UI for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// 64 cells, row-major: 0=empty, 1=black, 2=white.
    pub board: Vec<u8>,
    pub phase: Phase,
    pub difficulty: Option<Difficulty>,
    pub current_player: Side,
    pub human: Side,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - `Some(side)` when the last transition skipped `side`.
    /// - `None` after an ordinary move.
    pub passed: Option<Side>,
    pub last_move: Option<Position>,
    /// Discs flipped by `last_move`; empty at game start.
    pub flipped: Vec<Position>,
    /// Squares to highlight; only filled on the human's turn.
    pub legal_moves: Vec<Position>,
    pub status: String,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub outcome: Outcome,
    pub winner: Option<Side>,
    pub black_count: u8,
    pub white_count: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parses_algebraic_and_numeric_forms() {
        assert_eq!("d3".parse::<Position>(), Ok(Position { row: 2, col: 3 }));
        assert_eq!(" E6 ".parse::<Position>(), Ok(Position { row: 5, col: 4 }));
        assert_eq!("2 3".parse::<Position>(), Ok(Position { row: 2, col: 3 }));
        assert_eq!("4,5".parse::<Position>(), Ok(Position { row: 4, col: 5 }));
    }

    #[test]
    fn position_rejects_garbage_and_out_of_range() {
        assert!(matches!(
            "z9".parse::<Position>(),
            Err(CoreError::ParsePosition(_))
        ));
        assert_eq!(
            "8 0".parse::<Position>(),
            Err(CoreError::OutOfRange { row: 8, col: 0 })
        );
    }

    #[test]
    fn position_display_is_algebraic() {
        assert_eq!(Position { row: 2, col: 3 }.to_string(), "d3");
        assert_eq!(Position::from_index(63).to_string(), "h8");
    }

    #[test]
    fn outcome_follows_majority() {
        assert_eq!(Outcome::from_counts(33, 31), Outcome::BlackWins);
        assert_eq!(Outcome::from_counts(10, 54).winner(), Some(Side::White));
        assert_eq!(Outcome::from_counts(32, 32).winner(), None);
    }
}
