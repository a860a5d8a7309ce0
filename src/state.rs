use log::debug;

use crate::board::{self, Board};
use crate::error::{CoreError, CoreResult};
use crate::types::{Move, Outcome, Position, Side};

/// Immutable game position: board, side to move and the markers a UI needs.
///
/// Every constructor settles forced passes, so a non-terminal state always
/// has at least one legal move for [`GameState::side_to_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    side_to_move: Side,
    last_move: Option<Position>,
    last_pass: Option<Side>,
    terminal: bool,
}

impl GameState {
    /// Standard four-disc opening, Black to move.
    pub fn initial() -> Self {
        Self::from_board(Board::new(), Side::Black)
    }

    /// Wraps an arbitrary board. If `side` cannot move but its opponent can,
    /// the turn passes immediately.
    pub fn from_board(board: Board, side: Side) -> Self {
        Self::settle(board, side, None)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    /// Side skipped by the most recent automatic pass, if any.
    pub fn last_pass(&self) -> Option<Side> {
        self.last_pass
    }

    /// `true` when neither side has a legal move.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Returns `(black_count, white_count)`.
    pub fn score(&self) -> (u8, u8) {
        self.board.count()
    }

    /// Winner by disc count; `None` until the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.terminal {
            return None;
        }
        let (black, white) = self.score();
        Some(Outcome::from_counts(black, white))
    }

    /// Legal moves for the side to move, row-major.
    pub fn legal_moves(&self) -> Vec<Move> {
        board::squares(self.legal_mask())
            .map(|pos| self.describe(pos))
            .collect()
    }

    pub fn legal_positions(&self) -> Vec<Position> {
        board::positions(self.legal_mask())
    }

    /// The legal move at `position`, if there is one.
    pub fn move_at(&self, position: Position) -> Option<Move> {
        let pos = position.index();
        ((self.legal_mask() & board::bit(pos)) != 0).then(|| self.describe(pos))
    }

    /// Applies `mv`, which must be one of [`GameState::legal_moves`].
    pub fn apply_move(&self, mv: &Move) -> CoreResult<GameState> {
        let Position { row, col } = mv.position;
        match self.move_at(mv.position) {
            Some(legal) if legal == *mv => {}
            _ => return Err(CoreError::InvalidMove { row, col }),
        }

        let next = self.advance(mv.position.index());
        debug!(
            "{:?} plays {} flipping {} disc(s)",
            mv.side,
            mv.position,
            mv.flips.len()
        );
        if let Some(skipped) = next.last_pass {
            debug!("{skipped:?} has no legal move and passes");
        }
        Ok(next)
    }

    /// Looks up the legal move at `position` and applies it.
    pub fn play(&self, position: Position) -> CoreResult<(Move, GameState)> {
        let mv = self.move_at(position).ok_or(CoreError::InvalidMove {
            row: position.row,
            col: position.col,
        })?;
        let next = self.apply_move(&mv)?;
        Ok((mv, next))
    }

    /// Child states in legal-move order, paired with the square played.
    /// Skips validation; used by the search.
    pub(crate) fn successors(&self) -> impl Iterator<Item = (usize, GameState)> + '_ {
        board::squares(self.legal_mask()).map(move |pos| (pos, self.advance(pos)))
    }

    fn legal_mask(&self) -> u64 {
        if self.terminal {
            0
        } else {
            self.board.legal_moves(self.side_to_move)
        }
    }

    fn describe(&self, pos: usize) -> Move {
        Move {
            position: Position::from_index(pos),
            side: self.side_to_move,
            flips: self
                .board
                .flip_squares(pos, self.side_to_move)
                .into_iter()
                .map(Position::from_index)
                .collect(),
        }
    }

    fn advance(&self, pos: usize) -> GameState {
        let mut next = self.board;
        let flips = next.place(pos, self.side_to_move);
        debug_assert_ne!(flips, 0, "advance() called with an illegal square");
        Self::settle(
            next,
            self.side_to_move.opponent(),
            Some(Position::from_index(pos)),
        )
    }

    fn settle(board: Board, side: Side, last_move: Option<Position>) -> Self {
        let (side_to_move, last_pass, terminal) = if board.has_legal_move(side) {
            (side, None, false)
        } else if board.has_legal_move(side.opponent()) {
            (side.opponent(), Some(side), false)
        } else {
            (side, None, true)
        };

        Self {
            board,
            side_to_move,
            last_move,
            last_pass,
            terminal,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position { row, col }
    }

    fn state(text: &str, side: Side) -> GameState {
        GameState::from_board(text.parse().unwrap(), side)
    }

    #[test]
    fn initial_state_offers_the_four_standard_moves() {
        let state = GameState::initial();
        let moves = state.legal_moves();

        assert_eq!(state.side_to_move(), Side::Black);
        assert!(!state.is_terminal());
        assert_eq!(state.score(), (2, 2));
        assert_eq!(
            moves.iter().map(|mv| mv.position).collect::<Vec<_>>(),
            vec![pos(2, 3), pos(3, 2), pos(4, 5), pos(5, 4)]
        );
        assert!(moves.iter().all(|mv| mv.flips.len() == 1));
        assert!(moves.iter().all(|mv| mv.side == Side::Black));
    }

    #[test]
    fn applying_d3_flips_d4_and_hands_the_turn_to_white() {
        let state = GameState::initial();
        let mv = state.move_at(pos(2, 3)).unwrap();

        let next = state.apply_move(&mv).unwrap();

        assert_eq!(mv.flips, vec![pos(3, 3)]);
        assert_eq!(next.board().to_array()[pos(3, 3).index()], 1);
        assert_eq!(next.side_to_move(), Side::White);
        assert_eq!(next.last_move(), Some(pos(2, 3)));
        assert_eq!(next.last_pass(), None);
        assert_eq!(next.score(), (4, 1));
        // the original is untouched
        assert_eq!(state.score(), (2, 2));
    }

    #[test]
    fn apply_move_rejects_moves_outside_the_legal_set() {
        let state = GameState::initial();
        let mut forged = state.move_at(pos(2, 3)).unwrap();
        forged.flips.push(pos(4, 4));

        assert_eq!(
            state.apply_move(&forged),
            Err(CoreError::InvalidMove { row: 2, col: 3 })
        );

        let wrong_side = Move {
            side: Side::White,
            ..state.move_at(pos(2, 3)).unwrap()
        };
        assert!(state.apply_move(&wrong_side).is_err());

        assert_eq!(
            state.play(pos(0, 0)).unwrap_err(),
            CoreError::InvalidMove { row: 0, col: 0 }
        );
    }

    #[test]
    fn stale_move_from_an_earlier_ply_is_rejected() {
        let start = GameState::initial();
        let mv = start.move_at(pos(2, 3)).unwrap();
        let next = start.apply_move(&mv).unwrap();

        assert!(next.apply_move(&mv).is_err());
    }

    #[test]
    fn white_without_moves_passes_back_to_black() {
        // After black takes h1 white has nothing left to flank.
        let before = state(
            "
            XXXXXXO.
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXO.
            XXXXXXXX
            XXXXXXXX
            ",
            Side::Black,
        );

        let (_, after) = before.play(pos(0, 7)).unwrap();

        assert_eq!(after.side_to_move(), Side::Black);
        assert_eq!(after.last_pass(), Some(Side::White));
        assert!(!after.is_terminal());
        assert!(!after.legal_moves().is_empty());
    }

    #[test]
    fn from_board_passes_for_a_moveless_side() {
        let state = state(
            "
            XO......
            ........
            ........
            ........
            ........
            ........
            ........
            ........
            ",
            Side::White,
        );

        assert_eq!(state.side_to_move(), Side::Black);
        assert_eq!(state.last_pass(), Some(Side::White));
        assert_eq!(state.legal_positions(), vec![pos(0, 2)]);
    }

    #[test]
    fn isolated_discs_leave_both_sides_moveless() {
        let state = state(
            "
            .O......
            ........
            ........
            ........
            ........
            ........
            ........
            .......X
            ",
            Side::White,
        );

        // neither side can flank anything
        assert!(state.is_terminal());
        assert!(state.legal_moves().is_empty());
        assert_eq!(state.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn both_sides_moveless_on_partial_board_is_terminal() {
        let state = state(
            "
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXX..
            ",
            Side::Black,
        );

        assert!(state.is_terminal());
        assert_eq!(state.score(), (62, 0));
        assert_eq!(state.outcome(), Some(Outcome::BlackWins));
    }

    #[test]
    fn filling_the_last_square_ends_the_game() {
        let black = 1u64 << 1;
        let white = u64::MAX ^ 1 ^ black;
        let state = GameState::from_board(Board::from_bitboards(black, white), Side::White);

        assert_eq!(state.side_to_move(), Side::White);
        let (mv, end) = state.play(pos(0, 0)).unwrap();

        assert_eq!(mv.flips, vec![pos(0, 1)]);
        assert!(end.is_terminal());
        assert_eq!(end.score(), (0, 64));
        assert_eq!(end.outcome(), Some(Outcome::WhiteWins));
    }

    #[test]
    fn outcome_is_none_while_playing() {
        assert_eq!(GameState::initial().outcome(), None);
    }
}
