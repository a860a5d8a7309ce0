use log::{info, warn};
use serde::Serialize;

use crate::ai::search::Searcher;
use crate::config::{Difficulty, SearchConfig, SessionConfig};
use crate::error::{CoreError, CoreResult};
use crate::state::GameState;
use crate::types::{Choice, GameResult, GameSnapshot, Move, Position, SearchResult, Side};

/// Screen the UI should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    DifficultySelect,
    PlayerTurn,
    AiTurn,
    GameOver,
}

/// Inputs that drive the session from one phase to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    DifficultyChosen(Difficulty),
    CellClicked(Position),
    AiMoveComputed(SearchResult),
    PlayAgain,
    ChangeDifficulty,
}

pub trait MoveSelector: Send + Sync {
    fn select_move(&self, state: &GameState, config: &SearchConfig) -> CoreResult<SearchResult>;
}

/// Fixed-depth minimax, the selector used in real games.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinimaxSelector;

impl MoveSelector for MinimaxSelector {
    fn select_move(&self, state: &GameState, config: &SearchConfig) -> CoreResult<SearchResult> {
        Searcher::from_config(config).search(state)
    }
}

/// The single live game owned by the UI.
pub struct GameSession {
    state: GameState,
    phase: Phase,
    difficulty: Option<Difficulty>,
    config: SessionConfig,
    history: Vec<Move>,
    status: String,
    selector: Box<dyn MoveSelector>,
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_selector(config, Box::new(MinimaxSelector))
    }

    pub fn with_selector(config: SessionConfig, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            state: GameState::initial(),
            phase: Phase::DifficultySelect,
            difficulty: None,
            config,
            history: Vec::new(),
            status: "Choose your challenge level".to_string(),
            selector,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn human(&self) -> Side {
        self.config.human
    }

    pub fn ai(&self) -> Side {
        self.config.human.opponent()
    }

    /// Moves played so far in the current game.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Squares to highlight. Empty unless the human is to move.
    pub fn legal_moves(&self) -> Vec<Position> {
        if self.phase == Phase::PlayerTurn {
            self.state.legal_positions()
        } else {
            Vec::new()
        }
    }

    /// Feeds one trigger into the state machine. On error nothing changes.
    pub fn handle(&mut self, trigger: Trigger) -> CoreResult<Phase> {
        let result = match trigger {
            Trigger::DifficultyChosen(level) => self.choose_difficulty(level),
            Trigger::CellClicked(position) => self.click(position),
            Trigger::AiMoveComputed(result) => self.apply_ai_result(&result),
            Trigger::PlayAgain => self.play_again(),
            Trigger::ChangeDifficulty => {
                self.enter(Phase::DifficultySelect);
                self.difficulty = None;
                self.status = "Choose your challenge level".to_string();
                Ok(())
            }
        };

        if let Err(err) = &result {
            warn!("rejected trigger in {:?}: {err}", self.phase);
        }
        result.map(|()| self.phase)
    }

    /// Runs the engine for the pending AI turn without touching the session.
    pub fn request_ai_move(&self) -> CoreResult<SearchResult> {
        self.expect_phase(Phase::AiTurn)?;
        let level = self.difficulty.unwrap_or(Difficulty::Medium);
        self.selector
            .select_move(&self.state, &self.config.search_config(level))
    }

    /// Computes and applies the AI move in one go.
    pub fn step_ai(&mut self) -> CoreResult<Phase> {
        let result = self.request_ai_move()?;
        self.handle(Trigger::AiMoveComputed(result))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let (black_count, white_count) = self.state.score();
        GameSnapshot {
            board: self.state.board().to_array().to_vec(),
            phase: self.phase,
            difficulty: self.difficulty,
            current_player: self.state.side_to_move(),
            human: self.human(),
            black_count,
            white_count,
            is_game_over: self.state.is_terminal(),
            passed: self.state.last_pass(),
            last_move: self.state.last_move(),
            flipped: self
                .history
                .last()
                .map(|mv| mv.flips.clone())
                .unwrap_or_default(),
            legal_moves: self.legal_moves(),
            status: self.status.clone(),
        }
    }

    /// Final result; `None` while the game is still running.
    pub fn result(&self) -> Option<GameResult> {
        let outcome = self.state.outcome()?;
        let (black_count, white_count) = self.state.score();
        Some(GameResult {
            outcome,
            winner: outcome.winner(),
            black_count,
            white_count,
        })
    }

    fn choose_difficulty(&mut self, level: Difficulty) -> CoreResult<()> {
        self.expect_phase(Phase::DifficultySelect)?;
        self.difficulty = Some(level);
        info!("starting {level} game (depth {})", level.depth());
        self.start();
        Ok(())
    }

    fn play_again(&mut self) -> CoreResult<()> {
        let level = match (self.phase, self.difficulty) {
            (Phase::DifficultySelect, _) | (_, None) => {
                return Err(CoreError::WrongPhase {
                    expected: Phase::GameOver,
                    actual: self.phase,
                });
            }
            (_, Some(level)) => level,
        };
        info!("restarting {level} game");
        self.start();
        Ok(())
    }

    fn click(&mut self, position: Position) -> CoreResult<()> {
        self.expect_phase(Phase::PlayerTurn)?;
        let (mv, next) = self.state.play(position)?;
        self.commit(mv, next);
        Ok(())
    }

    fn apply_ai_result(&mut self, result: &SearchResult) -> CoreResult<()> {
        self.expect_phase(Phase::AiTurn)?;
        match &result.choice {
            Choice::Move(mv) => {
                let next = self.state.apply_move(mv)?;
                self.commit(mv.clone(), next);
                Ok(())
            }
            // Settled states always give the side to move a legal move.
            Choice::Pass => Err(CoreError::IllegalPass),
        }
    }

    fn start(&mut self) {
        self.state = GameState::initial();
        self.history.clear();
        self.status = if self.state.side_to_move() == self.human() {
            "You have the first move.".to_string()
        } else {
            "AI moves first.".to_string()
        };
        self.enter(self.phase_for_state());
    }

    fn commit(&mut self, mv: Move, next: GameState) {
        self.state = next;
        self.history.push(mv);
        let phase = self.phase_for_state();
        self.status = self.status_for(phase);
        self.enter(phase);
    }

    fn phase_for_state(&self) -> Phase {
        if self.state.is_terminal() {
            Phase::GameOver
        } else if self.state.side_to_move() == self.human() {
            Phase::PlayerTurn
        } else {
            Phase::AiTurn
        }
    }

    fn status_for(&self, phase: Phase) -> String {
        match phase {
            Phase::GameOver => match self.result().and_then(|result| result.winner) {
                Some(side) if side == self.human() => "You win!".to_string(),
                Some(_) => "AI wins!".to_string(),
                None => "It's a tie.".to_string(),
            },
            Phase::PlayerTurn if self.state.last_pass() == Some(self.ai()) => {
                "AI has no moves and passes. Your turn".to_string()
            }
            Phase::AiTurn if self.state.last_pass() == Some(self.human()) => {
                "You have no moves and pass. AI thinking...".to_string()
            }
            Phase::PlayerTurn => "Your turn".to_string(),
            Phase::AiTurn => "AI thinking...".to_string(),
            Phase::DifficultySelect => "Choose your challenge level".to_string(),
        }
    }

    fn enter(&mut self, phase: Phase) {
        if phase != self.phase {
            info!("phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    fn expect_phase(&self, expected: Phase) -> CoreResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(CoreError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    struct FixedMoveSelector {
        result: SearchResult,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(&self, _state: &GameState, _config: &SearchConfig) -> CoreResult<SearchResult> {
            Ok(self.result.clone())
        }
    }

    fn pos(row: u8, col: u8) -> Position {
        Position { row, col }
    }

    fn started(level: Difficulty) -> GameSession {
        let mut session = GameSession::default();
        session.handle(Trigger::DifficultyChosen(level)).unwrap();
        session
    }

    fn set_state_for_test(session: &mut GameSession, state: GameState) {
        session.state = state;
        session.phase = session.phase_for_state();
    }

    #[test]
    fn new_session_waits_for_a_difficulty() {
        let session = GameSession::default();

        assert_eq!(session.phase(), Phase::DifficultySelect);
        assert!(session.legal_moves().is_empty());
        assert_eq!(
            session.request_ai_move().unwrap_err(),
            CoreError::WrongPhase {
                expected: Phase::AiTurn,
                actual: Phase::DifficultySelect
            }
        );
    }

    #[test]
    fn choosing_a_difficulty_starts_with_the_human_to_move() {
        let session = started(Difficulty::Hard);
        let snapshot = session.snapshot();

        assert_eq!(session.phase(), Phase::PlayerTurn);
        assert_eq!(session.difficulty(), Some(Difficulty::Hard));
        assert_eq!(snapshot.current_player, Side::Black);
        assert_eq!((snapshot.black_count, snapshot.white_count), (2, 2));
        assert_eq!(snapshot.legal_moves.len(), 4);
        assert!(snapshot.flipped.is_empty());
        assert_eq!(snapshot.status, "You have the first move.");
    }

    #[test]
    fn legal_click_hands_the_turn_to_the_ai() {
        let mut session = started(Difficulty::Easy);

        let phase = session.handle(Trigger::CellClicked(pos(2, 3))).unwrap();

        assert_eq!(phase, Phase::AiTurn);
        assert_eq!(session.history().len(), 1);
        assert!(session.legal_moves().is_empty());
        assert_eq!(session.snapshot().flipped, vec![pos(3, 3)]);
        assert_eq!(session.status(), "AI thinking...");
    }

    #[test]
    fn illegal_click_changes_nothing() {
        let mut session = started(Difficulty::Easy);
        let before = *session.state();

        let err = session.handle(Trigger::CellClicked(pos(0, 0))).unwrap_err();

        assert_eq!(err, CoreError::InvalidMove { row: 0, col: 0 });
        assert_eq!(*session.state(), before);
        assert_eq!(session.phase(), Phase::PlayerTurn);
        assert!(session.history().is_empty());
    }

    #[test]
    fn clicks_during_the_ai_turn_are_rejected() {
        let mut session = started(Difficulty::Easy);
        session.handle(Trigger::CellClicked(pos(2, 3))).unwrap();

        let err = session.handle(Trigger::CellClicked(pos(2, 2))).unwrap_err();

        assert_eq!(
            err,
            CoreError::WrongPhase {
                expected: Phase::PlayerTurn,
                actual: Phase::AiTurn
            }
        );
    }

    #[test]
    fn ai_step_plays_a_legal_move_and_returns_the_turn() {
        let mut session = started(Difficulty::Medium);
        session.handle(Trigger::CellClicked(pos(2, 3))).unwrap();

        let phase = session.step_ai().unwrap();

        assert_eq!(phase, Phase::PlayerTurn);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].side, Side::White);
        assert_eq!(session.state().side_to_move(), Side::Black);
        assert_eq!(session.status(), "Your turn");
    }

    #[test]
    fn stale_ai_result_is_rejected() {
        let mut session = started(Difficulty::Easy);
        session.handle(Trigger::CellClicked(pos(2, 3))).unwrap();
        let result = session.request_ai_move().unwrap();
        session.handle(Trigger::AiMoveComputed(result.clone())).unwrap();

        assert!(matches!(
            session.handle(Trigger::AiMoveComputed(result.clone())),
            Err(CoreError::WrongPhase { .. })
        ));

        let reply = session.legal_moves()[0];
        session.handle(Trigger::CellClicked(reply)).unwrap();
        let before = *session.state();

        assert!(session.handle(Trigger::AiMoveComputed(result)).is_err());
        assert_eq!(*session.state(), before);
    }

    #[test]
    fn ai_pass_result_is_refused() {
        let pass = SearchResult {
            choice: Choice::Pass,
            score: 0,
            depth: 1,
            nodes: 1,
            timed_out: false,
        };
        let mut session = GameSession::with_selector(
            SessionConfig::default(),
            Box::new(FixedMoveSelector { result: pass }),
        );
        session.handle(Trigger::DifficultyChosen(Difficulty::Easy)).unwrap();
        session.handle(Trigger::CellClicked(pos(2, 3))).unwrap();

        assert_eq!(session.step_ai(), Err(CoreError::IllegalPass));
        assert_eq!(session.phase(), Phase::AiTurn);
    }

    #[test]
    fn human_pass_is_reported_and_ai_moves_again() {
        let mut session = started(Difficulty::Easy);
        let board: Board = "
            XXXXXXO.
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXXX
            XXXXXXO.
            XXXXXXXX
            XXXXXXXX
        "
        .parse()
        .unwrap();
        // flip colours so the AI (white) owns the big side
        let (black, white) = board.bitboards();
        set_state_for_test(
            &mut session,
            GameState::from_board(Board::from_bitboards(white, black), Side::White),
        );
        assert_eq!(session.phase(), Phase::AiTurn);

        let phase = session.step_ai().unwrap();

        assert_eq!(phase, Phase::AiTurn);
        assert_eq!(session.state().last_pass(), Some(Side::Black));
        assert_eq!(session.status(), "You have no moves and pass. AI thinking...");

        assert_eq!(session.step_ai().unwrap(), Phase::GameOver);
        assert_eq!(session.status(), "AI wins!");
    }

    #[test]
    fn game_over_reports_the_outcome_and_can_restart() {
        let mut session = started(Difficulty::Easy);
        let black = 1u64 << 1;
        let white = u64::MAX ^ 1 ^ black;
        // black to move on a1 captures b1 and fills the board
        set_state_for_test(
            &mut session,
            GameState::from_board(Board::from_bitboards(white, black), Side::Black),
        );
        assert_eq!(session.phase(), Phase::PlayerTurn);

        let phase = session.handle(Trigger::CellClicked(pos(0, 0))).unwrap();

        assert_eq!(phase, Phase::GameOver);
        assert_eq!(session.status(), "You win!");
        let result = session.result().unwrap();
        assert_eq!(result.winner, Some(Side::Black));
        assert_eq!((result.black_count, result.white_count), (64, 0));
        assert!(session.snapshot().is_game_over);

        assert_eq!(session.handle(Trigger::PlayAgain), Ok(Phase::PlayerTurn));
        assert_eq!(session.difficulty(), Some(Difficulty::Easy));
        assert!(session.history().is_empty());
        assert_eq!(session.state().score(), (2, 2));
    }

    #[test]
    fn change_difficulty_returns_to_the_picker() {
        let mut session = started(Difficulty::Hard);
        session.handle(Trigger::CellClicked(pos(2, 3))).unwrap();

        assert_eq!(
            session.handle(Trigger::ChangeDifficulty),
            Ok(Phase::DifficultySelect)
        );
        assert_eq!(session.difficulty(), None);
        assert!(session.handle(Trigger::PlayAgain).is_err());
        assert_eq!(
            session.handle(Trigger::DifficultyChosen(Difficulty::Easy)),
            Ok(Phase::PlayerTurn)
        );
    }

    #[test]
    fn ai_moves_first_when_the_human_plays_white() {
        let config = SessionConfig {
            human: Side::White,
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(config);

        assert_eq!(
            session.handle(Trigger::DifficultyChosen(Difficulty::Easy)),
            Ok(Phase::AiTurn)
        );
        assert_eq!(session.status(), "AI moves first.");
        assert!(session.legal_moves().is_empty());
        assert_eq!(session.step_ai(), Ok(Phase::PlayerTurn));
        assert_eq!(session.history()[0].side, Side::Black);
    }
}
