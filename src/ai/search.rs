use std::time::Duration;

use log::{debug, warn};
use web_time::Instant;

use crate::board::Board;
use crate::config::SearchConfig;
use crate::error::{CoreError, CoreResult};
use crate::state::GameState;
use crate::types::{Choice, SearchResult, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeValue {
    Complete(i32),
    TimedOut,
}

/// Fixed-depth minimax over copied [`GameState`]s.
///
/// The side to move at the root maximises the disc differential, the
/// opponent minimises it. Forced passes happen inside state transitions and
/// do not consume depth. Moves are tried in row-major order and ties keep the
/// first one, so results are reproducible.
pub struct Searcher {
    max_depth: u8,
    timeout: Option<Duration>,
    start_time: Instant,
    nodes: u64,
    timed_out: bool,
}

impl Searcher {
    pub fn new(max_depth: u8) -> Self {
        Self {
            max_depth,
            timeout: None,
            start_time: Instant::now(),
            nodes: 0,
            timed_out: false,
        }
    }

    pub fn with_timeout(max_depth: u8, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::new(max_depth)
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            timeout: config.time_limit(),
            ..Self::new(config.depth)
        }
    }

    /// Picks a move for the side to move in `state`.
    pub fn search(&mut self, state: &GameState) -> CoreResult<SearchResult> {
        if state.is_terminal() {
            return Err(CoreError::EmptySearchOnTerminalState);
        }

        let depth = if self.max_depth == 0 {
            warn!("search depth 0 requested, searching depth 1 instead");
            1
        } else {
            self.max_depth
        };

        self.start_time = Instant::now();
        self.nodes = 0;
        self.timed_out = false;

        let root_side = state.side_to_move();
        let mut moves = state.legal_moves();
        if moves.is_empty() {
            return Ok(SearchResult {
                choice: Choice::Pass,
                score: evaluate(state.board(), root_side),
                depth,
                nodes: 1,
                timed_out: false,
            });
        }

        let deadline = self
            .timeout
            .filter(|_| depth > 1)
            .map(|timeout| self.start_time + timeout);

        let (best, score, searched) = match self.search_root(state, depth, deadline) {
            Some((best, score)) => (best, score, depth),
            None => {
                self.timed_out = true;
                warn!(
                    "depth {depth} search exceeded {:?}, answering from depth 1",
                    self.timeout.unwrap_or_default()
                );
                let (best, score) = self.search_shallow(state);
                (best, score, 1)
            }
        };

        // successors() and legal_moves() enumerate the same squares in the same order
        let chosen = moves.swap_remove(best);
        debug!(
            "{root_side:?} picks {} at depth {searched}: score {score}, {} nodes in {:?}",
            chosen.position,
            self.nodes,
            self.start_time.elapsed()
        );

        Ok(SearchResult {
            choice: Choice::Move(chosen),
            score,
            depth: searched,
            nodes: self.nodes,
            timed_out: self.timed_out,
        })
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Returns `(index, score)` of the best root move, or `None` on timeout.
    fn search_root(
        &mut self,
        state: &GameState,
        depth: u8,
        deadline: Option<Instant>,
    ) -> Option<(usize, i32)> {
        let root_side = state.side_to_move();
        let mut best: Option<(usize, i32)> = None;

        for (index, (_, child)) in state.successors().enumerate() {
            match self.minimax(&child, root_side, depth - 1, deadline) {
                NodeValue::TimedOut => return None,
                NodeValue::Complete(score) => {
                    if best.is_none_or(|(_, best_score)| score > best_score) {
                        best = Some((index, score));
                    }
                }
            }
        }

        best
    }

    /// Depth-1 answer; never interrupted.
    fn search_shallow(&mut self, state: &GameState) -> (usize, i32) {
        let root_side = state.side_to_move();
        let mut best: Option<(usize, i32)> = None;

        for (index, (_, child)) in state.successors().enumerate() {
            self.nodes += 1;
            let score = evaluate(child.board(), root_side);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        best.unwrap_or((0, evaluate(state.board(), root_side)))
    }

    fn minimax(
        &mut self,
        state: &GameState,
        root_side: Side,
        depth: u8,
        deadline: Option<Instant>,
    ) -> NodeValue {
        self.nodes += 1;

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            return NodeValue::TimedOut;
        }

        if depth == 0 || state.is_terminal() {
            return NodeValue::Complete(evaluate(state.board(), root_side));
        }

        let maximizing = state.side_to_move() == root_side;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for (_, child) in state.successors() {
            match self.minimax(&child, root_side, depth - 1, deadline) {
                NodeValue::TimedOut => return NodeValue::TimedOut,
                NodeValue::Complete(score) => {
                    best = if maximizing {
                        best.max(score)
                    } else {
                        best.min(score)
                    };
                }
            }
        }

        NodeValue::Complete(best)
    }
}

/// Fixed-depth minimax choice for the side to move in `state`.
pub fn choose_move(state: &GameState, depth: u8) -> CoreResult<SearchResult> {
    Searcher::new(depth).search(state)
}

/// Static evaluation: `side`'s discs minus the opponent's.
pub fn evaluate(board: &Board, side: Side) -> i32 {
    board.count_of(side) as i32 - board.count_of(side.opponent()) as i32
}
