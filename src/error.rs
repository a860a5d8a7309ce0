use thiserror::Error;

use crate::game::Phase;

/// Contract violations reported by the core.
///
/// None of these are transient: they signal a caller bug (or a stale UI
/// request), and the operation that raised them leaves all state untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("illegal move at ({row}, {col})")]
    InvalidMove { row: u8, col: u8 },

    #[error("cannot pass while legal moves remain")]
    IllegalPass,

    #[error("cannot search a finished game")]
    EmptySearchOnTerminalState,

    #[error("row/col out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    #[error("expected phase {expected:?}, game is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("malformed position: {0}")]
    ParsePosition(String),

    #[error("malformed board text: {0}")]
    ParseBoard(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
