//! Error taxonomy for the engine's external contract.
//!
//! Kinds, not exception hierarchies: `InvalidFen` and `IllegalMove` are the only variants any
//! public entry point can return. `InternalInvariant` is never constructed outside
//! `debug_assertions` builds — release builds elide the checks that would raise it.

use std::fmt;

use crate::movegen::Move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `load_fen` was given a string that fails to parse as a valid position.
    InvalidFen { reason: String },
    /// `input_move` was given a move outside the current legal set, or the game is already over.
    IllegalMove { attempted: Move },
    /// A development-build assertion failure (make/unmake asymmetry, corrupt derived state).
    /// Never raised in release builds.
    InternalInvariant { detail: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidFen { reason } => write!(f, "invalid FEN: {reason}"),
            EngineError::IllegalMove { attempted } => {
                write!(f, "illegal move: {attempted}")
            }
            EngineError::InternalInvariant { detail } => {
                write!(f, "internal invariant violated: {detail}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    pub fn invalid_fen(reason: impl Into<String>) -> Self {
        EngineError::InvalidFen {
            reason: reason.into(),
        }
    }
}
