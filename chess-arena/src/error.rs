//! 对局控制错误

use protocol::{ChessError, GameState};
use thiserror::Error;

/// 对局控制错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArenaError {
    #[error("cannot {action} while the game is {state}")]
    InvalidTransition {
        action: &'static str,
        state: GameState,
    },

    #[error("Please set an OpenRouter API key (OPENROUTER_API_KEY)")]
    MissingCredential,

    #[error("{0}")]
    ProposalFailure(String),

    #[error("discarding stale resolution for ply {ply}")]
    StaleResolution { ply: usize },

    #[error("game controller has stopped")]
    ControllerClosed,

    #[error(transparent)]
    Chess(#[from] ChessError),
}
