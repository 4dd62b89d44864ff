//! 错误类型定义

use thiserror::Error;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 走法不在当前局面的合法走法集合中
    #[error("Illegal move: {notation}")]
    IllegalMove { notation: String },

    /// 当前局面没有任何合法走法（调用方应先检查终局）
    #[error("No legal moves available")]
    NoLegalMoves,

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无效的格子名称
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
