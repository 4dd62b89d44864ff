//! 国际象棋共享协议库
//!
//! 包含:
//! - 局面快照（基于 shakmaty 规则引擎）
//! - 走法与人类走法输入
//! - 阵营、对局状态与结果
//! - 走法历史与对局快照
//! - FEN 格式

mod board;
mod error;
mod fen;
mod message;
mod moves;
mod piece;
mod record;

pub use board::Position;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use message::{GameState, Outcome};
pub use moves::{strip_suffix, ChessMove, MoveSpec};
pub use piece::{PlacedPiece, Side};
pub use record::{GameSnapshot, HistoryEntry, HUMAN_POLICY};

/// 规则引擎类型的再导出
pub use shakmaty::{Role, Square};
