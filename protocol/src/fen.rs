//! FEN 格式解析和生成
//!
//! 国际象棋 FEN 格式：
//! `<棋盘> <走子方> <易位权> <吃过路兵格> <半回合计数> <回合数>`
//!
//! 示例：
//! `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`

use shakmaty::fen::Fen as RawFen;
use shakmaty::{CastlingMode, Chess, EnPassantMode};

use crate::error::ChessError;

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为规则引擎局面
    pub fn parse(fen: &str) -> Result<Chess, ChessError> {
        let trimmed = fen.trim();
        if trimmed.is_empty() {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        }

        let raw: RawFen = trimmed.parse().map_err(|e| ChessError::InvalidFen {
            reason: format!("{}", e),
        })?;

        raw.into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| ChessError::InvalidFen {
                reason: format!("{}", e),
            })
    }

    /// 将局面转换为 FEN 字符串
    pub fn to_string(chess: &Chess) -> String {
        RawFen::from_position(chess.clone(), EnPassantMode::Legal).to_string()
    }

    /// 重复局面判定键：FEN 的前四段（棋盘、走子方、易位权、吃过路兵格）
    pub fn repetition_key(chess: &Chess) -> String {
        Self::to_string(chess)
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Position as _;

    #[test]
    fn test_parse_initial() {
        let chess = Fen::parse(INITIAL_FEN).unwrap();
        assert_eq!(chess.legal_moves().len(), 20);
    }

    #[test]
    fn test_to_string_initial() {
        let chess = Chess::default();
        assert_eq!(Fen::to_string(&chess), INITIAL_FEN);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(Fen::parse(""), Err(ChessError::InvalidFen { .. })));
        assert!(matches!(
            Fen::parse("not a fen at all"),
            Err(ChessError::InvalidFen { .. })
        ));
        // 缺少白王
        assert!(Fen::parse("4k3/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn test_repetition_key_ignores_counters() {
        let a = Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let b = Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 12 40").unwrap();
        assert_eq!(Fen::repetition_key(&a), Fen::repetition_key(&b));
        assert_eq!(Fen::repetition_key(&a), "4k3/8/8/8/8/8/8/4K3 w - -");
    }
}
