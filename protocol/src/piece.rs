//! 阵营与棋子定义

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{Color, Role, Square};

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 白方（先手）
    White,
    /// 黑方（后手）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// 小写名称，用于提示词和日志
    pub fn name(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    /// 首字母大写的名称，用于走法历史显示
    pub fn display_name(&self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// 棋盘上的一枚棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPiece {
    pub square: Square,
    pub side: Side,
    pub role: Role,
}

impl PlacedPiece {
    /// 列索引，a 列为 0
    pub fn col(&self) -> usize {
        (self.square.file().char() as u8 - b'a') as usize
    }

    /// 行索引，第 8 横线为 0（与白方视角的棋盘图一致）
    pub fn row(&self) -> usize {
        7 - (self.square.rank().char() as u8 - b'1') as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::White.opponent(), Side::Black);
        assert_eq!(Side::Black.opponent(), Side::White);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(Side::from(Color::Black), Side::Black);
        assert_eq!(Color::from(Side::White), Color::White);
    }

    #[test]
    fn test_row_col() {
        let piece = PlacedPiece {
            square: Square::E2,
            side: Side::White,
            role: Role::Pawn,
        };
        assert_eq!(piece.col(), 4);
        assert_eq!(piece.row(), 6);

        let corner = PlacedPiece {
            square: Square::A8,
            side: Side::Black,
            role: Role::Rook,
        };
        assert_eq!(corner.col(), 0);
        assert_eq!(corner.row(), 0);
    }

    #[test]
    fn test_side_serde() {
        let json = serde_json::to_string(&Side::White).unwrap();
        assert_eq!(json, "\"white\"");
    }
}
