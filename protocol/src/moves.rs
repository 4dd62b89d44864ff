//! 走法定义
//!
//! `ChessMove` 只能由 [`crate::Position`] 从其合法走法列表中构造，
//! 不会从原始字符串直接合成。

use std::fmt;

use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Move, Position as _, Role, Square};

use crate::error::ChessError;

/// 合法走法（附带代数记号）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessMove {
    inner: Move,
    /// 标准代数记号，包含 `+` / `#` 后缀，如 `Qh4#`
    san: String,
    /// UCI 记号，如 `e2e4`、`e7e8q`
    uci: String,
}

impl ChessMove {
    /// 从规则引擎的合法走法构造（调用方保证 `inner` 在 `chess` 中合法）
    pub(crate) fn from_legal(chess: &Chess, inner: Move) -> Self {
        let mut san = San::from_move(chess, &inner).to_string();

        let mut after = chess.clone();
        after.play_unchecked(&inner);
        if after.is_checkmate() {
            san.push('#');
        } else if after.is_check() {
            san.push('+');
        }

        let uci = inner.to_uci(CastlingMode::Standard).to_string();

        Self { inner, san, uci }
    }

    pub(crate) fn inner(&self) -> &Move {
        &self.inner
    }

    /// 代数记号
    pub fn san(&self) -> &str {
        &self.san
    }

    /// UCI 记号
    pub fn uci(&self) -> &str {
        &self.uci
    }

    /// 起始格
    pub fn from(&self) -> Option<Square> {
        self.inner.from()
    }

    /// 目标格（易位时为王的目标格）
    pub fn to(&self) -> Option<Square> {
        self.uci.get(2..4).and_then(|s| s.parse().ok())
    }

    /// 升变棋子
    pub fn promotion(&self) -> Option<Role> {
        self.inner.promotion()
    }

    /// 是否吃子
    pub fn is_capture(&self) -> bool {
        self.inner.is_capture()
    }

    /// 与给定记号完全一致（忽略 `+`/`#` 后缀）
    pub fn matches_exact(&self, notation: &str) -> bool {
        let notation = strip_suffix(notation);
        strip_suffix(&self.san) == notation || self.uci == notation
    }

    /// 与给定记号大小写不敏感地一致（忽略 `+`/`#` 后缀）
    pub fn matches_ignore_case(&self, notation: &str) -> bool {
        let notation = strip_suffix(notation);
        strip_suffix(&self.san).eq_ignore_ascii_case(notation)
            || self.uci.eq_ignore_ascii_case(notation)
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.san)
    }
}

/// 去掉将军、将杀以及注释后缀
pub fn strip_suffix(notation: &str) -> &str {
    notation.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

/// 人类玩家提交的原始走法（起点、终点、可选升变）
///
/// 不会被直接执行，总是先与合法走法列表匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl MoveSpec {
    /// 从格子名称解析，如 `("e7", "e8", Some('q'))`
    pub fn parse(from: &str, to: &str, promotion: Option<char>) -> Result<Self, ChessError> {
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        let promotion = match promotion {
            Some(c) => Some(
                Role::from_char(c.to_ascii_lowercase())
                    .ok_or_else(|| ChessError::InvalidSquare(format!("promotion '{}'", c)))?,
            ),
            None => None,
        };
        Ok(Self { from, to, promotion })
    }

    /// 是否对应给定的合法走法
    ///
    /// 需要升变而未指定时默认升变为后。
    pub fn matches(&self, mv: &ChessMove) -> bool {
        let squares = format!("{}{}", self.from, self.to);
        if !mv.uci().starts_with(&squares) {
            return false;
        }
        match mv.promotion() {
            Some(role) => self.promotion.unwrap_or(Role::Queen) == role,
            None => true,
        }
    }
}

impl fmt::Display for MoveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

fn parse_square(text: &str) -> Result<Square, ChessError> {
    text.trim()
        .to_ascii_lowercase()
        .parse::<Square>()
        .map_err(|_| ChessError::InvalidSquare(text.to_string()))
}
