//! 棋盘局面
//!
//! `Position` 是不可变快照：每一步走法都会产生新的 `Position`，
//! 旧快照保持不变。规则判定（合法走法、将军、将死、和棋）委托给 shakmaty，
//! 三次重复局面所需的历史记录由本类型随快照一起携带。

use std::sync::Arc;

use shakmaty::{Chess, Position as _};

use crate::error::ChessError;
use crate::fen::Fen;
use crate::message::Outcome;
use crate::moves::{ChessMove, MoveSpec};
use crate::piece::{PlacedPiece, Side};

/// 50 回合规则对应的半回合数
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// 三次重复
const REPETITION_LIMIT: usize = 3;

/// 局面快照
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
    /// 从对局开始到当前局面（含）的重复判定键
    history: Arc<Vec<String>>,
}

impl Position {
    /// 标准初始局面
    pub fn initial() -> Self {
        Self::from_chess(Chess::default())
    }

    /// 从 FEN 创建（重复历史从该局面开始计算）
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::from_chess(Fen::parse(fen)?))
    }

    fn from_chess(chess: Chess) -> Self {
        let key = Fen::repetition_key(&chess);
        Self {
            chess,
            history: Arc::new(vec![key]),
        }
    }

    /// 转换为 FEN
    pub fn to_fen(&self) -> String {
        Fen::to_string(&self.chess)
    }

    /// 当前走子方
    pub fn side_to_move(&self) -> Side {
        Side::from(self.chess.turn())
    }

    /// 已走的半回合数（相对于本快照链的起点）
    pub fn ply(&self) -> usize {
        self.history.len() - 1
    }

    /// 合法走法（详细形式），顺序即规则引擎的枚举顺序
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        self.chess
            .legal_moves()
            .into_iter()
            .map(|m| ChessMove::from_legal(&self.chess, m))
            .collect()
    }

    /// 合法走法的代数记号列表
    pub fn legal_notations(&self) -> Vec<String> {
        self.legal_moves()
            .into_iter()
            .map(|m| m.san().to_string())
            .collect()
    }

    /// 合法走法数量
    pub fn mobility(&self) -> usize {
        self.chess.legal_moves().len()
    }

    /// 执行走法，返回新局面
    pub fn play(&self, mv: &ChessMove) -> Result<Position, ChessError> {
        if !self.chess.is_legal(mv.inner()) {
            return Err(ChessError::IllegalMove {
                notation: mv.san().to_string(),
            });
        }

        let mut chess = self.chess.clone();
        chess.play_unchecked(mv.inner());

        let mut history = (*self.history).clone();
        history.push(Fen::repetition_key(&chess));

        Ok(Self {
            chess,
            history: Arc::new(history),
        })
    }

    /// 按代数记号执行走法（大小写不敏感，优先完全匹配）
    pub fn play_notation(&self, notation: &str) -> Result<Position, ChessError> {
        let mv = self
            .find_notation(notation)
            .ok_or_else(|| ChessError::IllegalMove {
                notation: notation.to_string(),
            })?;
        self.play(&mv)
    }

    /// 在合法走法中查找记号
    pub fn find_notation(&self, notation: &str) -> Option<ChessMove> {
        let notation = notation.trim();
        let moves = self.legal_moves();
        if let Some(mv) = moves.iter().find(|m| m.matches_exact(notation)) {
            return Some(mv.clone());
        }
        moves.into_iter().find(|m| m.matches_ignore_case(notation))
    }

    /// 在合法走法中查找起点/终点对应的走法
    pub fn find_move(&self, spec: &MoveSpec) -> Option<ChessMove> {
        self.legal_moves().into_iter().find(|m| spec.matches(m))
    }

    /// 空着：走子方原地不动，轮到对方走
    ///
    /// 吃过路兵的权利随之失效，新快照的重复历史从自身开始。
    /// 走子方正被将军时没有空着。
    pub fn pass(&self) -> Option<Position> {
        if self.is_check() {
            return None;
        }

        let fen = self.to_fen();
        let mut fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return None;
        }
        fields[1] = match self.side_to_move() {
            Side::White => "b",
            Side::Black => "w",
        };
        fields[3] = "-";

        Position::from_fen(&fields.join(" ")).ok()
    }

    /// 棋盘上所有棋子
    pub fn pieces(&self) -> Vec<PlacedPiece> {
        let board = self.chess.board();
        board
            .occupied()
            .into_iter()
            .filter_map(|square| {
                board.piece_at(square).map(|piece| PlacedPiece {
                    square,
                    side: Side::from(piece.color),
                    role: piece.role,
                })
            })
            .collect()
    }

    /// 走子方是否被将军
    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    /// 是否将死
    pub fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    /// 是否逼和
    pub fn is_stalemate(&self) -> bool {
        self.chess.is_stalemate()
    }

    /// 双方子力均不足以将死
    pub fn is_insufficient_material(&self) -> bool {
        self.chess.is_insufficient_material()
    }

    /// 当前局面是否已出现三次
    pub fn is_threefold_repetition(&self) -> bool {
        let current = match self.history.last() {
            Some(key) => key,
            None => return false,
        };
        self.history.iter().filter(|key| *key == current).count() >= REPETITION_LIMIT
    }

    /// 50 回合无吃子无兵步
    pub fn is_fifty_moves(&self) -> bool {
        self.chess.halfmoves() >= FIFTY_MOVE_HALFMOVES
    }

    /// 是否和棋（逼和、子力不足、三次重复、50 回合）
    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_fifty_moves()
    }

    /// 是否终局
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// 当前局面的对局结果
    pub fn outcome(&self) -> Outcome {
        if self.is_checkmate() {
            Outcome::Checkmate {
                winner: self.side_to_move().opponent(),
            }
        } else if self.is_stalemate() {
            Outcome::Stalemate
        } else if self.is_threefold_repetition() {
            Outcome::DrawRepetition
        } else if self.is_insufficient_material() {
            Outcome::DrawInsufficientMaterial
        } else if self.is_fifty_moves() {
            Outcome::DrawOther
        } else {
            Outcome::Ongoing
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}
