//! 局面评估函数
//!
//! 单层静态评估：子力 + 位置分 + 中心加成 + 机动性 + 将军调整 + 重复惩罚。
//! 各项直接相加，结果只取决于局面本身。

use protocol::{PlacedPiece, Position, Role, Side};

/// 评估器
pub struct Evaluator;

/// 中心四格的加成倍率
const CENTER_BONUS: f64 = 1.1;
/// 每个合法走法的机动性分值
const MOBILITY_WEIGHT: f64 = 0.1;
/// 将军调整
const CHECK_ADJUSTMENT: f64 = 2.0;
/// 三次重复惩罚
const REPETITION_PENALTY: f64 = 5.0;

/// 棋子位置分值表（白方视角，第 0 行为第 8 横线，黑方需要上下镜像）
mod position_tables {
    /// 兵的位置分值
    pub const PAWN: [[f64; 8]; 8] = [
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0],
        [1.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 1.0],
        [0.5, 0.5, 1.0, 2.5, 2.5, 1.0, 0.5, 0.5],
        [0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 0.0],
        [0.5, -0.5, -1.0, 0.0, 0.0, -1.0, -0.5, 0.5],
        [0.5, 1.0, 1.0, -2.0, -2.0, 1.0, 1.0, 0.5],
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    ];

    /// 马的位置分值
    pub const KNIGHT: [[f64; 8]; 8] = [
        [-5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0],
        [-4.0, -2.0, 0.0, 0.0, 0.0, 0.0, -2.0, -4.0],
        [-3.0, 0.0, 1.0, 1.5, 1.5, 1.0, 0.0, -3.0],
        [-3.0, 0.5, 1.5, 2.0, 2.0, 1.5, 0.5, -3.0],
        [-3.0, 0.0, 1.5, 2.0, 2.0, 1.5, 0.0, -3.0],
        [-3.0, 0.5, 1.0, 1.5, 1.5, 1.0, 0.5, -3.0],
        [-4.0, -2.0, 0.0, 0.5, 0.5, 0.0, -2.0, -4.0],
        [-5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0],
    ];
}

impl Evaluator {
    /// 从 `perspective` 一方的视角评估局面，正值对该方有利
    pub fn evaluate(position: &Position, perspective: Side) -> f64 {
        Self::evaluate_material(position, perspective)
            + Self::mobility_score(position, perspective)
            + Self::check_score(position, perspective)
            + Self::repetition_score(position)
    }

    /// 子力、位置分与中心加成
    pub fn evaluate_material(position: &Position, perspective: Side) -> f64 {
        position
            .pieces()
            .iter()
            .map(|piece| {
                let value = Self::evaluate_piece(piece);
                if piece.side == perspective {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }

    /// 子力评估，计入对方立即吃子的最坏结果
    ///
    /// 轮到对方走时，取当前子力评估与对方每一步吃子后子力评估中的最小值；
    /// 轮到 `perspective` 走时就是 `evaluate_material`。
    pub fn material_after_captures(position: &Position, perspective: Side) -> f64 {
        let standing = Self::evaluate_material(position, perspective);
        if position.side_to_move() == perspective {
            return standing;
        }

        position
            .legal_moves()
            .iter()
            .filter(|reply| reply.is_capture())
            .filter_map(|reply| position.play(reply).ok())
            .map(|after| Self::evaluate_material(&after, perspective))
            .fold(standing, f64::min)
    }

    /// 棋子基础分值
    pub fn piece_value(role: Role) -> f64 {
        match role {
            Role::Pawn => 1.0,
            Role::Knight => 3.0,
            Role::Bishop => 3.0,
            Role::Rook => 5.0,
            Role::Queen => 9.0,
            Role::King => 0.0,
        }
    }

    /// 评估单个棋子的价值（包括位置分和中心加成）
    fn evaluate_piece(piece: &PlacedPiece) -> f64 {
        let value = Self::piece_value(piece.role) + Self::position_bonus(piece);
        if Self::is_center(piece) {
            value * CENTER_BONUS
        } else {
            value
        }
    }

    /// 获取位置加成分
    fn position_bonus(piece: &PlacedPiece) -> f64 {
        let row = match piece.side {
            Side::White => piece.row(),
            Side::Black => 7 - piece.row(),
        };
        let col = piece.col();

        match piece.role {
            Role::Pawn => position_tables::PAWN[row][col],
            Role::Knight => position_tables::KNIGHT[row][col],
            // 其他棋子暂时不加位置分
            _ => 0.0,
        }
    }

    fn is_center(piece: &PlacedPiece) -> bool {
        matches!(piece.row(), 3 | 4) && matches!(piece.col(), 3 | 4)
    }

    /// 轮到 `perspective` 走时机动性为正，否则为负
    fn mobility_score(position: &Position, perspective: Side) -> f64 {
        let mobility = MOBILITY_WEIGHT * position.mobility() as f64;
        if position.side_to_move() == perspective {
            mobility
        } else {
            -mobility
        }
    }

    /// 被将军的一方是 `perspective` 时扣分，否则加分
    fn check_score(position: &Position, perspective: Side) -> f64 {
        if !position.is_check() {
            return 0.0;
        }
        if position.side_to_move() == perspective {
            -CHECK_ADJUSTMENT
        } else {
            CHECK_ADJUSTMENT
        }
    }

    /// 三次重复局面无论视角一律扣分
    fn repetition_score(position: &Position) -> f64 {
        if position.is_threefold_repetition() {
            -REPETITION_PENALTY
        } else {
            0.0
        }
    }
}
