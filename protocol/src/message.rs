//! 对局状态与结果定义

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::Side;

/// 对局结果，完全由局面推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Outcome {
    /// 将死
    Checkmate { winner: Side },
    /// 逼和
    Stalemate,
    /// 三次重复局面
    DrawRepetition,
    /// 子力不足
    DrawInsufficientMaterial,
    /// 其他和棋（50 回合规则）
    DrawOther,
    /// 对局进行中
    Ongoing,
}

impl Outcome {
    /// 是否为终局
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// 胜方（和棋或未结束时为 None）
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    /// 面向玩家的状态文本
    pub fn status_text(&self) -> String {
        match self {
            Outcome::Checkmate { winner } => {
                format!("Checkmate! {} wins!", winner.display_name())
            }
            Outcome::Stalemate => "Game Over - Stalemate".to_string(),
            Outcome::DrawRepetition => "Game Over - Draw by repetition".to_string(),
            Outcome::DrawInsufficientMaterial => {
                "Game Over - Draw by insufficient material".to_string()
            }
            Outcome::DrawOther => "Game Over - Draw".to_string(),
            Outcome::Ongoing => String::new(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "checkmate({})", winner),
            Outcome::Stalemate => f.write_str("stalemate"),
            Outcome::DrawRepetition => f.write_str("draw-repetition"),
            Outcome::DrawInsufficientMaterial => f.write_str("draw-insufficient-material"),
            Outcome::DrawOther => f.write_str("draw-other"),
            Outcome::Ongoing => f.write_str("ongoing"),
        }
    }
}

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// 未开始
    #[default]
    Idle,
    /// 自动对弈进行中
    Playing,
    /// 暂停（可继续）
    Paused,
    /// 已结束
    Finished,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Idle => "idle",
            GameState::Playing => "playing",
            GameState::Paused => "paused",
            GameState::Finished => "finished",
        };
        f.write_str(name)
    }
}
