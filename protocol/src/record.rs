//! 走法历史与对局快照
//!
//! 快照是展示层读取的唯一数据结构，可序列化为 JSON。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{GameState, Outcome};
use crate::piece::Side;

/// 人类玩家的策略标识
pub const HUMAN_POLICY: &str = "human";

/// 走法历史记录（只追加，不修改）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 半回合序号，从 1 开始
    pub ply: u32,
    /// 走子方
    pub side: Side,
    /// 模型或策略标识
    pub policy: String,
    /// 代数记号
    pub notation: String,
    /// 走棋时间
    pub played_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// 创建新的历史记录
    pub fn new(ply: u32, side: Side, policy: impl Into<String>, notation: impl Into<String>) -> Self {
        Self {
            ply,
            side,
            policy: policy.into(),
            notation: notation.into(),
            played_at: Utc::now(),
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.side.display_name(),
            self.policy,
            self.notation
        )
    }
}

/// 对局快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// 当前局面 FEN
    pub fen: String,
    /// 对局状态
    pub state: GameState,
    /// 当前走子方
    pub side_to_move: Side,
    /// 是否有走法正在计算
    pub thinking: bool,
    /// 最近一次错误
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// 终局状态文本
    pub status: String,
    /// 对局结果
    pub outcome: Outcome,
    /// 走法历史
    pub history: Vec<HistoryEntry>,
}

impl GameSnapshot {
    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 反序列化
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 最后一步走法
    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}
