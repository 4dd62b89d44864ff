//! 外部走法提议来源
//!
//! 提议来源（远程 LLM、脚本等）只返回自由文本，结果一律视为不可信。

use anyhow::Result;
use async_trait::async_trait;
use protocol::{Position, Side};

/// 一次走法提议请求
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalRequest {
    /// 当前局面 FEN
    pub fen: String,
    /// 走子方
    pub side: Side,
    /// 模型或策略标识
    pub policy: String,
    /// 访问凭据（如 API Key）
    pub credential: Option<String>,
    /// 合法走法的代数记号，用于提示
    pub legal_moves: Vec<String>,
}

impl ProposalRequest {
    /// 根据局面创建请求
    pub fn for_position(
        position: &Position,
        policy: impl Into<String>,
        credential: Option<String>,
    ) -> Self {
        Self {
            fen: position.to_fen(),
            side: position.side_to_move(),
            policy: policy.into(),
            credential,
            legal_moves: position.legal_notations(),
        }
    }
}

/// 外部走法提议来源
#[async_trait]
pub trait MoveProposer: Send + Sync {
    /// 针对请求给出一个走法提议（自由文本）
    async fn propose(&self, request: &ProposalRequest) -> Result<String>;
}
