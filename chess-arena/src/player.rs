//! 对弈席位
//!
//! 每一方由一个席位驱动：远程席位向 LLM 请求提议并校验，
//! 本地席位直接使用启发式 Top-K 选择。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 本地启发式席位的策略标识
pub const LOCAL_POLICY: &str = "local-heuristic";

/// 席位类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// 远程模型提议 + 校验
    #[default]
    Remote,
    /// 本地启发式
    Local,
}

/// 席位设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    pub kind: PlayerKind,
    /// 远程模型名称（本地席位忽略）
    #[serde(default)]
    pub model: String,
}

impl PlayerSettings {
    /// 远程模型席位
    pub fn remote(model: impl Into<String>) -> Self {
        Self {
            kind: PlayerKind::Remote,
            model: model.into(),
        }
    }

    /// 本地启发式席位
    pub fn local() -> Self {
        Self {
            kind: PlayerKind::Local,
            model: String::new(),
        }
    }

    /// 写入历史记录的策略标识
    pub fn policy(&self) -> String {
        match self.kind {
            PlayerKind::Remote => self.model.clone(),
            PlayerKind::Local => LOCAL_POLICY.to_string(),
        }
    }

    /// 是否需要访问凭据
    pub fn requires_credential(&self) -> bool {
        self.kind == PlayerKind::Remote
    }
}

impl fmt::Display for PlayerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PlayerKind::Remote => write!(f, "remote:{}", self.model),
            PlayerKind::Local => f.write_str(LOCAL_POLICY),
        }
    }
}
