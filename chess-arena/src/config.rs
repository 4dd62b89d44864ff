//! 对弈设置
//!
//! 设置以 JSON 保存在系统配置目录下。API Key 只从环境变量读取，从不写入文件。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chess_ai::llm::OpenRouterConfig;
use chess_ai::SelectorConfig;
use protocol::Side;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::player::PlayerSettings;

/// API Key 环境变量
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// 对弈设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// 白方席位
    pub white: PlayerSettings,
    /// 黑方席位
    pub black: PlayerSettings,
    /// 两步之间的间隔（毫秒）
    pub move_delay_ms: u64,
    pub selector: SelectorConfig,
    pub openrouter: OpenRouterConfig,
    /// 固定随机种子，结果可复现
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            white: PlayerSettings::remote("anthropic/claude-3-sonnet"),
            black: PlayerSettings::remote("deepseek/deepseek-chat:free"),
            move_delay_ms: 1000,
            selector: SelectorConfig::default(),
            openrouter: OpenRouterConfig::default(),
            seed: None,
        }
    }
}

impl ArenaSettings {
    /// 默认设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("llm-chess-arena");
            path.push("settings.json");
            path
        })
    }

    /// 从默认路径加载
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("Config directory unavailable, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// 从指定路径加载，文件不存在时使用默认设置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {:?}", path))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file: {:?}", path))?;

        info!("Loaded settings: {:?}", path);
        Ok(settings)
    }

    /// 保存到默认路径
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path().context("Config directory unavailable")?;
        self.save_to(&path)
    }

    /// 保存到指定路径
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).with_context(|| format!("Failed to write settings: {:?}", path))?;

        info!("Settings saved: {:?}", path);
        Ok(())
    }

    /// 某一方的席位
    pub fn seat(&self, side: Side) -> &PlayerSettings {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    /// 是否有席位需要 API Key
    pub fn requires_credential(&self) -> bool {
        self.white.requires_credential() || self.black.requires_credential()
    }

    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    /// 从环境变量读取 API Key（空值视为未设置）
    pub fn api_key_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}
