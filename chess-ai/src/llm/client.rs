//! OpenRouter REST API 客户端
//!
//! 通过 OpenAI 兼容的 `/chat/completions` 接口向远程模型请求走法。

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "llm")]
use anyhow::Context;
#[cfg(feature = "llm")]
use tracing::{debug, info};

/// OpenRouter 客户端配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// 服务地址，默认 https://openrouter.ai/api/v1
    pub base_url: String,
    /// 主模型不可用时的备用模型
    pub fallback_model: String,
    /// 最大生成 token 数（只需要一个走法）
    pub max_tokens: u32,
    /// 生成温度
    pub temperature: f32,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 每次提议的最大请求次数
    pub max_retries: u32,
    /// `HTTP-Referer` 请求头
    pub referer: String,
    /// `X-Title` 请求头
    pub title: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            fallback_model: "anthropic/claude-3-sonnet".to_string(),
            max_tokens: 10,
            temperature: 0.7,
            timeout_secs: 30,
            max_retries: 2,
            referer: "https://github.com/yourusername/ai-chess".to_string(),
            title: "AI Chess Game".to_string(),
        }
    }
}

/// 聊天消息
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// `/chat/completions` 请求体
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    /// 按顺序尝试的模型列表
    models: Vec<String>,
}

impl ChatRequest {
    fn new(config: &OpenRouterConfig, model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            models: vec![model.to_string(), config.fallback_model.clone()],
        }
    }
}

/// 从响应体中取出 `choices[0].message.content`
fn extract_content(body: &Value) -> Result<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid response from AI service"))
}

/// 服务返回的错误信息：`error.message` 或字符串形式的 `error`
fn extract_error(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

/// OpenRouter 客户端
#[cfg(feature = "llm")]
pub struct OpenRouterClient {
    config: OpenRouterConfig,
    client: reqwest::Client,
}

#[cfg(feature = "llm")]
impl OpenRouterClient {
    /// 创建新的客户端
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// 使用默认配置创建客户端
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenRouterConfig::default())
    }

    /// 发送一次对话请求，返回模型回复的文本
    pub async fn complete(&self, model: &str, api_key: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest::new(&self.config, model, prompt);

        debug!(
            "Sending request to OpenRouter: model={}, prompt_len={}",
            model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&request)
            .send()
            .await
            .context("Failed to send chat completion request")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        // 安全截取（避免切到多字节字符中间）
        let preview: String = response_text.chars().take(200).collect();
        debug!("Raw OpenRouter response: {}", preview);

        let body: Value = serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse AI service response (HTTP {})", status))?;

        if let Some(message) = extract_error(&body) {
            anyhow::bail!("{}", message);
        }
        if !status.is_success() {
            anyhow::bail!("AI service returned HTTP {}", status);
        }

        let content = extract_content(&body)?;
        info!("OpenRouter reply from {}: {:?}", model, content);
        Ok(content)
    }

    /// 获取当前配置
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }
}

/// 非 LLM feature 时的占位实现
#[cfg(not(feature = "llm"))]
pub struct OpenRouterClient {
    config: OpenRouterConfig,
}

#[cfg(not(feature = "llm"))]
impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenRouterConfig::default())
    }

    pub async fn complete(&self, _model: &str, _api_key: &str, _prompt: &str) -> Result<String> {
        anyhow::bail!("LLM feature not enabled. Compile with --features llm")
    }

    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }
}
