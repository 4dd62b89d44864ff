//! 基于 LLM 的走法提议来源
//!
//! 把局面交给远程模型，取回一段文本作为提议。结果的合法性不在这里判断。

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{OpenRouterClient, OpenRouterConfig, PromptTemplate};
use crate::parser::ProposalParser;
use crate::proposal::{MoveProposer, ProposalRequest};

/// LLM 走法提议器
pub struct LlmProposer {
    client: OpenRouterClient,
    /// 最大请求次数
    max_retries: u32,
}

impl LlmProposer {
    /// 创建新的提议器
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let max_retries = config.max_retries.max(1);
        let client = OpenRouterClient::new(config)?;
        Ok(Self {
            client,
            max_retries,
        })
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenRouterConfig::default())
    }

    /// 获取客户端配置
    pub fn config(&self) -> &OpenRouterConfig {
        self.client.config()
    }
}

#[async_trait]
impl MoveProposer for LlmProposer {
    async fn propose(&self, request: &ProposalRequest) -> Result<String> {
        let api_key = request
            .credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("Missing OpenRouter API key"))?;

        if request.legal_moves.is_empty() {
            bail!("No legal moves available");
        }

        let prompt = PromptTemplate::move_request(&request.fen, &request.legal_moves);
        debug!("LLM prompt length: {} chars", prompt.len());

        let mut last_error = None;
        for attempt in 1..=self.max_retries {
            info!(
                "Requesting {} move from {} (attempt {}/{})",
                request.side, request.policy, attempt, self.max_retries
            );

            match self.client.complete(&request.policy, api_key, &prompt).await {
                Ok(response) => {
                    if ProposalParser::clean_response(&response).is_empty() {
                        warn!("LLM returned an empty move (attempt {})", attempt);
                        last_error = Some(anyhow!("Empty response from AI service"));
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    warn!("LLM request failed (attempt {}): {}", attempt, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("AI service produced no move")))
    }
}
