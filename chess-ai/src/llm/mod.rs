//! LLM 集成模块
//!
//! 通过 OpenRouter 调用远程 LLM 作为走法提议来源。

mod client;
mod engine;
mod prompt;

pub use client::{OpenRouterClient, OpenRouterConfig};
pub use engine::LlmProposer;
pub use prompt::PromptTemplate;
