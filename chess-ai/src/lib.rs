//! 国际象棋走法引擎
//!
//! 包含:
//! - 棋局评估函数
//! - 外部提议解析与校验
//! - 启发式 Top-K 选择
//! - LLM 走法提议（OpenRouter）

mod evaluate;
mod parser;
mod proposal;
mod select;

pub mod llm;

pub use evaluate::Evaluator;
pub use parser::ProposalParser;
pub use proposal::{MoveProposer, ProposalRequest};
pub use select::{
    Fallback, MoveSelector, Rejection, ScoredMove, Selection, SelectionSource, SelectorConfig,
    Verdict,
};
