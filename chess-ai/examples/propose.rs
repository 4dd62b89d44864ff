//! LLM 走法提议示例
//!
//! 运行方式:
//! ```bash
//! OPENROUTER_API_KEY=... cargo run -p chess-ai --example propose
//!
//! # 指定模型和局面
//! OPENROUTER_API_KEY=... cargo run -p chess-ai --example propose -- deepseek/deepseek-chat:free "<fen>"
//! ```

use std::env;

use chess_ai::llm::LlmProposer;
use chess_ai::{Evaluator, MoveProposer, MoveSelector, ProposalRequest, SelectorConfig};
use protocol::Position;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let Ok(api_key) = env::var("OPENROUTER_API_KEY") else {
        println!("Set OPENROUTER_API_KEY first");
        return Ok(());
    };

    let args: Vec<String> = env::args().collect();
    let model = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "deepseek/deepseek-chat:free".to_string());
    let position = match args.get(2) {
        Some(fen) => Position::from_fen(fen)?,
        None => Position::initial(),
    };
    let side = position.side_to_move();

    println!("Model:    {}", model);
    println!("Position: {}", position.to_fen());
    println!("Eval:     {:.2}", Evaluator::evaluate(&position, side));

    let proposer = LlmProposer::with_defaults()?;
    let request = ProposalRequest::for_position(&position, model, Some(api_key));
    let reply = proposer.propose(&request).await?;
    println!("Reply:    {:?}", reply);

    let mut selector = MoveSelector::new(SelectorConfig::default());
    let selection = selector.select(&position, side, Some(&reply))?;
    println!("Played:   {} ({:?})", selection.mv, selection.source);

    Ok(())
}
