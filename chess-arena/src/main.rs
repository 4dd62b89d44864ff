use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chess_ai::llm::LlmProposer;
use chess_ai::MoveProposer;
use chess_arena::{ArenaSettings, GameController, API_KEY_ENV};
use protocol::GameState;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_arena=info".parse()?),
        )
        .init();

    let settings = match std::env::args().nth(1) {
        Some(path) => ArenaSettings::load_from(Path::new(&path))?,
        None => ArenaSettings::load()?,
    };

    let credential = ArenaSettings::api_key_from_env();
    let proposer: Option<Arc<dyn MoveProposer>> = match &credential {
        Some(_) => Some(Arc::new(
            LlmProposer::new(settings.openrouter.clone()).context("Failed to create LLM client")?,
        )),
        None => {
            if settings.requires_credential() {
                warn!("{} is not set", API_KEY_ENV);
            }
            None
        }
    };

    info!("White: {}, Black: {}", settings.white, settings.black);

    let (handle, controller) = GameController::spawn(settings, proposer, credential);
    let mut updates = handle.subscribe();
    handle.start().await?;

    let mut printed = 0;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                for entry in snapshot.history.iter().skip(printed) {
                    println!("{}. {}", entry.ply, entry);
                }
                printed = snapshot.history.len();

                match snapshot.state {
                    GameState::Finished => {
                        println!("{}", snapshot.status);
                        println!("Final position: {}", snapshot.fen);
                        break;
                    }
                    GameState::Paused => {
                        if let Some(message) = &snapshot.last_error {
                            error!("{}", message);
                        }
                        break;
                    }
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, pausing game");
                if let Err(e) = handle.pause().await {
                    warn!("{}", e);
                }
                break;
            }
        }
    }

    drop(handle);
    controller.await.context("Game controller crashed")?;
    Ok(())
}
