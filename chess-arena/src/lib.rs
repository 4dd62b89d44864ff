//! LLM 国际象棋对弈场
//!
//! 包含:
//! - 对局状态机
//! - 异步对局控制器
//! - 对弈席位
//! - 设置持久化

pub mod config;
pub mod controller;
pub mod error;
pub mod game;
pub mod player;

pub use config::{ArenaSettings, API_KEY_ENV};
pub use controller::{ControllerHandle, GameController};
pub use error::ArenaError;
pub use game::{GameCore, TurnTicket};
pub use player::{PlayerKind, PlayerSettings, LOCAL_POLICY};
