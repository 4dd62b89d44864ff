//! 对局控制器
//!
//! 单一所有者模型：一个 actor 任务持有 `GameCore`、走法选择器和随机数，
//! 所有修改都通过命令通道进入。远程提议在独立任务中运行，结果带着
//! `TurnTicket` 回到 actor，失效的结果直接丢弃。

use std::future::pending;
use std::sync::Arc;

use chess_ai::{MoveProposer, MoveSelector, ProposalRequest, Selection};
use protocol::{GameSnapshot, GameState, MoveSpec};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::ArenaSettings;
use crate::error::ArenaError;
use crate::game::{GameCore, TurnTicket};
use crate::player::PlayerKind;

/// 命令通道容量
const COMMAND_BUFFER: usize = 32;

/// 发送给控制器的命令
enum Command {
    Start(oneshot::Sender<Result<(), ArenaError>>),
    Pause(oneshot::Sender<Result<(), ArenaError>>),
    Reset(oneshot::Sender<()>),
    /// 立即尝试走一步，回复是否开始了新的求解
    Advance(oneshot::Sender<bool>),
    SubmitUserMove {
        from: String,
        to: String,
        promotion: Option<char>,
        reply: oneshot::Sender<bool>,
    },
}

/// 远程提议的结果
struct Resolution {
    ticket: TurnTicket,
    policy: String,
    proposal: Result<String, String>,
}

/// 对局控制器
pub struct GameController {
    core: GameCore,
    selector: MoveSelector,
    settings: ArenaSettings,
    proposer: Option<Arc<dyn MoveProposer>>,
    credential: Option<String>,
    commands: mpsc::Receiver<Command>,
    resolution_tx: mpsc::UnboundedSender<Resolution>,
    resolution_rx: mpsc::UnboundedReceiver<Resolution>,
    snapshots: watch::Sender<GameSnapshot>,
    /// 正在进行的远程提议任务
    task: Option<JoinHandle<()>>,
    /// 下一次自动走棋的时间
    next_turn: Option<Instant>,
}

impl GameController {
    /// 创建控制器及其句柄
    pub fn new(
        settings: ArenaSettings,
        proposer: Option<Arc<dyn MoveProposer>>,
        credential: Option<String>,
    ) -> (Self, ControllerHandle) {
        let core = GameCore::new();
        let selector = match settings.seed {
            Some(seed) => MoveSelector::seeded(settings.selector.clone(), seed),
            None => MoveSelector::new(settings.selector.clone()),
        };

        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (resolution_tx, resolution_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(core.snapshot());

        let controller = Self {
            core,
            selector,
            settings,
            proposer,
            credential,
            commands,
            resolution_tx,
            resolution_rx,
            snapshots,
            task: None,
            next_turn: None,
        };
        let handle = ControllerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (controller, handle)
    }

    /// 创建控制器并在后台运行
    pub fn spawn(
        settings: ArenaSettings,
        proposer: Option<Arc<dyn MoveProposer>>,
        credential: Option<String>,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (controller, handle) = Self::new(settings, proposer, credential);
        (handle, tokio::spawn(controller.run()))
    }

    /// 事件循环，所有句柄释放后退出
    pub async fn run(mut self) {
        info!(
            "Game controller running: white={}, black={}",
            self.settings.white, self.settings.black
        );

        loop {
            let deadline = self.next_turn;
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(resolution) = self.resolution_rx.recv() => {
                    self.handle_resolution(resolution);
                    self.sync();
                }
                _ = wait_until(deadline) => {
                    self.next_turn = None;
                    self.advance();
                    self.sync();
                }
            }
        }

        self.abort_task();
        info!("Game controller stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(reply) => {
                let result = self.core.start(self.credential_ready());
                self.sync();
                let _ = reply.send(result);
            }
            Command::Pause(reply) => {
                let result = self.core.pause();
                self.abort_task();
                self.sync();
                let _ = reply.send(result);
            }
            Command::Reset(reply) => {
                self.core.reset();
                self.abort_task();
                self.sync();
                let _ = reply.send(());
            }
            Command::Advance(reply) => {
                self.next_turn = None;
                let started = self.advance();
                self.sync();
                let _ = reply.send(started);
            }
            Command::SubmitUserMove {
                from,
                to,
                promotion,
                reply,
            } => {
                let accepted = match MoveSpec::parse(&from, &to, promotion) {
                    Ok(spec) => self.core.submit_user_move(&spec),
                    Err(err) => {
                        debug!("Rejected user move {}-{}: {}", from, to, err);
                        false
                    }
                };
                if accepted {
                    self.abort_task();
                    self.next_turn = None;
                }
                self.sync();
                let _ = reply.send(accepted);
            }
        }
    }

    /// 开始一次求解，返回是否开始
    fn advance(&mut self) -> bool {
        let Some(ticket) = self.core.begin_turn() else {
            return false;
        };

        let seat = self.settings.seat(ticket.side).clone();
        let policy = seat.policy();
        debug!("{} to move ({})", ticket.side.display_name(), seat);

        match seat.kind {
            PlayerKind::Local => {
                let result = self
                    .selector
                    .select(&ticket.position, ticket.side, None)
                    .map_err(ArenaError::from);
                self.finish_turn(ticket, &policy, result);
            }
            PlayerKind::Remote => match self.proposer.clone() {
                Some(proposer) => self.spawn_proposal(ticket, policy, proposer),
                None => self.finish_turn(ticket, &policy, Err(ArenaError::MissingCredential)),
            },
        }
        true
    }

    fn spawn_proposal(
        &mut self,
        ticket: TurnTicket,
        policy: String,
        proposer: Arc<dyn MoveProposer>,
    ) {
        let request =
            ProposalRequest::for_position(&ticket.position, policy.clone(), self.credential.clone());
        let resolution_tx = self.resolution_tx.clone();

        self.abort_task();
        self.task = Some(tokio::spawn(async move {
            let proposal = proposer
                .propose(&request)
                .await
                .map_err(|err| err.to_string());
            let resolution = Resolution {
                ticket,
                policy,
                proposal,
            };
            if resolution_tx.send(resolution).is_err() {
                debug!("Controller gone, dropping proposal");
            }
        }));
    }

    fn handle_resolution(&mut self, resolution: Resolution) {
        let Resolution {
            ticket,
            policy,
            proposal,
        } = resolution;

        if !self.core.is_current(&ticket) {
            debug!("{}", ArenaError::StaleResolution { ply: ticket.ply });
            return;
        }
        self.task = None;

        let result = match proposal {
            Ok(text) => {
                let preview: String = text.chars().take(200).collect();
                debug!("{} proposed {:?}", policy, preview);
                self.selector
                    .select(&ticket.position, ticket.side, Some(&text))
                    .map_err(ArenaError::from)
            }
            Err(message) => Err(ArenaError::ProposalFailure(message)),
        };
        self.finish_turn(ticket, &policy, result);
    }

    fn finish_turn(
        &mut self,
        ticket: TurnTicket,
        policy: &str,
        result: Result<Selection, ArenaError>,
    ) {
        match self.core.complete_turn(ticket, policy, result) {
            Ok(Some(entry)) => info!("{}. {}", entry.ply, entry),
            Ok(None) => warn!(
                "Game paused: {}",
                self.core.last_error().unwrap_or_default()
            ),
            Err(err) => debug!("{}", err),
        }
    }

    fn credential_ready(&self) -> bool {
        !self.settings.requires_credential()
            || (self.proposer.is_some() && self.credential.is_some())
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// 安排下一次自动走棋并发布快照
    fn sync(&mut self) {
        if self.core.state() != GameState::Playing {
            self.next_turn = None;
        } else if !self.core.in_flight() && self.next_turn.is_none() {
            self.next_turn = Some(Instant::now() + self.settings.move_delay());
        }
        self.snapshots.send_replace(self.core.snapshot());
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

/// 控制器句柄，供展示层使用
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<GameSnapshot>,
}

impl ControllerHandle {
    /// 最新快照
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// 订阅快照更新
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    pub async fn start(&self) -> Result<(), ArenaError> {
        self.request(Command::Start).await?
    }

    pub async fn pause(&self) -> Result<(), ArenaError> {
        self.request(Command::Pause).await?
    }

    pub async fn reset(&self) -> Result<(), ArenaError> {
        self.request(Command::Reset).await
    }

    /// 不等待间隔，立即尝试走一步
    pub async fn advance(&self) -> Result<bool, ArenaError> {
        self.request(Command::Advance).await
    }

    /// 提交人类走法，返回是否被接受
    pub async fn submit_user_move(&self, from: &str, to: &str, promotion: Option<char>) -> bool {
        let from = from.to_string();
        let to = to.to_string();
        self.request(|reply| Command::SubmitUserMove {
            from,
            to,
            promotion,
            reply,
        })
        .await
        .unwrap_or(false)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ArenaError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ArenaError::ControllerClosed)?;
        response.await.map_err(|_| ArenaError::ControllerClosed)
    }
}
