//! 对局状态机
//!
//! `GameCore` 只负责状态转换，不涉及异步和计时。
//! 每次求解走法都会领取一张 `TurnTicket`；暂停、重置或人类走子会让旧票据失效，
//! 失效票据带回的结果一律丢弃。

use chess_ai::Selection;
use protocol::{
    ChessError, ChessMove, GameSnapshot, GameState, HistoryEntry, MoveSpec, Position, Side,
    HUMAN_POLICY,
};
use tracing::{debug, info, warn};

use crate::error::ArenaError;

/// 一次走法求解的凭证
#[derive(Debug, Clone)]
pub struct TurnTicket {
    /// 领取时的纪元
    pub epoch: u64,
    /// 领取时的半回合数
    pub ply: usize,
    /// 走子方
    pub side: Side,
    /// 领取时的局面
    pub position: Position,
}

/// 对局状态机
#[derive(Debug, Clone, Default)]
pub struct GameCore {
    position: Position,
    state: GameState,
    history: Vec<HistoryEntry>,
    last_error: Option<String>,
    status: String,
    /// 是否有走法正在求解
    in_flight: bool,
    /// 每次取消未完成的求解时递增
    epoch: u64,
}

impl GameCore {
    /// 标准初始局面，未开始
    pub fn new() -> Self {
        Self::default()
    }

    /// 从指定局面开始（重置后仍回到标准初始局面）
    pub fn from_position(position: Position) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// 开始或继续对局
    ///
    /// `credential_ready` 表示所有远程席位都已具备访问凭据。
    pub fn start(&mut self, credential_ready: bool) -> Result<(), ArenaError> {
        if !matches!(self.state, GameState::Idle | GameState::Paused) {
            return Err(ArenaError::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }
        if !credential_ready {
            return Err(ArenaError::MissingCredential);
        }

        let action = if self.state == GameState::Idle {
            "started"
        } else {
            "resumed"
        };
        info!("Game {} at ply {}", action, self.position.ply());
        self.state = GameState::Playing;
        self.last_error = None;
        Ok(())
    }

    /// 暂停，保留局面和历史
    pub fn pause(&mut self) -> Result<(), ArenaError> {
        if self.state != GameState::Playing {
            return Err(ArenaError::InvalidTransition {
                action: "pause",
                state: self.state,
            });
        }

        self.cancel_in_flight();
        self.state = GameState::Paused;
        info!("Game paused at ply {}", self.position.ply());
        Ok(())
    }

    /// 回到标准初始局面，清空历史
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.position = Position::initial();
        self.state = GameState::Idle;
        self.history.clear();
        self.last_error = None;
        self.status.clear();
        info!("Game reset");
    }

    /// 领取一次求解凭证
    ///
    /// 对局未进行或已有求解时返回 `None`；局面已终局时结束对局并返回 `None`。
    pub fn begin_turn(&mut self) -> Option<TurnTicket> {
        if self.state != GameState::Playing || self.in_flight {
            return None;
        }
        if self.position.is_game_over() {
            self.finish();
            return None;
        }

        self.in_flight = true;
        Some(TurnTicket {
            epoch: self.epoch,
            ply: self.position.ply(),
            side: self.position.side_to_move(),
            position: self.position.clone(),
        })
    }

    /// 凭证是否仍然有效
    pub fn is_current(&self, ticket: &TurnTicket) -> bool {
        self.in_flight && ticket.epoch == self.epoch && ticket.ply == self.position.ply()
    }

    /// 交回求解结果
    ///
    /// 成功时返回新增的历史记录；求解失败时对局暂停并返回 `Ok(None)`；
    /// 凭证失效时返回 `StaleResolution`，状态不变。
    pub fn complete_turn(
        &mut self,
        ticket: TurnTicket,
        policy: &str,
        result: Result<Selection, ArenaError>,
    ) -> Result<Option<HistoryEntry>, ArenaError> {
        if !self.is_current(&ticket) {
            return Err(ArenaError::StaleResolution { ply: ticket.ply });
        }
        self.in_flight = false;

        let applied =
            result.and_then(|selection| self.apply(&selection.mv, policy).map_err(ArenaError::from));

        match applied {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                self.fail(&err);
                Ok(None)
            }
        }
    }

    /// 人类走子，只在对局进行中接受
    ///
    /// 正在进行的求解随之作废。
    pub fn submit_user_move(&mut self, spec: &MoveSpec) -> bool {
        if self.state != GameState::Playing {
            debug!("Ignoring user move {} while {}", spec, self.state);
            return false;
        }
        let Some(mv) = self.position.find_move(spec) else {
            debug!("User move {} is not legal", spec);
            return false;
        };

        match self.apply(&mv, HUMAN_POLICY) {
            Ok(_) => {
                self.cancel_in_flight();
                true
            }
            Err(err) => {
                warn!("User move {} failed: {}", spec, err);
                false
            }
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            fen: self.position.to_fen(),
            state: self.state,
            side_to_move: self.position.side_to_move(),
            thinking: self.in_flight,
            last_error: self.last_error.clone(),
            status: self.status.clone(),
            outcome: self.position.outcome(),
            history: self.history.clone(),
        }
    }

    fn apply(&mut self, mv: &ChessMove, policy: &str) -> Result<HistoryEntry, ChessError> {
        let side = self.position.side_to_move();
        let next = self.position.play(mv)?;

        let entry = HistoryEntry::new(self.history.len() as u32 + 1, side, policy, mv.san());
        self.position = next;
        self.history.push(entry.clone());

        if self.position.is_game_over() {
            self.finish();
        }
        Ok(entry)
    }

    fn finish(&mut self) {
        self.cancel_in_flight();
        self.state = GameState::Finished;
        self.status = self.position.outcome().status_text();
        info!("Game finished: {}", self.status);
    }

    fn fail(&mut self, err: &ArenaError) {
        warn!("Turn failed, pausing: {}", err);
        self.state = GameState::Paused;
        self.last_error = Some(format!("Error: {}", err));
    }

    fn cancel_in_flight(&mut self) {
        if self.in_flight {
            debug!("Cancelling outstanding selection (epoch {})", self.epoch);
        }
        self.in_flight = false;
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_ai::{MoveSelector, SelectorConfig};
    use protocol::{Outcome, INITIAL_FEN};

    fn select(ticket: &TurnTicket, proposal: Option<&str>) -> Result<Selection, ArenaError> {
        MoveSelector::seeded(SelectorConfig::default(), 1)
            .select(&ticket.position, ticket.side, proposal)
            .map_err(ArenaError::from)
    }

    fn user_move(core: &mut GameCore, from: &str, to: &str) -> bool {
        core.submit_user_move(&MoveSpec::parse(from, to, None).unwrap())
    }

    fn playing() -> GameCore {
        let mut core = GameCore::new();
        core.start(true).unwrap();
        core
    }

    #[test]
    fn test_start_requires_credential() {
        let mut core = GameCore::new();
        assert_eq!(core.start(false), Err(ArenaError::MissingCredential));
        assert_eq!(core.state(), GameState::Idle);

        core.start(true).unwrap();
        assert_eq!(core.state(), GameState::Playing);
        assert!(matches!(
            core.start(true),
            Err(ArenaError::InvalidTransition { action: "start", .. })
        ));
    }

    #[test]
    fn test_pause_only_while_playing() {
        let mut core = GameCore::new();
        assert_eq!(
            core.pause(),
            Err(ArenaError::InvalidTransition {
                action: "pause",
                state: GameState::Idle
            })
        );

        core.start(true).unwrap();
        core.pause().unwrap();
        assert_eq!(core.state(), GameState::Paused);
        assert!(core.pause().is_err());
    }

    #[test]
    fn test_turn_applies_move() {
        let mut core = playing();
        let ticket = core.begin_turn().unwrap();
        assert_eq!(ticket.side, Side::White);
        assert!(core.snapshot().thinking);

        let selection = select(&ticket, Some("e4"));
        let entry = core
            .complete_turn(ticket, "model-a", selection)
            .unwrap()
            .unwrap();

        assert_eq!(entry.ply, 1);
        assert_eq!(entry.to_string(), "White (model-a): e4");
        assert!(!core.in_flight());
        assert_eq!(core.position().side_to_move(), Side::Black);
        assert_eq!(core.history().len(), 1);
    }

    #[test]
    fn test_single_turn_in_flight() {
        let mut core = playing();
        let ticket = core.begin_turn().unwrap();
        assert!(core.begin_turn().is_none());

        let selection = select(&ticket, None);
        core.complete_turn(ticket, "local", selection).unwrap();
        assert!(core.begin_turn().is_some());
    }

    #[test]
    fn test_no_turn_unless_playing() {
        let mut core = GameCore::new();
        assert!(core.begin_turn().is_none());

        core.start(true).unwrap();
        core.pause().unwrap();
        assert!(core.begin_turn().is_none());
    }

    #[test]
    fn test_stale_after_pause_and_reset() {
        let mut core = playing();
        let ticket = core.begin_turn().unwrap();
        core.pause().unwrap();

        let selection = select(&ticket, Some("e4"));
        assert_eq!(
            core.complete_turn(ticket, "model", selection),
            Err(ArenaError::StaleResolution { ply: 0 })
        );
        assert!(core.history().is_empty());

        core.start(true).unwrap();
        let ticket = core.begin_turn().unwrap();
        core.reset();
        let selection = select(&ticket, Some("e4"));
        assert!(core.complete_turn(ticket, "model", selection).is_err());
        assert_eq!(core.state(), GameState::Idle);
        assert_eq!(core.position().to_fen(), INITIAL_FEN);
    }

    #[test]
    fn test_failure_pauses_and_resumes() {
        let mut core = playing();
        let ticket = core.begin_turn().unwrap();
        let failure = Err(ArenaError::ProposalFailure("rate limited".to_string()));

        assert_eq!(core.complete_turn(ticket, "model", failure), Ok(None));
        assert_eq!(core.state(), GameState::Paused);
        assert_eq!(core.last_error(), Some("Error: rate limited"));
        assert!(!core.in_flight());

        core.start(true).unwrap();
        assert_eq!(core.last_error(), None);
        assert!(core.begin_turn().is_some());
    }

    #[test]
    fn test_no_legal_moves_pauses() {
        let mut core = playing();
        let ticket = core.begin_turn().unwrap();
        let failure = Err(ArenaError::Chess(ChessError::NoLegalMoves));
        core.complete_turn(ticket, "model", failure).unwrap();
        assert_eq!(core.state(), GameState::Paused);
    }

    #[test]
    fn test_fools_mate_by_user_moves() {
        let mut core = playing();
        assert!(user_move(&mut core, "f2", "f3"));
        assert!(user_move(&mut core, "e7", "e5"));
        assert!(user_move(&mut core, "g2", "g4"));
        assert!(user_move(&mut core, "d8", "h4"));

        let snapshot = core.snapshot();
        assert_eq!(snapshot.state, GameState::Finished);
        assert_eq!(
            snapshot.outcome,
            Outcome::Checkmate {
                winner: Side::Black
            }
        );
        assert_eq!(snapshot.status, "Checkmate! Black wins!");
        assert_eq!(snapshot.history.len(), 4);
        assert_eq!(snapshot.history[3].notation, "Qh4#");
        assert!(snapshot.history.iter().all(|e| e.policy == HUMAN_POLICY));

        assert!(core.pause().is_err());
        assert!(core.begin_turn().is_none());
    }

    #[test]
    fn test_reset_from_finished() {
        let mut core = playing();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            user_move(&mut core, from, to);
        }
        assert_eq!(core.state(), GameState::Finished);

        core.reset();
        let snapshot = core.snapshot();
        assert_eq!(snapshot.state, GameState::Idle);
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.fen, INITIAL_FEN);
        assert!(snapshot.status.is_empty());
    }

    #[test]
    fn test_user_move_rules() {
        let mut core = GameCore::new();
        assert!(!user_move(&mut core, "e2", "e4"));

        core.start(true).unwrap();
        assert!(!user_move(&mut core, "e2", "e5"));
        assert!(user_move(&mut core, "e2", "e4"));
        assert_eq!(core.history()[0].notation, "e4");
    }

    #[test]
    fn test_user_move_invalidates_pending_turn() {
        let mut core = playing();
        let ticket = core.begin_turn().unwrap();
        assert!(user_move(&mut core, "d2", "d4"));

        let selection = select(&ticket, Some("e4"));
        assert!(matches!(
            core.complete_turn(ticket, "model", selection),
            Err(ArenaError::StaleResolution { .. })
        ));
        assert_eq!(core.history().len(), 1);
    }

    #[test]
    fn test_terminal_position_finishes_without_move() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut core = GameCore::from_position(position);
        core.start(true).unwrap();

        assert!(core.begin_turn().is_none());
        assert_eq!(core.state(), GameState::Finished);
        assert_eq!(core.snapshot().status, "Game Over - Stalemate");
        assert!(core.history().is_empty());
    }
}
