//! 走法选择器
//!
//! 两种选择策略：
//! - 外部提议 + 校验：提议必须是合法走法，不能导致和棋，也不能丢子超过容差
//! - 启发式 Top-K：对所有合法走法打分，从前 K 名中随机选一个

use protocol::{ChessError, ChessMove, Position, Side};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::evaluate::Evaluator;
use crate::parser::ProposalParser;

/// 提议被拒绝后的后备方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// 合法走法列表中的第一个
    #[default]
    FirstLegal,
    /// 启发式 Top-K
    Heuristic,
}

/// 选择器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// 启发式候选数量
    pub top_k: usize,
    /// 允许的子力评估下降幅度（计入对方一步吃子）
    pub material_slack: f64,
    pub fallback: Fallback,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            material_slack: 3.0,
            fallback: Fallback::FirstLegal,
        }
    }
}

/// 带评分的走法
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMove {
    pub mv: ChessMove,
    /// 走后局面从选择方视角的评估值
    pub score: f64,
    /// 在合法走法列表中的原始序号
    pub index: usize,
}

/// 提议被拒绝的原因
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("proposal is empty or unreadable")]
    Unreadable,

    #[error("'{text}' is not a legal move")]
    NotLegal { text: String },

    #[error("{san} leads to a draw")]
    LeadsToDraw { san: String },

    #[error("{san} drops the material evaluation from {before:.2} to {after:.2}")]
    LosesMaterial { san: String, before: f64, after: f64 },
}

/// 对外部提议的判定
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(ChessMove),
    Rejected(Rejection),
}

/// 走法来源
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSource {
    /// 外部提议通过校验
    Proposal,
    /// 外部提议被拒绝，使用后备走法
    Fallback(Rejection),
    /// 启发式选择，`rank` 为评分排名（0 为最高）
    Heuristic { rank: usize },
}

/// 选择结果
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub mv: ChessMove,
    pub source: SelectionSource,
}

/// 走法选择器
pub struct MoveSelector<R = ChaCha8Rng> {
    config: SelectorConfig,
    rng: R,
}

impl MoveSelector<ChaCha8Rng> {
    /// 使用系统熵初始化随机数
    pub fn new(config: SelectorConfig) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// 使用固定种子，结果可复现
    pub fn seeded(config: SelectorConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for MoveSelector<ChaCha8Rng> {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

impl<R: Rng> MoveSelector<R> {
    pub fn with_rng(config: SelectorConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// 为 `side` 选择一个走法
    ///
    /// 有提议时走校验流程，否则走启发式流程。只有无合法走法时才返回错误。
    pub fn select(
        &mut self,
        position: &Position,
        side: Side,
        proposal: Option<&str>,
    ) -> Result<Selection, ChessError> {
        let legal = position.legal_moves();
        let first = legal.first().cloned().ok_or(ChessError::NoLegalMoves)?;

        if side != position.side_to_move() {
            warn!(
                "Selecting for {} but {} is to move",
                side,
                position.side_to_move()
            );
        }

        let proposal = match proposal {
            Some(text) => text,
            None => return self.select_heuristic(position, side),
        };

        match self.judge_proposal(position, side, proposal) {
            Verdict::Accepted(mv) => {
                debug!("Proposal accepted: {}", mv);
                Ok(Selection {
                    mv,
                    source: SelectionSource::Proposal,
                })
            }
            Verdict::Rejected(rejection) => {
                warn!("Proposal rejected ({}), using fallback", rejection);
                let mv = match self.config.fallback {
                    Fallback::FirstLegal => first,
                    Fallback::Heuristic => self.select_heuristic(position, side)?.mv,
                };
                Ok(Selection {
                    mv,
                    source: SelectionSource::Fallback(rejection),
                })
            }
        }
    }

    /// 判定外部提议
    ///
    /// 按优先级查找第一个合法的候选记号并只判定这一个走法；
    /// 没有合法候选时拒绝为 `NotLegal`。
    pub fn judge_proposal(&self, position: &Position, side: Side, proposal: &str) -> Verdict {
        let candidates = ProposalParser::candidates(&ProposalParser::clean_response(proposal));
        let Some(head) = candidates.first() else {
            return Verdict::Rejected(Rejection::Unreadable);
        };

        let Some(mv) = candidates
            .iter()
            .find_map(|candidate| position.find_notation(candidate))
        else {
            return Verdict::Rejected(Rejection::NotLegal { text: head.clone() });
        };

        let after = match position.play(&mv) {
            Ok(after) => after,
            Err(_) => return Verdict::Rejected(Rejection::NotLegal { text: head.clone() }),
        };

        if after.is_draw() {
            return Verdict::Rejected(Rejection::LeadsToDraw {
                san: mv.san().to_string(),
            });
        }

        let before = Self::material_at_stake(position, side);
        let score = Evaluator::material_after_captures(&after, side);
        if score < before - self.config.material_slack {
            return Verdict::Rejected(Rejection::LosesMaterial {
                san: mv.san().to_string(),
                before,
                after: score,
            });
        }

        Verdict::Accepted(mv)
    }

    /// 走子前的子力基准：假设己方空着，对方立即吃子的最坏结果
    ///
    /// 已经悬着的子不算在这一步的损失里。被将军时没有空着，取静态子力。
    fn material_at_stake(position: &Position, side: Side) -> f64 {
        match position.pass() {
            Some(passed) => Evaluator::material_after_captures(&passed, side),
            None => Evaluator::evaluate_material(position, side),
        }
    }

    /// 启发式 Top-K 选择
    pub fn select_heuristic(
        &mut self,
        position: &Position,
        side: Side,
    ) -> Result<Selection, ChessError> {
        let scored = Self::score_moves(position, side);
        let best = scored.first().ok_or(ChessError::NoLegalMoves)?;

        let k = self.config.top_k.clamp(1, scored.len());
        let rank = self.rng.gen_range(0..k);
        let chosen = &scored[rank];

        // 再次确认所选记号仍在合法列表中
        if position.find_notation(chosen.mv.san()).is_some() {
            debug!(
                "Heuristic picked {} (rank {}, score {:.2})",
                chosen.mv, rank, chosen.score
            );
            Ok(Selection {
                mv: chosen.mv.clone(),
                source: SelectionSource::Heuristic { rank },
            })
        } else {
            warn!("Heuristic pick {} not found in legal list", chosen.mv);
            Ok(Selection {
                mv: best.mv.clone(),
                source: SelectionSource::Heuristic { rank: 0 },
            })
        }
    }

    /// 对所有合法走法打分，按分数降序排列（同分保持枚举顺序）
    pub fn score_moves(position: &Position, side: Side) -> Vec<ScoredMove> {
        let mut scored: Vec<ScoredMove> = position
            .legal_moves()
            .into_iter()
            .enumerate()
            .filter_map(|(index, mv)| {
                let after = position.play(&mv).ok()?;
                Some(ScoredMove {
                    score: Evaluator::evaluate(&after, side),
                    mv,
                    index,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_all(moves: &[&str]) -> Position {
        moves
            .iter()
            .fold(Position::initial(), |p, san| p.play_notation(san).unwrap())
    }

    fn selector(seed: u64) -> MoveSelector {
        MoveSelector::seeded(SelectorConfig::default(), seed)
    }

    #[test]
    fn test_garbage_falls_back_to_first_legal() {
        let position = Position::initial();
        let selection = selector(1)
            .select(&position, Side::White, Some("zz9"))
            .unwrap();
        assert_eq!(selection.mv, position.legal_moves()[0]);
        assert_eq!(
            selection.source,
            SelectionSource::Fallback(Rejection::NotLegal {
                text: "zz9".to_string()
            })
        );
    }

    #[test]
    fn test_empty_proposal_is_unreadable() {
        let position = Position::initial();
        let judge = selector(1);
        assert_eq!(
            judge.judge_proposal(&position, Side::White, "  \n "),
            Verdict::Rejected(Rejection::Unreadable)
        );
    }

    #[test]
    fn test_good_proposal_accepted() {
        let position = Position::initial();
        let selection = selector(1)
            .select(&position, Side::White, Some("1. e4"))
            .unwrap();
        assert_eq!(selection.mv.san(), "e4");
        assert_eq!(selection.source, SelectionSource::Proposal);
    }

    #[test]
    fn test_proposal_case_insensitive() {
        let position = Position::initial();
        let judge = selector(1);
        match judge.judge_proposal(&position, Side::White, "NF3") {
            Verdict::Accepted(mv) => assert_eq!(mv.san(), "Nf3"),
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_hanging_queen_rejected() {
        // 1.e4 d5 之后 Qg4 把后送给 c8 象
        let position = play_all(&["e4", "d5"]);
        let judge = selector(1);
        match judge.judge_proposal(&position, Side::White, "Qg4") {
            Verdict::Rejected(Rejection::LosesMaterial { san, before, after }) => {
                assert_eq!(san, "Qg4");
                assert!(after < before - 3.0);
            }
            other => panic!("unexpected verdict: {:?}", other),
        }

        let selection = selector(2)
            .select(&position, Side::White, Some("Qg4"))
            .unwrap();
        assert_eq!(selection.mv, position.legal_moves()[0]);
        assert!(matches!(
            selection.source,
            SelectionSource::Fallback(Rejection::LosesMaterial { .. })
        ));
    }

    #[test]
    fn test_hanging_rook_rejected() {
        let position = Position::from_fen("4k3/8/8/7R/8/2n5/8/4K3 w - - 0 1").unwrap();
        let judge = selector(1);
        assert!(matches!(
            judge.judge_proposal(&position, Side::White, "Rb5"),
            Verdict::Rejected(Rejection::LosesMaterial { .. })
        ));
        assert!(matches!(
            judge.judge_proposal(&position, Side::White, "Rh7"),
            Verdict::Accepted(_)
        ));
    }

    #[test]
    fn test_quiet_moves_accepted() {
        // 意大利开局，e4 兵本来就悬着，不算在任何一步头上
        let position = play_all(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6"]);
        let judge = selector(1);
        for proposal in ["O-O", "d3", "Nc3", "h3"] {
            match judge.judge_proposal(&position, Side::White, proposal) {
                Verdict::Accepted(mv) => assert_eq!(mv.san(), proposal),
                other => panic!("{proposal}: unexpected verdict: {:?}", other),
            }
        }
    }

    #[test]
    fn test_draw_proposal_rejected() {
        // 第三次回到初始局面
        let position = play_all(&["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"]);
        let judge = selector(1);
        assert_eq!(
            judge.judge_proposal(&position, Side::Black, "Ng8"),
            Verdict::Rejected(Rejection::LeadsToDraw {
                san: "Ng8".to_string()
            })
        );
    }

    #[test]
    fn test_first_legal_candidate_decides() {
        let position = play_all(&["e4", "d5"]);
        let judge = selector(1);
        // 第一个合法记号被拒绝后不再尝试后面的记号
        assert!(matches!(
            judge.judge_proposal(&position, Side::White, "Qg4 or Nf3"),
            Verdict::Rejected(Rejection::LosesMaterial { .. })
        ));
        // 非法的记号会被跳过
        match judge.judge_proposal(&position, Side::White, "I would play Nf3") {
            Verdict::Accepted(mv) => assert_eq!(mv.san(), "Nf3"),
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_heuristic_fallback() {
        let config = SelectorConfig {
            fallback: Fallback::Heuristic,
            ..SelectorConfig::default()
        };
        let position = play_all(&["e4", "d5"]);
        let scored = MoveSelector::<ChaCha8Rng>::score_moves(&position, Side::White);
        let top: Vec<_> = scored.iter().take(3).map(|s| s.mv.clone()).collect();

        let selection = MoveSelector::seeded(config, 7)
            .select(&position, Side::White, Some("Qg4"))
            .unwrap();
        assert!(top.contains(&selection.mv));
        assert!(matches!(
            selection.source,
            SelectionSource::Fallback(Rejection::LosesMaterial { .. })
        ));
    }

    #[test]
    fn test_score_moves_sorted_and_stable() {
        let position = Position::initial();
        let scored = MoveSelector::<ChaCha8Rng>::score_moves(&position, Side::White);
        assert_eq!(scored.len(), 20);
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].index < pair[1].index);
            }
        }
    }

    #[test]
    fn test_heuristic_rank_within_top_k() {
        let position = play_all(&["e4", "e5"]);
        let scored = MoveSelector::<ChaCha8Rng>::score_moves(&position, Side::White);
        for seed in 0..20 {
            let selection = selector(seed).select(&position, Side::White, None).unwrap();
            match selection.source {
                SelectionSource::Heuristic { rank } => {
                    assert!(rank <= 2);
                    assert_eq!(selection.mv, scored[rank].mv);
                }
                other => panic!("unexpected source: {:?}", other),
            }
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let position = Position::initial();
        let a = selector(42).select(&position, Side::White, None).unwrap();
        let b = selector(42).select(&position, Side::White, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_heuristic_playout_stays_legal() {
        let mut picker = selector(3);
        let mut position = Position::initial();
        for _ in 0..60 {
            if position.is_game_over() {
                break;
            }
            let side = position.side_to_move();
            let selection = picker.select(&position, side, None).unwrap();
            assert!(position.legal_moves().contains(&selection.mv));
            position = position.play(&selection.mv).unwrap();
        }
    }

    #[test]
    fn test_no_legal_moves() {
        let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut picker = selector(1);
        assert_eq!(
            picker.select(&position, Side::Black, None).unwrap_err(),
            ChessError::NoLegalMoves
        );
        assert_eq!(
            picker.select(&position, Side::Black, Some("Kh7")).unwrap_err(),
            ChessError::NoLegalMoves
        );
    }
}
