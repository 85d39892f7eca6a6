//! Read-only view of the engine for presentation layers.

use serde::Serialize;

use rubberstamp_types::{Card, GamePhase, RoundConfig, RoundId, Stats, Verdict};

use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub phase: GamePhase,
    #[serde(rename = "roundId")]
    pub round: RoundId,
    /// Backlog in decision order; the first card is the only actionable one.
    pub cards: Vec<Card>,
    pub trust_score: i32,
    pub cognitive_load: i32,
    pub stats: Stats,
    pub round_stats: Stats,
    #[serde(rename = "activeRoundConfig")]
    pub active_round: &'static RoundConfig,
    /// The round a transition screen is about to start, if any.
    pub next_round: Option<&'static RoundConfig>,
    pub spawned_in_round: u32,
    pub last_verdict: Option<Verdict>,
}

impl GameSnapshot {
    pub(crate) fn capture(state: &GameState) -> Self {
        let score = state.score();
        Self {
            phase: state.phase(),
            round: state.round(),
            cards: state.queue().iter().cloned().collect(),
            trust_score: score.trust_score,
            cognitive_load: score.cognitive_load,
            stats: state.stats(),
            round_stats: state.round_stats(),
            active_round: state.round().config(),
            next_round: state.round().next().map(RoundId::config),
            spawned_in_round: state.scheduler.spawned_in_round(),
            last_verdict: state.last_decision().map(|outcome| outcome.verdict),
        }
    }

    #[must_use]
    pub fn head(&self) -> Option<&Card> {
        self.cards.first()
    }
}
