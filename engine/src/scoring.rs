//! Trust, cognitive load and decision statistics.

use rubberstamp_types::{Action, Card, CardId, ScoreState, Stats, Verdict};

pub const CORRECT_TRUST_GAIN: i32 = 2;
pub const CORRECT_LOAD_RELIEF: i32 = 5;
pub const INCORRECT_TRUST_PENALTY: i32 = 15;
pub const INCORRECT_LOAD_PENALTY: i32 = 15;

/// Score after one decision. Trust is capped but never floored; load is
/// clamped on both ends.
#[must_use]
pub fn apply_verdict(score: ScoreState, verdict: Verdict) -> ScoreState {
    if verdict.is_correct() {
        ScoreState {
            trust_score: (score.trust_score + CORRECT_TRUST_GAIN).min(ScoreState::MAX_TRUST),
            cognitive_load: (score.cognitive_load - CORRECT_LOAD_RELIEF).max(0),
        }
    } else {
        ScoreState {
            trust_score: score.trust_score - INCORRECT_TRUST_PENALTY,
            cognitive_load: (score.cognitive_load + INCORRECT_LOAD_PENALTY)
                .min(ScoreState::MAX_LOAD),
        }
    }
}

/// Result of applying one decision, with the score on both sides of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub card: CardId,
    pub action: Action,
    pub verdict: Verdict,
    pub before: ScoreState,
    pub after: ScoreState,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    pub(crate) score: ScoreState,
    pub(crate) stats: Stats,
    pub(crate) round_stats: Stats,
}

impl ScoringEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Full-game reset: scores and both stat sets.
    pub fn reset_game(&mut self) {
        *self = Self::default();
    }

    /// Round reset: per-round stats only.
    pub fn reset_round(&mut self) {
        self.round_stats = Stats::default();
    }

    pub fn decide(&mut self, card: &Card, action: Action) -> DecisionOutcome {
        let verdict = Verdict::classify(action, card);
        let before = self.score;
        self.score = apply_verdict(before, verdict);
        self.stats.record(verdict);
        self.round_stats.record(verdict);
        DecisionOutcome {
            card: card.id,
            action,
            verdict,
            before,
            after: self.score,
        }
    }

    #[must_use]
    pub fn score(&self) -> ScoreState {
        self.score
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    #[must_use]
    pub fn round_stats(&self) -> Stats {
        self.round_stats
    }
}
