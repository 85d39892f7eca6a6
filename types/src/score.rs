//! Scores, decision outcomes and the counters the player is judged on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Approve,
    Reject,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one decision against the card it was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Clean card approved.
    Approved,
    /// Flawed card rejected.
    Caught,
    /// Clean card rejected.
    FalsePositive,
    /// Flawed card approved.
    Missed,
}

impl Verdict {
    #[must_use]
    pub fn classify(action: Action, card: &Card) -> Self {
        match (action, card.has_error()) {
            (Action::Approve, false) => Self::Approved,
            (Action::Reject, true) => Self::Caught,
            (Action::Reject, false) => Self::FalsePositive,
            (Action::Approve, true) => Self::Missed,
        }
    }

    #[must_use]
    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Approved | Self::Caught)
    }
}

/// Trust and cognitive load.
///
/// Trust is capped at [`ScoreState::MAX_TRUST`] but has no floor, so it may
/// go negative. Load is clamped to `0..=MAX_LOAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
    pub trust_score: i32,
    pub cognitive_load: i32,
}

impl ScoreState {
    pub const MAX_TRUST: i32 = 100;
    pub const MAX_LOAD: i32 = 100;

    /// Whether either resource has crossed its loss threshold.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.trust_score <= 0 || self.cognitive_load >= Self::MAX_LOAD
    }
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            trust_score: Self::MAX_TRUST,
            cognitive_load: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub processed: u32,
    pub caught_errors: u32,
    pub false_positives: u32,
    pub missed_errors: u32,
}

impl Stats {
    pub fn record(&mut self, verdict: Verdict) {
        self.processed = self.processed.saturating_add(1);
        let counter = match verdict {
            Verdict::Approved => return,
            Verdict::Caught => &mut self.caught_errors,
            Verdict::FalsePositive => &mut self.false_positives,
            Verdict::Missed => &mut self.missed_errors,
        };
        *counter = counter.saturating_add(1);
    }
}
