//! Static round table.
//!
//! Four rounds of escalating cadence. Rounds 1-3 end once their target card
//! count has been decided; round 4 has no target and runs until the player
//! loses.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One-based index into [`ROUNDS`]. Always refers to a configured round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RoundId(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("round {0} is not configured (expected 1..={max})", max = ROUNDS.len())]
pub struct UnknownRound(pub u8);

impl RoundId {
    pub const FIRST: RoundId = RoundId(1);

    pub fn new(id: u8) -> Result<Self, UnknownRound> {
        if id >= 1 && usize::from(id) <= ROUNDS.len() {
            Ok(Self(id))
        } else {
            Err(UnknownRound(id))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn config(self) -> &'static RoundConfig {
        &ROUNDS[usize::from(self.0 - 1)]
    }

    /// The round that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<RoundId> {
        self.0.checked_add(1).and_then(|id| Self::new(id).ok())
    }

    #[must_use]
    pub fn is_final(self) -> bool {
        self.next().is_none()
    }
}

impl TryFrom<u8> for RoundId {
    type Error = UnknownRound;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoundId> for u8 {
    fn from(value: RoundId) -> Self {
        value.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundConfig {
    pub id: RoundId,
    pub agent_count: u32,
    pub spawn_interval_ms: u64,
    /// `None` for the final round, which only ends on a loss.
    pub target_card_count: Option<u32>,
    pub title: &'static str,
    pub description: &'static str,
}

impl RoundConfig {
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Whether `count` cards satisfy this round's target. Always false for
    /// the final round.
    #[must_use]
    pub fn target_reached(&self, count: u32) -> bool {
        self.target_card_count.is_some_and(|target| count >= target)
    }
}

pub static ROUNDS: [RoundConfig; 4] = [
    RoundConfig {
        id: RoundId(1),
        agent_count: 2,
        spawn_interval_ms: 4000,
        target_card_count: Some(5),
        title: "Pilot Phase",
        description: "Initial deployment. Low volume.",
    },
    RoundConfig {
        id: RoundId(2),
        agent_count: 4,
        spawn_interval_ms: 2500,
        target_card_count: Some(7),
        title: "Scaling Up",
        description: "Doubling agent capacity.",
    },
    RoundConfig {
        id: RoundId(3),
        agent_count: 8,
        spawn_interval_ms: 1500,
        target_card_count: Some(7),
        title: "High Velocity",
        description: "Production load active.",
    },
    RoundConfig {
        id: RoundId(4),
        agent_count: 16,
        spawn_interval_ms: 1000,
        target_card_count: None,
        title: "Full Autonomy",
        description: "Maximum throughput.",
    },
];
