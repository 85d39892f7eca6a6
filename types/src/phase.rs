use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of one simulation.
///
/// ```text
/// Idle -> Briefing -> Playing -> RoundResults -> RoundTransition -> Playing ...
///                        |                             |
///                        +-----------> GameOver <------+ (no next round)
/// ```
///
/// `GameOver` is terminal until a restart re-enters `Playing` at round 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    #[default]
    Idle,
    Briefing,
    Playing,
    RoundResults,
    RoundTransition,
    #[serde(rename = "gameover")]
    GameOver,
}

impl GamePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Briefing => "briefing",
            Self::Playing => "playing",
            Self::RoundResults => "round-results",
            Self::RoundTransition => "round-transition",
            Self::GameOver => "gameover",
        }
    }

    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::GamePhase;

    #[test]
    fn serde_names_match_display() {
        for phase in [
            GamePhase::Idle,
            GamePhase::Briefing,
            GamePhase::Playing,
            GamePhase::RoundResults,
            GamePhase::RoundTransition,
            GamePhase::GameOver,
        ] {
            let json = serde_json::to_string(&phase).expect("serialize");
            assert_eq!(json, format!("\"{phase}\""));
        }
    }
}
