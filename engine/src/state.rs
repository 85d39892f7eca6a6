//! Game state machine.
//!
//! [`GameState`] is an explicit state object; every input (player command or
//! timer tick) is an [`Event`] applied through [`GameState::apply`]. The only
//! side effects are the returned [`Command`]s, which tell the runtime to arm
//! or disarm the spawn timer. Given the same card source, the same event
//! sequence always yields the same state.
//!
//! # State Machine
//! ```text
//! ┌──────┐ Start ┌──────────┐ ConfirmBriefing ┌─────────┐
//! │ Idle │ ────> │ Briefing │ ──────────────> │ Playing │ <──────────────┐
//! └──────┘       └──────────┘                 └─────────┘                │
//!                                   target decided │    │ loss           │
//!                                                  v    v                │
//!                                ┌──────────────┐  ┌──────────┐          │
//!                                │ RoundResults │  │ GameOver │ ─────────┤ Restart
//!                                └──────────────┘  └──────────┘          │
//!                                  │ Acknowledge        ^                │
//!                                  v                    │ no next round  │
//!                                ┌─────────────────┐ ───┘                │
//!                                │ RoundTransition │ ────────────────────┘
//!                                └─────────────────┘   AdvanceRound
//! ```
//!
//! # Round completion
//!
//! Spawning for a non-final round stops once the round's target has been
//! spawned. The round completes when the same number of cards has been
//! decided, i.e. when the backlog is drained. Both the decision path and the
//! spawn path check for completion.
//!
//! # Loss check
//!
//! Evaluated right after each decision's score update and before round
//! completion, so a decision that both finishes a round and loses the game
//! ends the game. [`LossCheck`] selects which score the check reads.

use serde::Deserialize;
use tracing::{debug, info};

use rubberstamp_types::{Action, CardId, GamePhase, RoundId, ScoreState, Stats};

use crate::generator::CardSource;
use crate::queue::DecisionQueue;
use crate::scheduler::{SpawnRequest, SpawnScheduler, SpawnTicket};
use crate::scoring::{DecisionOutcome, ScoringEngine};
use crate::snapshot::GameSnapshot;

/// Which score the loss condition is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossCheck {
    /// Post-decision score. A decision that crosses a threshold ends the game
    /// on that same decision.
    #[default]
    Immediate,
    /// Pre-decision score. The game ends on the first decision made after a
    /// threshold was crossed, one decision late.
    Lagged,
}

impl LossCheck {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Lagged => "lagged",
        }
    }

    #[must_use]
    pub fn is_lost(self, outcome: &DecisionOutcome) -> bool {
        match self {
            Self::Immediate => outcome.after.is_lost(),
            Self::Lagged => outcome.before.is_lost(),
        }
    }
}

/// Tunables that do not change the rules of a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    /// Multiplier applied to every spawn delay.
    pub pace: f64,
    pub loss_check: LossCheck,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            pace: 1.0,
            loss_check: LossCheck::Immediate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    ConfirmBriefing,
    Decide { card: CardId, action: Action },
    AcknowledgeRoundResult,
    AdvanceRound,
    Restart,
    SpawnTick(SpawnTicket),
}

/// Timer instruction for the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Arm(SpawnRequest),
    Disarm(SpawnTicket),
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) phase: GamePhase,
    pub(crate) round: RoundId,
    pub(crate) queue: DecisionQueue,
    pub(crate) scoring: ScoringEngine,
    pub(crate) scheduler: SpawnScheduler,
    /// Cards spawned since the game (not the round) began.
    pub(crate) spawned_total: u64,
    /// Never reset, so ids stay unique across restarts.
    pub(crate) next_card_id: u64,
    pub(crate) loss_check: LossCheck,
    pub(crate) last_decision: Option<DecisionOutcome>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl GameState {
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        Self {
            phase: GamePhase::Idle,
            round: RoundId::FIRST,
            queue: DecisionQueue::new(),
            scoring: ScoringEngine::new(),
            scheduler: SpawnScheduler::new(rules.pace),
            spawned_total: 0,
            next_card_id: 1,
            loss_check: rules.loss_check,
            last_decision: None,
        }
    }

    /// By-value form of [`GameState::apply`].
    pub fn reduce<S>(mut self, event: Event, cards: &mut S) -> (Self, Vec<Command>)
    where
        S: CardSource + ?Sized,
    {
        let commands = self.apply(event, cards);
        (self, commands)
    }

    /// Apply one event. Events whose precondition does not hold are ignored.
    pub fn apply<S>(&mut self, event: Event, cards: &mut S) -> Vec<Command>
    where
        S: CardSource + ?Sized,
    {
        let mut commands = Vec::new();
        let handled = match (self.phase, event) {
            (GamePhase::Idle, Event::Start) => {
                self.phase = GamePhase::Briefing;
                info!("Briefing opened");
                true
            }
            (GamePhase::Briefing, Event::ConfirmBriefing)
            | (GamePhase::GameOver, Event::Restart) => {
                self.begin_game(&mut commands);
                true
            }
            (GamePhase::Playing, Event::Decide { card, action }) => {
                self.decide(card, action, &mut commands)
            }
            (GamePhase::Playing, Event::SpawnTick(ticket)) => {
                self.spawn(ticket, cards, &mut commands)
            }
            (GamePhase::RoundResults, Event::AcknowledgeRoundResult) => {
                self.phase = GamePhase::RoundTransition;
                true
            }
            (GamePhase::RoundTransition, Event::AdvanceRound) => {
                match self.round.next() {
                    Some(next) => self.begin_round(next, &mut commands),
                    None => self.end_game(&mut commands),
                }
                true
            }
            _ => false,
        };

        if !handled {
            debug!(?event, phase = %self.phase, "Event ignored");
        }
        commands
    }

    fn begin_game(&mut self, commands: &mut Vec<Command>) {
        self.scoring.reset_game();
        self.spawned_total = 0;
        info!("Simulation started");
        self.begin_round(RoundId::FIRST, commands);
    }

    fn begin_round(&mut self, round: RoundId, commands: &mut Vec<Command>) {
        self.disarm(commands);
        self.round = round;
        self.queue.clear();
        self.scoring.reset_round();
        self.scheduler.reset_round();
        self.last_decision = None;
        self.phase = GamePhase::Playing;

        let config = round.config();
        info!(
            round = %round,
            agents = config.agent_count,
            interval_ms = config.spawn_interval_ms,
            title = config.title,
            "Round started"
        );
        commands.push(Command::Arm(self.scheduler.arm(config)));
    }

    fn decide(&mut self, card: CardId, action: Action, commands: &mut Vec<Command>) -> bool {
        if self.queue.head().is_none_or(|head| head.id != card) {
            return false;
        }
        let Some(card) = self.queue.pop_head() else {
            return false;
        };

        let outcome = self.scoring.decide(&card, action);
        self.last_decision = Some(outcome);
        debug!(
            card = %card.id,
            %action,
            verdict = ?outcome.verdict,
            trust = outcome.after.trust_score,
            load = outcome.after.cognitive_load,
            backlog = self.queue.len(),
            "Decision applied"
        );

        if self.loss_check.is_lost(&outcome) {
            self.end_game(commands);
        } else {
            self.complete_round_if_decided(commands);
        }
        true
    }

    fn spawn<S>(&mut self, ticket: SpawnTicket, cards: &mut S, commands: &mut Vec<Command>) -> bool
    where
        S: CardSource + ?Sized,
    {
        if !self.scheduler.accept(ticket) {
            debug!(%ticket, "Stale spawn tick");
            return false;
        }

        let config = self.round.config();
        if !self.scheduler.wants_card(config) {
            debug!(round = %self.round, "Round target spawned, spawning stopped");
            self.complete_round_if_decided(commands);
            return true;
        }

        let id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        let card = cards.next_card(id, self.spawned_total);
        self.spawned_total += 1;
        self.scheduler.record_spawn();
        debug!(
            card = %card.id,
            error = ?card.error,
            backlog = self.queue.len() + 1,
            "Card spawned"
        );
        self.queue.push(card);

        commands.push(Command::Arm(self.scheduler.arm(config)));
        true
    }

    fn complete_round_if_decided(&mut self, commands: &mut Vec<Command>) {
        let config = self.round.config();
        if config.target_reached(self.scoring.round_stats.processed) {
            self.disarm(commands);
            self.phase = GamePhase::RoundResults;
            info!(round = %self.round, stats = ?self.scoring.round_stats, "Round complete");
        }
    }

    fn end_game(&mut self, commands: &mut Vec<Command>) {
        self.disarm(commands);
        self.phase = GamePhase::GameOver;
        info!(
            round = %self.round,
            trust = self.scoring.score.trust_score,
            load = self.scoring.score.cognitive_load,
            stats = ?self.scoring.stats,
            "Simulation ended"
        );
    }

    fn disarm(&mut self, commands: &mut Vec<Command>) {
        if let Some(ticket) = self.scheduler.disarm() {
            commands.push(Command::Disarm(ticket));
        }
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> RoundId {
        self.round
    }

    #[must_use]
    pub fn queue(&self) -> &DecisionQueue {
        &self.queue
    }

    #[must_use]
    pub fn score(&self) -> ScoreState {
        self.scoring.score()
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.scoring.stats()
    }

    #[must_use]
    pub fn round_stats(&self) -> Stats {
        self.scoring.round_stats()
    }

    #[must_use]
    pub fn loss_check(&self) -> LossCheck {
        self.loss_check
    }

    #[must_use]
    pub fn last_decision(&self) -> Option<&DecisionOutcome> {
        self.last_decision.as_ref()
    }

    #[must_use]
    pub fn is_spawn_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }
}
