//! Core engine for Rubberstamp - state machine and spawn orchestration.
//!
//! This crate contains the simulation without TUI dependencies. The pure
//! state machine lives in [`GameState`]; [`Engine`] wraps it with a card
//! source and the tokio-backed spawn timer, and is what front-ends drive.

mod config;
mod generator;
mod queue;
mod scheduler;
mod scoring;
mod snapshot;
mod state;


pub use config::{AppConfig, ConfigError, RubberstampConfig, SimulationConfig, config_path};
pub use generator::{
    BASE_ERROR_RATE, CardGenerator, CardSource, ERROR_RAMP_CARDS, ERROR_RATE_RAMP,
    error_probability,
};
pub use queue::DecisionQueue;
pub use scheduler::{FIRST_SPAWN_DELAY, SpawnRequest, SpawnScheduler, SpawnTicket, SpawnTimer};
pub use scoring::{
    CORRECT_LOAD_RELIEF, CORRECT_TRUST_GAIN, DecisionOutcome, INCORRECT_LOAD_PENALTY,
    INCORRECT_TRUST_PENALTY, ScoringEngine, apply_verdict,
};
pub use snapshot::GameSnapshot;
pub use state::{Command, Event, GameState, LossCheck, Rules};

pub use rubberstamp_types::{
    Action, Card, CardId, ErrorKind, GamePhase, ROUNDS, RoundConfig, RoundId, ScoreState, Stats,
    Verdict, ui::UiOptions,
};

// ============================================================================
// Engine - state machine plus timer runtime
// ============================================================================

/// Owns the game state, its card source and the spawn timer.
///
/// All mutation happens on the caller's thread: player commands apply
/// immediately, and fired timer ticks are applied by [`Engine::tick`].
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Engine<S = CardGenerator> {
    state: GameState,
    cards: S,
    timer: SpawnTimer,
    ui_options: UiOptions,
}

impl Engine<CardGenerator> {
    /// Build an engine from user configuration. Seeded when a seed is
    /// configured, random otherwise.
    #[must_use]
    pub fn from_config(config: Option<&RubberstampConfig>) -> Self {
        let default_config = RubberstampConfig::default();
        let config = config.unwrap_or(&default_config);
        let cards = match config.seed() {
            Some(seed) => {
                tracing::info!(seed, "Using seeded card stream");
                CardGenerator::seeded(seed)
            }
            None => CardGenerator::from_os_rng(),
        };
        let rules = config.rules();
        tracing::info!(
            pace = rules.pace,
            loss_check = rules.loss_check.as_str(),
            "Engine configured"
        );
        Self::new(cards, rules).with_ui_options(config.ui_options())
    }
}

impl<S: CardSource> Engine<S> {
    pub fn new(cards: S, rules: Rules) -> Self {
        Self {
            state: GameState::new(rules),
            cards,
            timer: SpawnTimer::new(),
            ui_options: UiOptions::default(),
        }
    }

    pub fn with_ui_options(mut self, options: UiOptions) -> Self {
        self.ui_options = options;
        self
    }

    /// Apply one event and carry out the timer commands it produced.
    pub fn dispatch(&mut self, event: Event) {
        let commands = self.state.apply(event, &mut self.cards);
        for command in commands {
            match command {
                Command::Arm(request) => {
                    tracing::debug!(
                        ticket = %request.ticket,
                        delay_ms = request.delay.as_millis() as u64,
                        "Spawn timer armed"
                    );
                    self.timer.arm(request);
                }
                Command::Disarm(ticket) => self.timer.disarm(ticket),
            }
        }
    }

    /// Apply every timer tick that has fired since the last call.
    pub fn tick(&mut self) {
        while let Some(ticket) = self.timer.try_recv() {
            self.dispatch(Event::SpawnTick(ticket));
        }
    }

    pub fn start(&mut self) {
        self.dispatch(Event::Start);
    }

    pub fn confirm_briefing(&mut self) {
        self.dispatch(Event::ConfirmBriefing);
    }

    /// Decide `card`. Ignored unless it is the current head while playing.
    pub fn decide(&mut self, card: CardId, action: Action) {
        self.dispatch(Event::Decide { card, action });
    }

    /// Approve the head of the queue, if any.
    pub fn approve(&mut self) {
        self.decide_head(Action::Approve);
    }

    /// Reject the head of the queue, if any.
    pub fn reject(&mut self) {
        self.decide_head(Action::Reject);
    }

    fn decide_head(&mut self, action: Action) {
        if !self.state.phase().is_playing() {
            return;
        }
        if let Some(card) = self.state.queue().head().map(|card| card.id) {
            self.decide(card, action);
        }
    }

    pub fn acknowledge_round_result(&mut self) {
        self.dispatch(Event::AcknowledgeRoundResult);
    }

    pub fn advance_round(&mut self) {
        self.dispatch(Event::AdvanceRound);
    }

    pub fn restart(&mut self) {
        self.dispatch(Event::Restart);
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    /// Whether a spawn sleep is currently outstanding in the runtime.
    #[must_use]
    pub fn has_pending_spawn(&self) -> bool {
        self.timer.is_pending()
    }
}
