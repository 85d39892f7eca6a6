//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use rubberstamp_engine::{
    Action, Card, CardGenerator, CardSource, Command, Engine, Event, GameState, Rules, SpawnTicket,
};

/// Long enough for any round's next spawn to fire.
pub const SPAWN_WAIT: Duration = Duration::from_millis(4_010);

pub fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .expect("valid fixed timestamp")
}

/// Seeded generator with a frozen clock, so every card field is reproducible.
pub fn reproducible_cards(seed: u64) -> CardGenerator {
    CardGenerator::seeded(seed).with_clock(fixed_clock)
}

pub fn correct_action(card: &Card) -> Action {
    if card.has_error() {
        Action::Reject
    } else {
        Action::Approve
    }
}

pub fn wrong_action(card: &Card) -> Action {
    match correct_action(card) {
        Action::Approve => Action::Reject,
        Action::Reject => Action::Approve,
    }
}

/// Let paused tokio time run past the next spawn and apply it.
pub async fn wait_for_spawn<S: CardSource>(engine: &mut Engine<S>) {
    tokio::time::sleep(SPAWN_WAIT).await;
    tokio::task::yield_now().await;
    engine.tick();
}

pub fn seeded_engine(seed: u64) -> Engine {
    Engine::new(reproducible_cards(seed), Rules::default())
}

/// Synchronous driver for a bare `GameState`, tracking the armed ticket the
/// way the runtime timer would.
pub struct Driver<S> {
    pub state: GameState,
    pub cards: S,
    armed: Option<SpawnTicket>,
}

impl<S: CardSource> Driver<S> {
    pub fn new(cards: S, rules: Rules) -> Self {
        Self {
            state: GameState::new(rules),
            cards,
            armed: None,
        }
    }

    pub fn send(&mut self, event: Event) {
        for command in self.state.apply(event, &mut self.cards) {
            match command {
                Command::Arm(request) => self.armed = Some(request.ticket),
                Command::Disarm(ticket) => {
                    if self.armed == Some(ticket) {
                        self.armed = None;
                    }
                }
            }
        }
    }

    /// Fire the armed timer. Returns `false` if nothing was armed.
    pub fn fire(&mut self) -> bool {
        match self.armed.take() {
            Some(ticket) => {
                self.send(Event::SpawnTick(ticket));
                true
            }
            None => false,
        }
    }

    pub fn decide_head(&mut self, action: impl FnOnce(&Card) -> Action) -> bool {
        let Some(card) = self.state.queue().head() else {
            return false;
        };
        let event = Event::Decide {
            card: card.id,
            action: action(card),
        };
        self.send(event);
        true
    }
}
