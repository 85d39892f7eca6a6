//! Spawn cadence and the cancellable timer behind it.
//!
//! [`SpawnScheduler`] is pure bookkeeping owned by the state machine: it
//! decides when the next card is due and which [`SpawnTicket`] is currently
//! armed. [`SpawnTimer`] is the runtime half that turns an armed request into
//! a tokio sleep and reports the ticket back over a channel.
//!
//! Every arm bumps the ticket generation, so a tick from a timer that was
//! disarmed (phase change, round change, restart) never matches and is
//! dropped.

use std::fmt;
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;

use rubberstamp_types::RoundConfig;

/// Delay before the first card of every round.
pub const FIRST_SPAWN_DELAY: Duration = Duration::from_millis(500);

/// Generation number identifying one armed spawn timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnTicket(u64);

impl SpawnTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpawnTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest {
    pub ticket: SpawnTicket,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    armed: Option<SpawnTicket>,
    generation: u64,
    spawned_in_round: u32,
    pace: f64,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpawnScheduler {
    /// `pace` scales every delay; non-positive or non-finite values fall back
    /// to real time.
    #[must_use]
    pub fn new(pace: f64) -> Self {
        let pace = if pace.is_finite() && pace > 0.0 {
            pace
        } else {
            1.0
        };
        Self {
            armed: None,
            generation: 0,
            spawned_in_round: 0,
            pace,
        }
    }

    /// Arm a fresh timer for the next spawn in `round`. Any previously armed
    /// ticket becomes stale.
    pub fn arm(&mut self, round: &RoundConfig) -> SpawnRequest {
        self.generation += 1;
        let ticket = SpawnTicket(self.generation);
        self.armed = Some(ticket);
        SpawnRequest {
            ticket,
            delay: self.next_delay(round),
        }
    }

    /// Invalidate the armed ticket, returning it if one was armed.
    pub fn disarm(&mut self) -> Option<SpawnTicket> {
        self.armed.take()
    }

    /// Consume `ticket` if it is the armed one. Stale tickets are refused.
    pub fn accept(&mut self, ticket: SpawnTicket) -> bool {
        if self.armed == Some(ticket) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Whether `round` still wants another card. The final round always does.
    #[must_use]
    pub fn wants_card(&self, round: &RoundConfig) -> bool {
        !round.target_reached(self.spawned_in_round)
    }

    pub fn record_spawn(&mut self) {
        self.spawned_in_round = self.spawned_in_round.saturating_add(1);
    }

    pub fn reset_round(&mut self) {
        self.spawned_in_round = 0;
    }

    #[must_use]
    pub fn spawned_in_round(&self) -> u32 {
        self.spawned_in_round
    }

    fn next_delay(&self, round: &RoundConfig) -> Duration {
        let base = if self.spawned_in_round == 0 {
            FIRST_SPAWN_DELAY
        } else {
            round.spawn_interval()
        };
        base.mul_f64(self.pace)
    }
}

/// Tokio-backed timer for at most one pending spawn.
///
/// Fired tickets are queued on an unbounded channel and picked up by
/// [`SpawnTimer::try_recv`] on the owner's thread, so spawns are serialized
/// with every other engine mutation. Dropping the timer aborts the pending
/// sleep.
#[derive(Debug)]
pub struct SpawnTimer {
    tx: mpsc::UnboundedSender<SpawnTicket>,
    rx: mpsc::UnboundedReceiver<SpawnTicket>,
    pending: Option<(SpawnTicket, AbortHandle)>,
}

impl Default for SpawnTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnTimer {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending: None,
        }
    }

    /// Start sleeping for `request.delay`. Must be called inside a tokio
    /// runtime. Replaces (and aborts) any pending timer.
    pub fn arm(&mut self, request: SpawnRequest) {
        self.cancel();
        let (abort_handle, registration) = AbortHandle::new_pair();
        let tx = self.tx.clone();
        let SpawnRequest { ticket, delay } = request;
        tokio::spawn(Abortable::new(
            async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(ticket);
            },
            registration,
        ));
        self.pending = Some((ticket, abort_handle));
    }

    /// Abort the pending timer if it belongs to `ticket`.
    pub fn disarm(&mut self, ticket: SpawnTicket) {
        if self
            .pending
            .as_ref()
            .is_some_and(|(pending, _)| *pending == ticket)
        {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        if let Some((ticket, handle)) = self.pending.take() {
            handle.abort();
            tracing::debug!(%ticket, "Spawn timer cancelled");
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Next fired ticket, if any. Non-blocking.
    pub fn try_recv(&mut self) -> Option<SpawnTicket> {
        let ticket = self.rx.try_recv().ok()?;
        if self
            .pending
            .as_ref()
            .is_some_and(|(pending, _)| *pending == ticket)
        {
            self.pending = None;
        }
        Some(ticket)
    }
}

impl Drop for SpawnTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
