//! Input handling for the Rubberstamp TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use rubberstamp_engine::{CardSource, Engine, GamePhase};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 256;
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// What a key press asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Start, confirm, continue, advance or restart, depending on phase.
    Proceed,
    Approve,
    Reject,
    Quit,
}

/// Map a key press to a command. Releases and unbound keys map to `None`.
#[must_use]
pub fn key_command(key: KeyEvent) -> Option<KeyCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyCommand::Quit)
        }
        KeyCode::Char('q') => Some(KeyCommand::Quit),
        KeyCode::Enter => Some(KeyCommand::Proceed),
        KeyCode::Char(' ') if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(KeyCommand::Reject)
        }
        KeyCode::Char(' ' | 'a') => Some(KeyCommand::Approve),
        KeyCode::Backspace | KeyCode::Char('x' | 'r') => Some(KeyCommand::Reject),
        _ => None,
    }
}

/// Apply `command` to the engine. Returns `true` when the user asked to quit.
pub fn apply_command<S: CardSource>(engine: &mut Engine<S>, command: KeyCommand) -> bool {
    match command {
        KeyCommand::Quit => return true,
        KeyCommand::Approve => engine.approve(),
        KeyCommand::Reject => engine.reject(),
        KeyCommand::Proceed => match engine.phase() {
            GamePhase::Idle => engine.start(),
            GamePhase::Briefing => engine.confirm_briefing(),
            GamePhase::RoundResults => engine.acknowledge_round_result(),
            GamePhase::RoundTransition => engine.advance_round(),
            GamePhase::GameOver => engine.restart(),
            GamePhase::Playing => {}
        },
    }
    false
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a blocked send in the input thread returns.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending terminal input into the engine. Returns `Ok(true)` on quit.
pub fn handle_events<S: CardSource>(engine: &mut Engine<S>, input: &mut InputPump) -> Result<bool> {
    for _ in 0..MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        let Event::Key(key) = ev else {
            continue;
        };
        let Some(command) = key_command(key) else {
            continue;
        };
        debug!(?command, phase = %engine.phase(), "Key command");
        if apply_command(engine, command) {
            return Ok(true);
        }
    }
    Ok(false)
}
