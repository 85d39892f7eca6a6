//! Core domain types for Rubberstamp.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The engine owns and mutates these; the TUI only ever reads them.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod card;
mod ids;
mod phase;
mod round;
mod score;
pub mod ui;

pub use card::{
    Card, ERROR_KINDS, ErrorKind, INVALID_ADDRESS, INVALID_DUE_DATE, Quantity, Unit,
};
pub use ids::CardId;
pub use phase::GamePhase;
pub use round::{ROUNDS, RoundConfig, RoundId, UnknownRound};
pub use score::{Action, ScoreState, Stats, Verdict};
