//! Integration test suite modules

mod config;
mod game_flow;
mod snapshot;
