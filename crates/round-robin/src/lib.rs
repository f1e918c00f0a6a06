//! Round Robin - an Elo-rated round-robin tournament runner.
//!
//! Every participant plays every other participant once per cycle. Ratings
//! are updated with the Elo formula after each finished game, and every game
//! is kept in a log that is exported as PGN at the end of the run.
//!
//! # Modules
//!
//! - [`participant`] - Participant store with ratings and competitor links
//! - [`schedule`] - Round-robin pairing schedule and participant-disjoint rounds
//! - [`elo`] - Elo expected score and rating updates
//! - [`game_runner`] - Match state machine and the game/provider seams
//! - [`pgn`] - Game records and their PGN rendering
//! - [`log`] - Tournament game log and export sinks
//! - [`tournament`] - Orchestration of a whole run
//! - [`standings`] - Final standings table
//! - [`chess`] - Chess rules and UCI engines as match collaborators
//! - [`uci_client`] - UCI protocol client for engine subprocesses
//! - [`discovery`] - Participant discovery from a models directory
//! - [`config`] - `tournament.toml` configuration

pub mod chess;
pub mod config;
pub mod discovery;
pub mod elo;
pub mod game_runner;
pub mod log;
pub mod participant;
pub mod pgn;
pub mod schedule;
pub mod standings;
pub mod tournament;
pub mod uci_client;

#[cfg(test)]
mod testing;
