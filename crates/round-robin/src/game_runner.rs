//! Match execution between two move providers.
//!
//! This module defines the capability seams a match depends on
//! ([`GameState`], [`MoveProvider`], [`MatchFactory`]) and the [`MatchRunner`]
//! that drives one game from start to result:
//!
//! - **Init**: both providers are constructed from their identities and a
//!   [`OpenRecord`] is opened with both names.
//! - **InProgress**: providers are asked for moves strictly in turn, white
//!   first; each move goes to the game state and onto the record.
//! - **Terminal**: the game state reported a terminal flag or a decided
//!   result. The record is sealed.
//!
//! Move legality is the game state's concern; the runner does no validation.

use crate::pgn::{GameRecord, OpenRecord, RecordHeader};
use crate::uci_client::UciError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during match execution.
#[derive(Error, Debug)]
pub enum GameError {
    /// The match was set up incorrectly (e.g. not exactly two identities).
    #[error("Invalid match configuration: {0}")]
    Config(String),
    /// An error occurred while communicating with a UCI engine.
    #[error("UCI error: {0}")]
    Uci(#[from] UciError),
    /// A provider returned a move the game state rejected.
    #[error("Invalid move: {0}")]
    InvalidMove(String),
    /// A provider had no move to offer in an unfinished game.
    #[error("{0} returned no move")]
    NoMove(String),
    /// A provider failed for a reason of its own.
    #[error("Move provider failed: {0}")]
    Provider(String),
    /// The game reached the configured ply budget without finishing.
    #[error("Game exceeded {0} plies")]
    PlyLimit(u32),
}

/// Outcome of a game from the first (white) participant's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchResult {
    /// The first participant won.
    WinFirst,
    Draw,
    /// The second participant won.
    WinSecond,
}

impl MatchResult {
    /// Points scored by the first participant: 1, 0.5 or 0.
    pub fn score(self) -> f64 {
        match self {
            MatchResult::WinFirst => 1.0,
            MatchResult::Draw => 0.5,
            MatchResult::WinSecond => 0.0,
        }
    }

    /// The same outcome from the second participant's perspective.
    pub fn flipped(self) -> Self {
        match self {
            MatchResult::WinFirst => MatchResult::WinSecond,
            MatchResult::Draw => MatchResult::Draw,
            MatchResult::WinSecond => MatchResult::WinFirst,
        }
    }

    /// PGN result token, `<score>-<1 - score>`.
    pub fn pgn(self) -> &'static str {
        match self {
            MatchResult::WinFirst => "1-0",
            MatchResult::Draw => "1/2-1/2",
            MatchResult::WinSecond => "0-1",
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pgn())
    }
}

/// Game status as reported by the game state after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Decided(MatchResult),
}

/// What the game state reports after each move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub terminal: bool,
    pub status: Status,
}

impl Step {
    pub fn playing() -> Self {
        Self {
            terminal: false,
            status: Status::Playing,
        }
    }

    pub fn decided(result: MatchResult) -> Self {
        Self {
            terminal: true,
            status: Status::Decided(result),
        }
    }
}

/// The rules engine that owns board state and advances it move by move.
pub trait GameState {
    type Move: Clone + fmt::Display;

    /// Plays `mv` and reports whether the game is over.
    fn step(&mut self, mv: &Self::Move) -> Result<Step, GameError>;
}

/// A move with the provider's evaluation of it.
///
/// `value` and `confidence` are reported for logging only.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveChoice<M> {
    pub mv: M,
    pub value: Option<f64>,
    pub confidence: Option<f64>,
}

impl<M> MoveChoice<M> {
    pub fn new(mv: M) -> Self {
        Self {
            mv,
            value: None,
            confidence: None,
        }
    }
}

/// An agent that picks moves for one side.
pub trait MoveProvider<G: GameState> {
    fn choose_move(&mut self, game: &G) -> Result<MoveChoice<G::Move>, GameError>;
}

/// Builds the external collaborators for each match.
pub trait MatchFactory {
    type Game: GameState;
    type Provider: MoveProvider<Self::Game>;

    /// A fresh game in its starting position.
    fn new_game(&self) -> Self::Game;

    /// Constructs the move provider for `identity`.
    fn provider(&self, identity: &str) -> Result<Self::Provider, GameError>;
}

/// Per-match settings.
#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub event: String,
    pub site: String,
    pub round: String,
    /// Maximum plies before the match fails with [`GameError::PlyLimit`].
    pub max_plies: Option<u32>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            event: "Round Robin Tournament".to_string(),
            site: "?".to_string(),
            round: "?".to_string(),
            max_plies: None,
        }
    }
}

/// Where a match currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Init,
    InProgress { plies: u32 },
    Terminal(MatchResult),
}

/// A finished match.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub record: GameRecord,
}

/// Executes one game between two providers.
pub struct MatchRunner<F: MatchFactory> {
    white: F::Provider,
    black: F::Provider,
    game: F::Game,
    record: OpenRecord,
    max_plies: Option<u32>,
    plies: u32,
    phase: MatchPhase,
}

impl<F: MatchFactory> MatchRunner<F> {
    /// Sets up a match. `identities[0]` plays white and moves first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] unless exactly two identities are given;
    /// no provider is constructed in that case. Provider construction errors
    /// are passed through.
    pub fn new(
        factory: &F,
        identities: &[&str],
        settings: &MatchSettings,
    ) -> Result<Self, GameError> {
        let [white_name, black_name] = identities else {
            return Err(GameError::Config(format!(
                "a match needs exactly two identities, got {}",
                identities.len()
            )));
        };

        let white = factory.provider(white_name)?;
        let black = factory.provider(black_name)?;
        let record = OpenRecord::new(RecordHeader {
            event: settings.event.clone(),
            site: settings.site.clone(),
            round: settings.round.clone(),
            white: white_name.to_string(),
            black: black_name.to_string(),
        });

        Ok(Self {
            white,
            black,
            game: factory.new_game(),
            record,
            max_plies: settings.max_plies,
            plies: 0,
            phase: MatchPhase::Init,
        })
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Plays a single ply and returns the resulting phase.
    ///
    /// Once the match is terminal, further calls return the terminal phase
    /// without contacting either provider.
    pub fn advance(&mut self) -> Result<MatchPhase, GameError> {
        if let MatchPhase::Terminal(_) = self.phase {
            return Ok(self.phase);
        }
        if let Some(limit) = self.max_plies {
            if self.plies >= limit {
                return Err(GameError::PlyLimit(limit));
            }
        }

        let mover = if self.plies % 2 == 0 {
            &mut self.white
        } else {
            &mut self.black
        };
        let choice = mover.choose_move(&self.game)?;
        let step = self.game.step(&choice.mv)?;
        self.record.push_move(&choice.mv);
        tracing::trace!(
            ply = self.plies,
            mv = %choice.mv,
            value = ?choice.value,
            confidence = ?choice.confidence,
            "move played"
        );
        self.plies += 1;

        // Either signal alone ends the game.
        self.phase = match (step.terminal, step.status) {
            (_, Status::Decided(result)) => MatchPhase::Terminal(result),
            (true, Status::Playing) => {
                tracing::warn!(
                    plies = self.plies,
                    "game state ended the game without a result, scoring it as a draw"
                );
                MatchPhase::Terminal(MatchResult::Draw)
            }
            (false, Status::Playing) => MatchPhase::InProgress { plies: self.plies },
        };
        Ok(self.phase)
    }

    /// Plays the game to the end and seals its record.
    ///
    /// There is no implicit move limit: unless `max_plies` is set, a game
    /// state that never finishes keeps this loop running.
    pub fn play(mut self) -> Result<MatchOutcome, GameError> {
        loop {
            if let MatchPhase::Terminal(result) = self.advance()? {
                return Ok(MatchOutcome {
                    result,
                    record: self.record.seal(result),
                });
            }
        }
    }
}
