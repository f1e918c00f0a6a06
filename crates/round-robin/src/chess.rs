//! Chess collaborators for the tournament binary.
//!
//! [`ChessGame`] enforces the rules with `cozy-chess` and reports checkmate,
//! stalemate and the fifty-move rule as terminal. [`UciAgent`] asks a UCI
//! engine subprocess for its move, and [`UciArena`] builds both for every
//! match, resolving identities to executables under the models directory.

use crate::game_runner::{
    GameError, GameState, MatchFactory, MatchResult, MoveChoice, MoveProvider, Status, Step,
};
use crate::uci_client::UciClient;
use cozy_chess::{Board, Color, GameStatus};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A game of standard chess from the initial position.
#[derive(Debug, Clone, Default)]
pub struct ChessGame {
    board: Board,
    moves: Vec<String>,
}

impl ChessGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves played so far, in UCI notation.
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
}

impl GameState for ChessGame {
    type Move = String;

    fn step(&mut self, mv: &String) -> Result<Step, GameError> {
        let parsed = cozy_chess::util::parse_uci_move(&self.board, mv)
            .map_err(|_| GameError::InvalidMove(mv.clone()))?;
        self.board
            .try_play(parsed)
            .map_err(|_| GameError::InvalidMove(mv.clone()))?;
        self.moves.push(mv.clone());

        Ok(match self.board.status() {
            GameStatus::Ongoing => Step::playing(),
            GameStatus::Drawn => Step::decided(MatchResult::Draw),
            // The side to move has been checkmated.
            GameStatus::Won => Step::decided(match self.board.side_to_move() {
                Color::White => MatchResult::WinSecond,
                Color::Black => MatchResult::WinFirst,
            }),
        })
    }
}

/// A UCI engine playing one side of a game.
pub struct UciAgent {
    identity: String,
    client: UciClient,
    time_control: String,
}

impl MoveProvider<ChessGame> for UciAgent {
    fn choose_move(&mut self, game: &ChessGame) -> Result<MoveChoice<String>, GameError> {
        self.client.set_position(game.moves())?;
        let (bestmove, info) = self.client.go(&self.time_control)?;

        if bestmove.is_empty() || bestmove == "(none)" || bestmove == "0000" {
            return Err(GameError::NoMove(self.identity.clone()));
        }

        Ok(MoveChoice {
            mv: bestmove,
            value: info.value(),
            confidence: info.confidence(),
        })
    }
}

/// Spawns UCI engines from a models directory and plays them on a chess board.
#[derive(Debug, Clone)]
pub struct UciArena {
    models_dir: PathBuf,
    time_control: String,
    options: BTreeMap<String, String>,
}

impl UciArena {
    /// # Arguments
    ///
    /// * `models_dir` - Directory holding one engine executable per identity.
    /// * `time_control` - Arguments for every `go` command (e.g. `"movetime 500"`).
    /// * `options` - `setoption` values sent to every engine after the handshake.
    pub fn new(
        models_dir: impl Into<PathBuf>,
        time_control: impl Into<String>,
        options: BTreeMap<String, String>,
    ) -> Self {
        Self {
            models_dir: models_dir.into(),
            time_control: time_control.into(),
            options,
        }
    }
}

impl MatchFactory for UciArena {
    type Game = ChessGame;
    type Provider = UciAgent;

    fn new_game(&self) -> ChessGame {
        ChessGame::new()
    }

    fn provider(&self, identity: &str) -> Result<UciAgent, GameError> {
        let mut client = UciClient::spawn(self.models_dir.join(identity))?;
        client.init()?;
        for (name, value) in &self.options {
            client.set_option(name, value)?;
        }
        client.send("ucinewgame")?;
        client.is_ready()?;
        tracing::debug!(identity, engine = %client.name, "engine ready");

        Ok(UciAgent {
            identity: identity.to_string(),
            client,
            time_control: self.time_control.clone(),
        })
    }
}
