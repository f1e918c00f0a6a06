//! Scripted collaborators for unit tests.

use crate::game_runner::{
    GameError, GameState, MatchFactory, MatchResult, MoveChoice, MoveProvider, Status, Step,
};
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) type Decide = fn(&str, &str) -> MatchResult;

/// Lexicographically smaller name wins.
pub(crate) fn decide_by_name(white: &str, black: &str) -> MatchResult {
    match white.cmp(black) {
        std::cmp::Ordering::Less => MatchResult::WinFirst,
        std::cmp::Ordering::Equal => MatchResult::Draw,
        std::cmp::Ordering::Greater => MatchResult::WinSecond,
    }
}

/// A game that ends after a fixed number of plies. Moves are `name#ply`,
/// which lets the game recover who is playing which side.
pub(crate) struct ScriptedGame {
    length: usize,
    decide: Decide,
    terminal_flag: bool,
    undecided_end: bool,
    moves: Vec<String>,
}

impl ScriptedGame {
    fn side(&self, ply: usize) -> &str {
        self.moves
            .get(ply)
            .and_then(|mv| mv.split('#').next())
            .unwrap_or("")
    }
}

impl GameState for ScriptedGame {
    type Move = String;

    fn step(&mut self, mv: &String) -> Result<Step, GameError> {
        self.moves.push(mv.clone());
        if self.moves.len() < self.length {
            return Ok(Step::playing());
        }
        if self.undecided_end {
            return Ok(Step {
                terminal: true,
                status: Status::Playing,
            });
        }
        Ok(Step {
            terminal: self.terminal_flag,
            status: Status::Decided((self.decide)(self.side(0), self.side(1))),
        })
    }
}

pub(crate) struct ScriptedProvider {
    name: String,
    fail: bool,
    panic: bool,
}

impl MoveProvider<ScriptedGame> for ScriptedProvider {
    fn choose_move(&mut self, game: &ScriptedGame) -> Result<MoveChoice<String>, GameError> {
        if self.panic {
            panic!("{} panicked", self.name);
        }
        if self.fail {
            return Err(GameError::Provider(format!("{} crashed", self.name)));
        }
        Ok(MoveChoice {
            mv: format!("{}#{}", self.name, game.moves.len()),
            value: Some(0.5),
            confidence: Some(1.0),
        })
    }
}

pub(crate) struct ScriptedFactory {
    length: usize,
    decide: Decide,
    terminal_flag: bool,
    undecided_end: bool,
    failing: Vec<String>,
    panicking: Vec<String>,
    missing: Vec<String>,
    built: AtomicUsize,
}

impl ScriptedFactory {
    pub(crate) fn new(length: usize, decide: Decide) -> Self {
        Self {
            length,
            decide,
            terminal_flag: true,
            undecided_end: false,
            failing: Vec::new(),
            panicking: Vec::new(),
            missing: Vec::new(),
            built: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_terminal_flag(mut self, flag: bool) -> Self {
        self.terminal_flag = flag;
        self
    }

    pub(crate) fn with_undecided_end(mut self) -> Self {
        self.undecided_end = true;
        self
    }

    /// The provider for `name` errors on its first move.
    pub(crate) fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    /// The provider for `name` panics on its first move.
    pub(crate) fn panicking_on(mut self, name: &str) -> Self {
        self.panicking.push(name.to_string());
        self
    }

    /// No provider can be built for `name`.
    pub(crate) fn missing(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    pub(crate) fn providers_built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

impl MatchFactory for ScriptedFactory {
    type Game = ScriptedGame;
    type Provider = ScriptedProvider;

    fn new_game(&self) -> ScriptedGame {
        ScriptedGame {
            length: self.length,
            decide: self.decide,
            terminal_flag: self.terminal_flag,
            undecided_end: self.undecided_end,
            moves: Vec::new(),
        }
    }

    fn provider(&self, identity: &str) -> Result<ScriptedProvider, GameError> {
        if self.missing.iter().any(|m| m == identity) {
            return Err(GameError::Config(format!("no agent named {}", identity)));
        }
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedProvider {
            name: identity.to_string(),
            fail: self.failing.iter().any(|f| f == identity),
            panic: self.panicking.iter().any(|f| f == identity),
        })
    }
}
