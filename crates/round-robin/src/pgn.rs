//! PGN (Portable Game Notation) game records.
//!
//! A [`GameRecord`] is opened when a match starts, filled one ply at a time by
//! the match runner, and sealed with the final result. Sealed records are
//! immutable and render as PGN text through their [`Display`](fmt::Display)
//! implementation.

use crate::game_runner::MatchResult;
use chrono::{NaiveDate, Utc};
use std::fmt;

/// Tag values shared by every game of one tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub event: String,
    pub site: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

/// A game being recorded. Only the match runner appends to it.
#[derive(Debug, Clone)]
pub struct OpenRecord {
    header: RecordHeader,
    moves: Vec<String>,
}

impl OpenRecord {
    pub fn new(header: RecordHeader) -> Self {
        Self {
            header,
            moves: Vec::new(),
        }
    }

    pub fn push_move(&mut self, mv: impl fmt::Display) {
        self.moves.push(mv.to_string());
    }

    pub fn plies(&self) -> usize {
        self.moves.len()
    }

    /// Closes the record with its result, dated today (UTC).
    pub fn seal(self, result: MatchResult) -> GameRecord {
        self.seal_on(result, Utc::now().date_naive())
    }

    /// Closes the record with an explicit date.
    pub fn seal_on(self, result: MatchResult, date: NaiveDate) -> GameRecord {
        GameRecord {
            header: self.header,
            moves: self.moves,
            result,
            date,
        }
    }
}

/// A completed, immutable game transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    header: RecordHeader,
    moves: Vec<String>,
    result: MatchResult,
    date: NaiveDate,
}

impl GameRecord {
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    pub fn white(&self) -> &str {
        &self.header.white
    }

    pub fn black(&self) -> &str {
        &self.header.black
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn result(&self) -> MatchResult {
        self.result
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result.pgn();
        writeln!(f, "[Event \"{}\"]", self.header.event)?;
        writeln!(f, "[Site \"{}\"]", self.header.site)?;
        writeln!(f, "[Date \"{}\"]", self.date.format("%Y.%m.%d"))?;
        writeln!(f, "[Round \"{}\"]", self.header.round)?;
        writeln!(f, "[White \"{}\"]", self.header.white)?;
        writeln!(f, "[Black \"{}\"]", self.header.black)?;
        writeln!(f, "[Result \"{}\"]", result)?;
        writeln!(f)?;

        // Moves in UCI notation, numbered per full move, wrapped at 80 columns.
        let mut tokens = Vec::with_capacity(self.moves.len() * 3 / 2 + 1);
        for (i, mv) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                tokens.push(format!("{}.", i / 2 + 1));
            }
            tokens.push(mv.clone());
        }
        tokens.push(result.to_string());

        let mut line_len = 0;
        for token in tokens {
            if line_len > 0 && line_len + 1 + token.len() > 80 {
                writeln!(f)?;
                line_len = 0;
            }
            if line_len > 0 {
                write!(f, " ")?;
                line_len += 1;
            }
            write!(f, "{}", token)?;
            line_len += token.len();
        }
        Ok(())
    }
}
