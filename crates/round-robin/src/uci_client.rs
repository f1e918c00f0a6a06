//! UCI (Universal Chess Interface) client for engine subprocesses.
//!
//! Every tournament identity is an executable speaking UCI over stdin/stdout.
//! The client performs the handshake, forwards `setoption` values, sets up
//! positions and collects the engine's `info` evaluation alongside its
//! `bestmove`.
//!
//! # Example
//!
//! ```no_run
//! use round_robin::uci_client::UciClient;
//!
//! let mut client = UciClient::spawn("models/engine-a")?;
//! client.init()?;
//! client.set_position(&[])?;
//! let (best_move, info) = client.go("movetime 1000")?;
//! println!("{} {:?}", best_move, info.score_cp);
//! # Ok::<(), round_robin::uci_client::UciError>(())
//! ```

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Errors that can occur when communicating with a UCI engine.
#[derive(Error, Debug)]
pub enum UciError {
    /// Failed to spawn the engine process or perform I/O operations.
    #[error("Failed to spawn process: {0}")]
    SpawnError(#[from] std::io::Error),
    /// The engine closed its output before answering.
    #[error("Engine closed the connection")]
    Disconnected,
    /// The engine returned an invalid or unexpected response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Evaluation details from the last `info` line before `bestmove`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub score_cp: Option<i32>,
    pub score_mate: Option<i32>,
    /// Win/draw/loss in permille, when the engine reports `wdl`.
    pub wdl: Option<(u32, u32, u32)>,
}

impl SearchInfo {
    /// Folds one `info` line into the collected values.
    pub fn update(&mut self, line: &str) {
        let mut tokens = line.split_whitespace().skip(1);
        while let Some(token) = tokens.next() {
            match token {
                "depth" => self.depth = tokens.next().and_then(|t| t.parse().ok()),
                "score" => match tokens.next() {
                    Some("cp") => {
                        self.score_cp = tokens.next().and_then(|t| t.parse().ok());
                        self.score_mate = None;
                    }
                    Some("mate") => {
                        self.score_mate = tokens.next().and_then(|t| t.parse().ok());
                        self.score_cp = None;
                    }
                    _ => {}
                },
                "wdl" => {
                    let w = tokens.next().and_then(|t| t.parse().ok());
                    let d = tokens.next().and_then(|t| t.parse().ok());
                    let l = tokens.next().and_then(|t| t.parse().ok());
                    if let (Some(w), Some(d), Some(l)) = (w, d, l) {
                        self.wdl = Some((w, d, l));
                    }
                }
                // The principal variation runs to the end of the line.
                "pv" | "string" => break,
                _ => {}
            }
        }
    }

    /// Expected score for the side to move, in `[0, 1]`.
    ///
    /// Uses the WDL triple when present, then mate scores, then the
    /// centipawn score mapped through the Elo logistic curve.
    pub fn value(&self) -> Option<f64> {
        if let Some((w, d, _)) = self.wdl {
            return Some((w as f64 + d as f64 / 2.0) / 1000.0);
        }
        if let Some(mate) = self.score_mate {
            return Some(if mate > 0 { 1.0 } else { 0.0 });
        }
        self.score_cp
            .map(|cp| 1.0 / (1.0 + 10_f64.powf(-(cp as f64) / 400.0)))
    }

    /// Probability of the most likely outcome, when the engine reports `wdl`.
    pub fn confidence(&self) -> Option<f64> {
        self.wdl
            .map(|(w, d, l)| w.max(d).max(l) as f64 / 1000.0)
    }
}

/// A client for communicating with a UCI-compatible engine.
///
/// # Lifecycle
///
/// 1. Spawn the engine with [`UciClient::spawn`]
/// 2. Initialize the protocol with [`UciClient::init`]
/// 3. Set positions and request moves with [`UciClient::set_position`] and [`UciClient::go`]
/// 4. Clean up with [`UciClient::quit`] (or rely on [`Drop`])
pub struct UciClient {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// The engine's name as reported during initialization.
    pub name: String,
}

impl UciClient {
    /// Spawns a new engine process. Call [`init`](Self::init) before use.
    ///
    /// # Errors
    ///
    /// Returns [`UciError::SpawnError`] if the executable cannot be started.
    pub fn spawn<P: AsRef<Path>>(path: P) -> Result<Self, UciError> {
        let mut process = Command::new(path.as_ref())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            let _ = process.kill();
            return Err(UciError::InvalidResponse(
                "engine pipes unavailable".to_string(),
            ));
        };

        Ok(Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
        })
    }

    /// Sends one command line to the engine.
    pub fn send(&mut self, cmd: &str) -> Result<(), UciError> {
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Reads one trimmed line from the engine.
    ///
    /// # Errors
    ///
    /// Returns [`UciError::Disconnected`] at end of stream.
    pub fn read_line(&mut self) -> Result<String, UciError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(UciError::Disconnected);
        }
        Ok(line.trim().to_string())
    }

    /// Performs the `uci` / `uciok` handshake, recording the engine's name.
    pub fn init(&mut self) -> Result<(), UciError> {
        self.send("uci")?;
        loop {
            let line = self.read_line()?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.to_string();
            }
            if line == "uciok" {
                break;
            }
        }
        self.is_ready()
    }

    /// Sends `isready` and waits for `readyok`.
    pub fn is_ready(&mut self) -> Result<(), UciError> {
        self.send("isready")?;
        while self.read_line()? != "readyok" {}
        Ok(())
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), UciError> {
        self.send(&format!("setoption name {} value {}", name, value))
    }

    /// Sends `position startpos moves ...`.
    pub fn set_position(&mut self, moves: &[String]) -> Result<(), UciError> {
        if moves.is_empty() {
            self.send("position startpos")
        } else {
            self.send(&format!("position startpos moves {}", moves.join(" ")))
        }
    }

    /// Searches the current position and returns `bestmove` plus the last evaluation seen.
    pub fn go(&mut self, time_control: &str) -> Result<(String, SearchInfo), UciError> {
        self.send(&format!("go {}", time_control))?;

        let mut info = SearchInfo::default();
        loop {
            let line = self.read_line()?;
            if line.starts_with("info ") {
                info.update(&line);
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                let bestmove = rest.split_whitespace().next().unwrap_or("").to_string();
                return Ok((bestmove, info));
            }
        }
    }

    /// Sends `quit` and waits for the process to exit.
    pub fn quit(&mut self) -> Result<(), UciError> {
        self.send("quit")?;
        let _ = self.process.wait();
        Ok(())
    }
}

impl Drop for UciClient {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.process.kill();
    }
}
