//! Tournament orchestration.
//!
//! A [`Tournament`] owns the participant store, the schedule, the Elo engine
//! and the game log for a single invocation. Matches are played either
//! strictly one at a time ([`Tournament::run`]) or round by round on a
//! bounded blocking pool ([`Tournament::run_concurrent`]). In both modes
//! ratings change only after a match has finished, and only the tournament
//! touches the store and the log.

use crate::config::{ConfigError, FailurePolicy, TournamentConfig};
use crate::discovery::{self, DiscoveryError};
use crate::elo::{EloEngine, RatingChange};
use crate::game_runner::{
    GameError, MatchFactory, MatchOutcome, MatchResult, MatchRunner, MatchSettings,
};
use crate::log::{ExportSink, TournamentLog};
use crate::participant::{ParticipantError, ParticipantStore};
use crate::schedule::{Pairing, Schedule};
use crate::standings::{self, Standing};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Errors that stop a tournament run.
#[derive(Error, Debug)]
pub enum TournamentError {
    #[error(transparent)]
    Participant(#[from] ParticipantError),
    #[error("Match {round} ({white} vs {black}) failed: {source}")]
    Match {
        round: usize,
        white: String,
        black: String,
        #[source]
        source: GameError,
    },
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to export games: {0}")]
    Export(#[from] std::io::Error),
    #[error("Worker failed: {0}")]
    Worker(String),
}

/// A match that finished and was rated.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedMatch {
    /// Zero-based schedule position.
    pub position: usize,
    pub white: String,
    pub black: String,
    pub result: MatchResult,
    pub plies: usize,
    /// `None` when the rating delta was exactly zero.
    pub rating_change: Option<RatingChange>,
}

/// A match that failed under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, Serialize)]
pub struct MatchFailure {
    pub position: usize,
    pub white: String,
    pub black: String,
    pub error: String,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TournamentReport {
    pub run_id: String,
    /// Schedule positions skipped by `start_at`.
    pub skipped: usize,
    pub completed: Vec<CompletedMatch>,
    pub failures: Vec<MatchFailure>,
}

/// Everything the tournament needs beyond the factory and participants.
#[derive(Debug, Clone)]
struct RunSettings {
    event: String,
    site: String,
    max_plies: Option<u32>,
    start_at: usize,
    workers: usize,
    policy: FailurePolicy,
}

/// One round-robin tournament.
pub struct Tournament<F: MatchFactory> {
    factory: Arc<F>,
    store: ParticipantStore,
    schedule: Schedule,
    elo: EloEngine,
    log: TournamentLog,
    settings: RunSettings,
    run_id: Uuid,
}

impl<F: MatchFactory> Tournament<F> {
    /// Creates a tournament over `names` in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`TournamentError::Config`] for invalid settings and
    /// [`TournamentError::DuplicateParticipant`] if a name repeats.
    pub fn new(
        factory: F,
        names: Vec<String>,
        config: &TournamentConfig,
    ) -> Result<Self, TournamentError> {
        config.validate()?;
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(TournamentError::DuplicateParticipant(name.clone()));
            }
        }

        let store = ParticipantStore::from_names(names);
        let schedule = Schedule::round_robin(store.len(), config.cycles);

        Ok(Self {
            factory: Arc::new(factory),
            store,
            schedule,
            elo: EloEngine::new(config.k_factor),
            log: TournamentLog::new(),
            settings: RunSettings {
                event: config.event.clone(),
                site: config.site.clone(),
                max_plies: config.max_plies,
                start_at: config.start_at,
                workers: config.workers,
                policy: config.on_match_error,
            },
            run_id: Uuid::new_v4(),
        })
    }

    /// Creates a tournament from configuration, discovering participants
    /// from `models_dir` unless an explicit list is given.
    pub fn from_config(factory: F, config: &TournamentConfig) -> Result<Self, TournamentError> {
        let names = resolve_participants(config)?;
        Self::new(factory, names, config)
    }

    pub fn participants(&self) -> &ParticipantStore {
        &self.store
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn log(&self) -> &TournamentLog {
        &self.log
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn standings(&self) -> Vec<Standing> {
        standings::compute(&self.store, &self.log)
    }

    /// Appends every recorded game to `sink`.
    pub fn export<S: ExportSink>(&self, sink: &mut S) -> Result<(), TournamentError> {
        self.log.export(sink)?;
        tracing::info!(games = self.log.len(), "games exported");
        Ok(())
    }

    /// Plays the schedule strictly in order, one match at a time.
    ///
    /// Under [`FailurePolicy::Abort`] the first failed match ends the run with
    /// an error; games finished before it stay in the log.
    pub fn run(&mut self) -> Result<TournamentReport, TournamentError> {
        let mut report = self.start_report();
        let pending: Vec<(usize, Pairing)> = self
            .schedule
            .iter_from(self.settings.start_at)
            .map(|(pos, pairing)| (pos, *pairing))
            .collect();

        for (position, pairing) in pending {
            let (white, black) = self.begin_match(&pairing)?;
            let settings = self.match_settings(position);
            let identities = [white.as_str(), black.as_str()];
            let outcome =
                MatchRunner::new(&*self.factory, &identities, &settings).and_then(MatchRunner::play);
            self.end_match(&pairing);
            self.settle(&mut report, position, pairing, white, black, outcome)?;
        }

        self.finish_report(&report);
        Ok(report)
    }

    fn start_report(&self) -> TournamentReport {
        let skipped = self.settings.start_at.min(self.schedule.len());
        tracing::info!(
            run_id = %self.run_id,
            participants = self.store.len(),
            matches = self.schedule.len(),
            skipped,
            "tournament started"
        );
        TournamentReport {
            run_id: self.run_id.to_string(),
            skipped,
            ..Default::default()
        }
    }

    fn finish_report(&self, report: &TournamentReport) {
        tracing::info!(
            run_id = %self.run_id,
            completed = report.completed.len(),
            failed = report.failures.len(),
            "tournament finished"
        );
    }

    fn match_settings(&self, position: usize) -> MatchSettings {
        MatchSettings {
            event: self.settings.event.clone(),
            site: self.settings.site.clone(),
            round: (position + 1).to_string(),
            max_plies: self.settings.max_plies,
        }
    }

    /// Resolves both names and links the two participants for the match.
    fn begin_match(&mut self, pairing: &Pairing) -> Result<(String, String), TournamentError> {
        let white = self.store.get(pairing.first)?.name.clone();
        let black = self.store.get(pairing.second)?.name.clone();
        self.store.set_current_competitor(pairing.first, pairing.second)?;
        self.store.set_current_competitor(pairing.second, pairing.first)?;
        tracing::info!(%white, %black, cycle = pairing.cycle, "match started");
        Ok((white, black))
    }

    fn end_match(&mut self, pairing: &Pairing) {
        self.store.clear_current_competitor(pairing.first);
        self.store.clear_current_competitor(pairing.second);
    }

    /// Rates and logs a finished match, or applies the failure policy.
    fn settle(
        &mut self,
        report: &mut TournamentReport,
        position: usize,
        pairing: Pairing,
        white: String,
        black: String,
        outcome: Result<MatchOutcome, GameError>,
    ) -> Result<(), TournamentError> {
        match outcome {
            Ok(outcome) => {
                let rating_change =
                    self.elo
                        .apply(&mut self.store, pairing.first, pairing.second, outcome.result)?;
                let plies = outcome.record.moves().len();
                self.log.append(outcome.record);
                tracing::info!(
                    %white,
                    %black,
                    result = %outcome.result,
                    plies,
                    "match finished"
                );
                report.completed.push(CompletedMatch {
                    position,
                    white,
                    black,
                    result: outcome.result,
                    plies,
                    rating_change,
                });
                Ok(())
            }
            Err(source) => match self.settings.policy {
                FailurePolicy::Abort => {
                    tracing::error!(%white, %black, error = %source, "match failed, aborting");
                    Err(TournamentError::Match {
                        round: position + 1,
                        white,
                        black,
                        source,
                    })
                }
                FailurePolicy::Continue => {
                    tracing::warn!(%white, %black, error = %source, "match failed, continuing");
                    report.failures.push(MatchFailure {
                        position,
                        white,
                        black,
                        error: source.to_string(),
                    });
                    Ok(())
                }
            },
        }
    }
}

impl<F> Tournament<F>
where
    F: MatchFactory + Send + Sync + 'static,
{
    /// Plays the schedule in participant-disjoint rounds, up to `workers`
    /// matches at once.
    ///
    /// Each round's matches run on tokio's blocking pool. Results are rated
    /// and logged at the round boundary in schedule order, so no rating is
    /// read while another match involving the same participant could write it.
    ///
    /// Under [`FailurePolicy::Abort`] the run stops after the round holding the
    /// first failed match; the other games of that round are still rated and
    /// logged.
    pub async fn run_concurrent(&mut self) -> Result<TournamentReport, TournamentError> {
        let mut report = self.start_report();
        let semaphore = Arc::new(Semaphore::new(self.settings.workers));

        let rounds = self.schedule.rounds_from(self.settings.start_at);
        for (round_idx, round) in rounds.into_iter().enumerate() {
            tracing::debug!(round = round_idx + 1, matches = round.len(), "round started");

            let mut running = Vec::with_capacity(round.len());
            for (position, pairing) in round {
                let (white, black) = self.begin_match(&pairing)?;
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| TournamentError::Worker(e.to_string()))?;
                let factory = Arc::clone(&self.factory);
                let settings = self.match_settings(position);
                let (w, b) = (white.clone(), black.clone());
                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    MatchRunner::new(&*factory, &[w.as_str(), b.as_str()], &settings)?.play()
                });
                running.push((position, pairing, white, black, handle));
            }

            // Wait for the whole round before touching ratings.
            let mut first_error = None;
            let mut finished = Vec::with_capacity(running.len());
            for (position, pairing, white, black, handle) in running {
                match handle.await {
                    Ok(outcome) => finished.push((position, pairing, white, black, outcome)),
                    Err(e) => {
                        self.end_match(&pairing);
                        tracing::error!(%white, %black, error = %e, "worker failed");
                        first_error.get_or_insert(TournamentError::Worker(e.to_string()));
                    }
                }
            }

            for (_, pairing, ..) in &finished {
                self.end_match(pairing);
            }
            // Every game of the round has finished, so each one is rated and
            // logged before the first error ends the run.
            for (position, pairing, white, black, outcome) in finished {
                if let Err(e) = self.settle(&mut report, position, pairing, white, black, outcome)
                {
                    first_error.get_or_insert(e);
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        self.finish_report(&report);
        Ok(report)
    }
}

/// Participants named in the configuration, or discovered from `models_dir`.
pub fn resolve_participants(config: &TournamentConfig) -> Result<Vec<String>, TournamentError> {
    if !config.participants.is_empty() {
        return Ok(config.participants.clone());
    }
    let names = discovery::list_names(&config.models_dir, &config.pattern)?;
    tracing::info!(
        dir = %config.models_dir.display(),
        found = names.len(),
        "participants discovered"
    );
    Ok(names)
}
