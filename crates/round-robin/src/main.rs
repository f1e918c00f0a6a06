use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use round_robin::chess::UciArena;
use round_robin::config::{FailurePolicy, TournamentConfig};
use round_robin::log::FileSink;
use round_robin::schedule::Schedule;
use round_robin::standings;
use round_robin::tournament::{self, Tournament};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "round-robin")]
#[command(about = "Elo-rated round-robin tournament for UCI engines")]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the full tournament and export the games
    Run {
        #[command(flatten)]
        overrides: Overrides,
        /// Matches played at once
        #[arg(short, long)]
        workers: Option<usize>,
        /// Ply budget per game
        #[arg(long)]
        max_plies: Option<u32>,
        /// Schedule position to resume from
        #[arg(long)]
        start_at: Option<usize>,
        /// What to do when a match fails
        #[arg(long, value_enum)]
        on_match_error: Option<FailurePolicy>,
        /// PGN file to append games to
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print standings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the pairing schedule without playing
    Schedule {
        #[command(flatten)]
        overrides: Overrides,
        /// Group pairings into participant-disjoint rounds
        #[arg(long)]
        rounds: bool,
    },
    /// List the participants that would play
    Participants {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Options shared by every command.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Directory holding one engine per participant
    #[arg(short, long)]
    models_dir: Option<PathBuf>,
    /// Glob for participant discovery
    #[arg(long)]
    pattern: Option<String>,
    /// Number of round-robin cycles
    #[arg(long)]
    cycles: Option<u32>,
    /// Elo K-factor
    #[arg(short, long)]
    k_factor: Option<f64>,
}

impl Overrides {
    fn apply(self, config: &mut TournamentConfig) {
        if let Some(dir) = self.models_dir {
            config.models_dir = dir;
        }
        if let Some(pattern) = self.pattern {
            config.pattern = pattern;
        }
        if let Some(cycles) = self.cycles {
            config.cycles = cycles;
        }
        if let Some(k) = self.k_factor {
            config.k_factor = k;
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TournamentConfig> {
    let path = path.cloned().unwrap_or_else(TournamentConfig::config_path);
    TournamentConfig::load(&path).with_context(|| format!("loading {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run {
            overrides,
            workers,
            max_plies,
            start_at,
            on_match_error,
            output,
            json,
        } => {
            overrides.apply(&mut config);
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if max_plies.is_some() {
                config.max_plies = max_plies;
            }
            if let Some(start_at) = start_at {
                config.start_at = start_at;
            }
            if let Some(policy) = on_match_error {
                config.on_match_error = policy;
            }
            if let Some(output) = output {
                config.output = output;
            }
            config.validate()?;
            run(config, json).await
        }
        Commands::Schedule { overrides, rounds } => {
            overrides.apply(&mut config);
            config.validate()?;
            let names = tournament::resolve_participants(&config)?;
            print_schedule(&names, config.cycles, rounds);
            Ok(())
        }
        Commands::Participants { overrides } => {
            overrides.apply(&mut config);
            for name in tournament::resolve_participants(&config)? {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

async fn run(config: TournamentConfig, json: bool) -> anyhow::Result<()> {
    let arena = UciArena::new(
        config.models_dir.clone(),
        config.time_control.clone(),
        config.uci_options.clone(),
    );
    let mut tournament = Tournament::from_config(arena, &config)?;
    println!(
        "Running {} matches between {} participants",
        tournament.schedule().len(),
        tournament.participants().len()
    );

    let outcome = if config.workers > 1 {
        tournament.run_concurrent().await
    } else {
        tournament.run()
    };

    // Games finished before a failure are still exported.
    let mut sink = FileSink::new(&config.output);
    tournament
        .export(&mut sink)
        .with_context(|| format!("writing {}", config.output.display()))?;

    let report = outcome?;
    let rows = tournament.standings();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "run_id": report.run_id,
                "standings": rows,
                "failures": report.failures,
            }))?
        );
    } else {
        println!();
        print!("{}", standings::render_table(&rows));
        for failure in &report.failures {
            eprintln!(
                "Match {} ({} vs {}) failed: {}",
                failure.position + 1,
                failure.white,
                failure.black,
                failure.error
            );
        }
        println!(
            "\n{} games written to {}",
            tournament.log().len(),
            config.output.display()
        );
    }
    Ok(())
}

fn print_schedule(names: &[String], cycles: u32, rounds: bool) {
    let schedule = Schedule::round_robin(names.len(), cycles);
    let label = |idx: usize| names.get(idx).map(String::as_str).unwrap_or("?");

    if rounds {
        for (n, round) in schedule.rounds_from(0).iter().enumerate() {
            println!("Round {}:", n + 1);
            for (pos, pairing) in round {
                println!("  {:>4}. {} vs {}", pos + 1, label(pairing.first), label(pairing.second));
            }
        }
    } else {
        for (pos, pairing) in schedule.iter_from(0) {
            println!(
                "{:>4}. {} vs {} (cycle {})",
                pos + 1,
                label(pairing.first),
                label(pairing.second),
                pairing.cycle + 1
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses_run_with_defaults() {
        let cli = Cli::try_parse_from(["round-robin", "run"]).unwrap();
        match cli.command {
            Commands::Run {
                overrides,
                workers,
                max_plies,
                on_match_error,
                json,
                ..
            } => {
                assert!(overrides.models_dir.is_none());
                assert!(workers.is_none());
                assert!(max_plies.is_none());
                assert!(on_match_error.is_none());
                assert!(!json);
            }
            _ => panic!("expected run"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "round-robin",
            "run",
            "-m",
            "nets",
            "--cycles",
            "2",
            "-k",
            "16",
            "-w",
            "4",
            "--max-plies",
            "300",
            "--on-match-error",
            "continue",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                overrides,
                workers,
                max_plies,
                on_match_error,
                json,
                ..
            } => {
                let mut config = TournamentConfig::default();
                overrides.apply(&mut config);
                assert_eq!(config.models_dir, PathBuf::from("nets"));
                assert_eq!(config.cycles, 2);
                assert_eq!(config.k_factor, 16.0);
                assert_eq!(workers, Some(4));
                assert_eq!(max_plies, Some(300));
                assert_eq!(on_match_error, Some(FailurePolicy::Continue));
                assert!(json);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli =
            Cli::try_parse_from(["round-robin", "schedule", "--config", "t.toml", "--rounds"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("t.toml")));
        assert!(matches!(cli.command, Commands::Schedule { rounds: true, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        assert!(
            Cli::try_parse_from(["round-robin", "run", "--on-match-error", "retry"]).is_err()
        );
    }

    #[test]
    fn test_overrides_leave_unset_values() {
        let mut config = TournamentConfig {
            cycles: 3,
            ..Default::default()
        };
        Overrides::default().apply(&mut config);
        assert_eq!(config.cycles, 3);
        assert_eq!(config.models_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_cli_help_lists_commands() {
        let mut cmd = Cli::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("run"));
        assert!(help.contains("schedule"));
        assert!(help.contains("participants"));
    }
}
