//! CLI surface: `-k/--topk`, `-p/--processors`, `-i/--input`, `-o/--output`,
//! `-h/--help`, plus `--config` and `--strict` conveniences. Built on
//! `clap::Parser` derive, matching this codebase's other CLI binaries.

use crate::config::MiningConfig;
use crate::data::Database;
use crate::error::PhantomError;
use crate::io;
use crate::Coordinator;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "phantom-mine")]
#[command(about = "Mine the top-K expected-utility itemsets from an uncertain transactional database")]
pub struct Args {
    /// Number of itemsets to keep in the result set.
    #[arg(short = 'k', long = "topk", default_value_t = 10)]
    pub topk: usize,

    /// Number of worker threads to partition the item universe across.
    #[arg(short = 'p', long = "processors", default_value_t = 4)]
    pub processors: usize,

    /// Input database file. Uses a small built-in sample when omitted.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output results file. `-` echoes the same bytes to stdout instead.
    #[arg(short = 'o', long = "output", default_value = "results/output.txt")]
    pub output: PathBuf,

    /// JSON file of `MiningConfig` overrides (CLI-only convenience, not
    /// part of the library surface).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Use the strict-mode bound (`ω = 1`) instead of the default
    /// optimistic `ω = 0.9`.
    #[arg(long = "strict", default_value_t = false)]
    pub strict: bool,
}

/// Runs the CLI end to end: parse args, load the database, mine, write
/// results. Returns `Err` on malformed input or an I/O failure.
pub fn run() -> Result<(), PhantomError> {
    crate::logging::init();
    let args = Args::parse();

    let db = load_database(args.input.as_deref())?;
    log_summary(&db);

    let config = load_config(&args)?;
    let started = Instant::now();
    let coordinator = Coordinator::new(config, args.topk, args.processors);
    let results = coordinator.mine(&db)?;
    let elapsed = started.elapsed().as_millis();

    if args.output == PathBuf::from("-") {
        print!("{}", io::output::render(&results, elapsed));
    } else {
        io::output::write_results(&args.output, &results, elapsed)?;
        log::info!(
            "wrote {} itemsets to {} in {} ms",
            results.len(),
            args.output.display(),
            elapsed
        );
        println!(
            "{} {} itemsets written to {} in {} ms",
            "mined".green().bold(),
            results.len(),
            args.output.display(),
            elapsed
        );
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<MiningConfig, PhantomError> {
    let mut config = match &args.config {
        Some(path) => MiningConfig::load(path).map_err(|e| PhantomError::Config {
            reason: format!("failed to load {}: {e}", path.display()),
        })?,
        None => MiningConfig::default(),
    };
    if args.strict {
        config.omega = 1.0;
    }
    Ok(config)
}

fn load_database(input: Option<&std::path::Path>) -> Result<Database, PhantomError> {
    match input {
        Some(path) => io::input::parse_file(path),
        None => {
            log::warn!("no --input given, mining the built-in sample database");
            io::input::parse_str(SAMPLE_DATABASE)
        }
    }
}

/// Item/transaction counts and the mean/variance of single-item utility,
/// logged only, never written into the CSV output stream.
fn log_summary(db: &Database) {
    let utilities: Vec<f64> = db
        .transactions()
        .iter()
        .flat_map(|t| t.items().map(|(_, (_, u))| *u))
        .collect();
    let n = utilities.len().max(1) as f64;
    let mean = utilities.iter().sum::<f64>() / n;
    let variance = utilities.iter().map(|u| (u - mean).powi(2)).sum::<f64>() / n;

    log::info!(
        "loaded {} transactions over {} items (single-item utility mean={:.3}, variance={:.3})",
        db.transactions().len(),
        db.items().len(),
        mean,
        variance
    );
}

/// Built-in fallback so the CLI has something to mine when `-i` is omitted.
/// Fixture data only, not a replacement for a real sample-data generator;
/// just enough to make `--input` genuinely optional.
const SAMPLE_DATABASE: &str = "\
# built-in sample database
T1 1.0 bread:0.9:10 milk:0.8:15 eggs:0.7:5
T2 1.0 bread:0.95:10 butter:0.6:8 milk:0.85:15
T3 0.9 eggs:0.6:5 butter:0.7:8 spoiled:0.5:-20
T4 1.0 bread:0.9:10 eggs:0.8:5 butter:0.5:8
T5 0.8 milk:0.9:15 spoiled:0.4:-20
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_sample_parses_cleanly() {
        let db = io::input::parse_str(SAMPLE_DATABASE).unwrap();
        assert!(!db.is_empty());
    }

    #[test]
    fn args_parse_defaults() {
        let args = Args::parse_from(["phantom-mine"]);
        assert_eq!(args.topk, 10);
        assert_eq!(args.processors, 4);
        assert_eq!(args.output, PathBuf::from("results/output.txt"));
        assert!(args.input.is_none());
        assert!(args.config.is_none());
        assert!(!args.strict);
    }

    #[test]
    fn args_parse_overrides() {
        let args = Args::parse_from([
            "phantom-mine",
            "-k",
            "5",
            "-p",
            "2",
            "-i",
            "db.txt",
            "-o",
            "out.csv",
            "--strict",
        ]);
        assert_eq!(args.topk, 5);
        assert_eq!(args.processors, 2);
        assert_eq!(args.input, Some(PathBuf::from("db.txt")));
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert!(args.strict);
    }

    #[test]
    fn strict_flag_overrides_loaded_omega() {
        let args = Args::parse_from(["phantom-mine", "--strict"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.omega, 1.0);
    }
}
