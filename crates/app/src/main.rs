use std::fmt;
use std::io;

use fraction_core::metrics::MetricStatus;
use fraction_core::model::{FINISHED_SESSION, SessionNumber, SessionStatus};
use fraction_core::settings::CurriculumSettings;
use services::{AppServices, Clock, MetricsReport, NextStep};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, prelude::*};

mod terminal;

use terminal::{Prompter, run_session};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidSession { raw: String },
    InvalidTarget { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSession { raw } => {
                write!(f, "invalid --session value: {raw} (expected 1-5)")
            }
            ArgsError::InvalidTarget { raw } => {
                write!(f, "invalid --target-accuracy value: {raw}")
            }
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  fractions run     [--session <1-5>] [options]");
    eprintln!("  fractions status  [options]");
    eprintln!("  fractions metrics [--json] [options]");
    eprintln!("  fractions reset   --yes [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>          default sqlite://fractions.sqlite3");
    eprintln!("  --target-accuracy <pct>    practice target, default 82.5");
    eprintln!("  --seed <u64>               reproducible exercises");
    eprintln!("  --verbose                  debug logging");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FRACTIONS_DB_URL, FRACTIONS_TARGET_ACCURACY, FRACTIONS_SEED, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Status,
    Metrics,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "status" => Some(Self::Status),
            "metrics" => Some(Self::Metrics),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    target_accuracy: Option<f64>,
    seed: Option<u64>,
    session: Option<SessionNumber>,
    json: bool,
    confirmed: bool,
    verbose: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("FRACTIONS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://fractions.sqlite3".into(), normalize_sqlite_url);
        let mut target_accuracy = std::env::var("FRACTIONS_TARGET_ACCURACY")
            .ok()
            .map(|raw| parse_target(&raw))
            .transpose()?;
        let mut seed = std::env::var("FRACTIONS_SEED")
            .ok()
            .map(|raw| parse_seed(&raw))
            .transpose()?;
        let mut session = None;
        let mut json = false;
        let mut confirmed = false;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--target-accuracy" => {
                    let value = require_value(args, "--target-accuracy")?;
                    target_accuracy = Some(parse_target(&value)?);
                }
                "--seed" => seed = Some(parse_seed(&require_value(args, "--seed")?)?),
                "--session" => {
                    let value = require_value(args, "--session")?;
                    let parsed = value
                        .parse::<u8>()
                        .ok()
                        .and_then(|n| SessionNumber::new(n).ok())
                        .ok_or(ArgsError::InvalidSession { raw: value })?;
                    session = Some(parsed);
                }
                "--json" => json = true,
                "--yes" => confirmed = true,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            target_accuracy,
            seed,
            session,
            json,
            confirmed,
            verbose,
        })
    }

    fn settings(&self) -> Result<CurriculumSettings, fraction_core::Error> {
        let defaults = CurriculumSettings::default();
        Ok(match self.target_accuracy {
            Some(target) => defaults.with_target_accuracy(target)?,
            None => defaults,
        })
    }
}

fn parse_target(raw: &str) -> Result<f64, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidTarget {
        raw: raw.to_string(),
    })
}

fn parse_seed(raw: &str) -> Result<u64, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidSeed {
        raw: raw.to_string(),
    })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(
            log_fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

fn status_label(status: MetricStatus) -> &'static str {
    match status {
        MetricStatus::Success => "ok",
        MetricStatus::Warning => "warn",
        MetricStatus::Failure => "low",
    }
}

fn print_report(report: &MetricsReport) {
    println!(
        "Mastery rate           {:>6.1}%  [{}]",
        report.mastery_rate.value,
        status_label(report.mastery_rate.status)
    );
    println!(
        "Error reduction        {:>6.1}%  [{}]",
        report.error_reduction.value,
        status_label(report.error_reduction.status)
    );
    println!(
        "Engagement efficiency  {:>6.1}%  [{}]",
        report.engagement_efficiency.value,
        status_label(report.engagement_efficiency.status)
    );
    println!("Logged errors          {:>6}", report.error_count);
    if report.sessions.is_empty() {
        println!("\nNo sessions recorded yet.");
        return;
    }
    println!("\nSession  Minutes  Accuracy  Quiz     Passed");
    for row in &report.sessions {
        let minutes = row
            .duration_minutes
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        let quiz = row
            .quiz_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.2}%"));
        println!(
            "{:>7}  {:>7}  {:>7.1}%  {:>7}  {}",
            row.session_number,
            minutes,
            row.accuracy,
            quiz,
            if row.passed { "yes" } else { "no" }
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut iter = argv.into_iter().peekable();

    let first = iter.peek().cloned();
    let cmd = match first.as_deref() {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Run,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            iter.next();
            cmd
        }
    };

    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_logging(parsed.verbose);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let settings = parsed.settings()?;
    let app = AppServices::new_sqlite(&parsed.db_url, Clock::system(), settings, parsed.seed).await?;
    info!(db = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Run => {
            let progress = app.progress().progress().await?;
            let number = match parsed.session {
                Some(number) => number,
                None if progress.current_session() >= FINISHED_SESSION => {
                    println!("All sessions are complete. Run `fractions metrics` for results.");
                    return Ok(());
                }
                None => SessionNumber::new(progress.current_session())?,
            };

            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stdout());
            match run_session(&app.session_loop(), number, &mut prompter).await? {
                Some(NextStep::Session(next)) => {
                    println!("Session {next} is unlocked. Run `fractions run` to continue.");
                }
                Some(NextStep::FinalResults) => {
                    println!("\nCurriculum complete! Final results:\n");
                    print_report(&app.metrics().report().await?);
                }
                None => println!("Progress saved. Come back any time."),
            }
            Ok(())
        }
        Command::Status => {
            let progress = app.progress().progress().await?;
            for (number, status) in progress.curriculum() {
                let label = match status {
                    SessionStatus::Completed => "completed",
                    SessionStatus::Current => "current",
                    SessionStatus::Available => "available",
                    SessionStatus::Locked => "locked",
                };
                println!("Session {number}: {label}");
            }
            println!(
                "\nDifficulty {:.1}, last practice accuracy {:.1}%",
                progress.adaptive_difficulty(),
                progress.last_practice_accuracy()
            );
            Ok(())
        }
        Command::Metrics => {
            let report = app.metrics().report().await?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Command::Reset => {
            if !parsed.confirmed {
                eprintln!("reset deletes all progress and history; pass --yes to confirm");
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "reset not confirmed").into());
            }
            app.progress().reset_all().await?;
            println!("All progress cleared.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
