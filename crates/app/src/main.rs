use std::fmt;
use std::io;
use std::path::Path;

use flash_core::challenge::DEFAULT_DAILY_GOAL;
use flash_core::leaderboard::LevelOrdering;
use services::{AppServices, Clock, StudySettings};
use storage::repository::StoreLocation;

mod shell;

use shell::Shell;

const DEFAULT_STORE: &str = "user_data.json.gz";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidStore { raw: String },
    InvalidDailyGoal { raw: String },
    InvalidLeaderboard { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStore { raw } => write!(f, "invalid --store value: {raw}"),
            ArgsError::InvalidDailyGoal { raw } => {
                write!(f, "invalid --daily-goal value: {raw} (expected a positive number)")
            }
            ArgsError::InvalidLeaderboard { raw } => {
                write!(f, "invalid --leaderboard value: {raw} (expected lexical or skill)")
            }
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
    eprintln!("  flashcards [--store <path|sqlite_url|memory>] [--daily-goal <n>] [--leaderboard <lexical|skill>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --store {DEFAULT_STORE}");
    eprintln!("  --daily-goal {DEFAULT_DAILY_GOAL}");
    eprintln!("  --leaderboard lexical");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLASHCARDS_STORE, FLASHCARDS_DAILY_GOAL, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    store: StoreLocation,
    settings: StudySettings,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut store = match std::env::var("FLASHCARDS_STORE") {
            Ok(raw) => parse_store(raw)?,
            Err(_) => StoreLocation::parse(DEFAULT_STORE),
        };
        let mut settings = StudySettings::default();
        if let Ok(raw) = std::env::var("FLASHCARDS_DAILY_GOAL") {
            settings.daily_goal = parse_goal(raw)?;
        }

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store" => {
                    store = parse_store(require_value(args, "--store")?)?;
                }
                "--daily-goal" => {
                    settings.daily_goal = parse_goal(require_value(args, "--daily-goal")?)?;
                }
                "--leaderboard" => {
                    let value = require_value(args, "--leaderboard")?;
                    settings.leaderboard = value
                        .parse::<LevelOrdering>()
                        .map_err(|_| ArgsError::InvalidLeaderboard { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { store, settings })
    }
}

fn parse_store(raw: String) -> Result<StoreLocation, ArgsError> {
    if raw.trim().is_empty() {
        return Err(ArgsError::InvalidStore { raw });
    }
    match StoreLocation::parse(&raw) {
        StoreLocation::Sqlite(url) => Ok(StoreLocation::Sqlite(normalize_sqlite_url(url))),
        other => Ok(other),
    }
}

fn parse_goal(raw: String) -> Result<u32, ArgsError> {
    match raw.trim().parse::<u32>() {
        Ok(goal) if goal > 0 => Ok(goal),
        _ => Err(ArgsError::InvalidDailyGoal { raw }),
    }
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
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the sqlite file and its parent directory exist before connecting.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidStore {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidStore {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if let StoreLocation::Sqlite(url) = &parsed.store {
        prepare_sqlite_file(url)?;
    }
    log::info!("opening store {:?}", parsed.store);

    let app = AppServices::open(&parsed.store, Clock::default_clock(), parsed.settings).await?;
    let directory = app.load_directory().await?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(app, directory, stdin.lock(), stdout.lock());
    shell.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--store",
            "memory",
            "--daily-goal",
            "3",
            "--leaderboard",
            "skill",
        ])
        .unwrap();
        assert_eq!(args.store, StoreLocation::Memory);
        assert_eq!(args.settings.daily_goal, 3);
        assert_eq!(args.settings.leaderboard, LevelOrdering::Skill);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            parse(&["--daily-goal", "0"]),
            Err(ArgsError::InvalidDailyGoal { .. })
        ));
        assert!(matches!(
            parse(&["--leaderboard", "alphabetical"]),
            Err(ArgsError::InvalidLeaderboard { .. })
        ));
        assert!(matches!(
            parse(&["--store"]),
            Err(ArgsError::MissingValue { flag: "--store" })
        ));
        assert!(matches!(
            parse(&["--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/users.db".to_owned());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/users.db"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".to_owned()),
            "sqlite::memory:"
        );
    }
}
