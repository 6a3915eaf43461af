use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::Clock;
use services::{
    AppServices, AttemptRecorder, DashboardService, LocalSessionProvider, QuizCatalog,
    QuizRunner, SessionGatekeeper, SessionProvider,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
const DEFAULT_CONFIG: &str = "quiz.toml";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidConfigPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidConfigPath { raw } => write!(f, "invalid --config value: {raw}"),
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

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn catalog(&self) -> Arc<QuizCatalog> {
        self.services.catalog()
    }

    fn sessions(&self) -> Arc<dyn SessionProvider> {
        self.services.sessions()
    }

    fn gatekeeper(&self) -> Arc<SessionGatekeeper> {
        self.services.gatekeeper()
    }

    fn quiz_runner(&self) -> Arc<QuizRunner> {
        self.services.quiz_runner()
    }

    fn recorder(&self) -> Arc<AttemptRecorder> {
        self.services.recorder()
    }

    fn dashboard(&self) -> Arc<DashboardService> {
        self.services.dashboard()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    config: PathBuf,
    user: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [ui] [--db <sqlite_url>] [--config <path>] [--user <email>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --config {DEFAULT_CONFIG}  (built-in html/css/js quizzes when missing)");
    eprintln!("  --user    start signed out");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CONFIG, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            _ => None,
        }
    }
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url =
            env("QUIZ_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut config =
            env("QUIZ_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
        let mut user = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--config" => {
                    let value = require_value(args, "--config")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidConfigPath { raw: value });
                    }
                    config = PathBuf::from(value);
                }
                "--user" => user = Some(require_value(args, "--user")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            config,
            user,
        })
    }
}

const MEMORY_DB_URL: &str = "sqlite::memory:";

fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim();
    if raw == MEMORY_DB_URL || raw.starts_with("sqlite://") {
        return raw.to_string();
    }

    let path = PathBuf::from(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir().map_or_else(|_| path.clone(), |cwd| cwd.join(&path))
    };
    format!("sqlite://{}", path.display())
}

/// Database file behind a `sqlite://` URL; `None` for in-memory databases.
fn sqlite_file_path(db_url: &str) -> Result<Option<PathBuf>, ArgsError> {
    if db_url == MEMORY_DB_URL {
        return Ok(None);
    }
    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
        .filter(|path| !path.is_empty())
        .ok_or_else(invalid)?;
    Ok(Some(PathBuf::from(path)))
}

/// `SQLite` refuses to open a missing file in a missing directory.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = sqlite_file_path(db_url)? else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok(())
}

fn session_provider(
    user: Option<&str>,
) -> Result<Arc<dyn SessionProvider>, Box<dyn std::error::Error>> {
    Ok(match user {
        Some(email) => Arc::new(LocalSessionProvider::signed_in_as(email)?),
        None => Arc::new(LocalSessionProvider::new()),
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();

    // Flags without a subcommand launch the UI.
    let first = argv.peek().cloned();
    let cmd = match first.as_deref() {
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        None => Command::Ui,
        Some(flag) if flag.starts_with("--") => Command::Ui,
        Some(name) => {
            let cmd = Command::from_arg(name).ok_or_else(|| {
                eprintln!("unknown subcommand: {name}");
                print_usage();
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            argv.next();
            cmd
        }
    };

    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Ui => {
            prepare_sqlite_file(&parsed.db_url)?;
            let catalog = QuizCatalog::load_or_builtin(&parsed.config)?;
            let sessions = session_provider(parsed.user.as_deref())?;
            let services =
                AppServices::new_sqlite(&parsed.db_url, sessions, catalog, Clock::system())
                    .await?;
            info!(
                db = %parsed.db_url,
                config = %parsed.config.display(),
                quizzes = services.catalog().pages().len(),
                "starting quiz app"
            );

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
            let context = build_app_context(&app);

            // Some dev setups default to an always-on-top window.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Quiz")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    log_fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
