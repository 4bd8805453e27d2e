//! Launch configuration: `.env`, then environment variables, then CLI flags.

use std::fmt;

use quiz_core::model::UserId;
use services::AdminBootstrap;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

const ENV_DB_URL: &str = "QUIZ_DB_URL";
const ENV_USER_ID: &str = "QUIZ_USER_ID";
const ENV_ADMIN_USER: &str = "QUIZ_ADMIN_USER";
const ENV_ADMIN_PASSWORD: &str = "QUIZ_ADMIN_PASSWORD";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    IncompleteAdmin,
    HelpRequested,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid user id: {raw:?}"),
            ArgsError::IncompleteAdmin => write!(
                f,
                "{ENV_ADMIN_USER} and {ENV_ADMIN_PASSWORD} must be set together"
            ),
            ArgsError::HelpRequested => write!(f, "help requested"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub command: Command,
    pub db_url: String,
    pub prefill_user: Option<UserId>,
    pub admin: Option<AdminBootstrap>,
}

impl AppConfig {
    /// Load `.env` (if present), then read the process environment and arguments.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for malformed flags or inconsistent environment values.
    pub fn load() -> Result<Self, ArgsError> {
        let _ = dotenvy::dotenv();
        Self::from_sources(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    /// Build a config from an environment lookup and the arguments after the binary name.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for malformed flags or inconsistent environment values.
    pub fn from_sources<E, I>(env: E, args: I) -> Result<Self, ArgsError>
    where
        E: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let mut args = args.into_iter().peekable();

        // No subcommand launches the UI.
        let command = match args.peek().map(String::as_str) {
            None => Command::Ui,
            Some(first) if first.starts_with('-') => Command::Ui,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?;
                args.next();
                command
            }
        };

        let mut db_url = env(ENV_DB_URL).map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut prefill_user = env(ENV_USER_ID).map(parse_user).transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    prefill_user = Some(parse_user(value)?);
                }
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let admin = match (env(ENV_ADMIN_USER), env(ENV_ADMIN_PASSWORD)) {
            (Some(username), Some(password)) => Some(AdminBootstrap { username, password }),
            (None, None) => None,
            _ => return Err(ArgsError::IncompleteAdmin),
        };

        Ok(Self {
            command,
            db_url,
            prefill_user,
            admin,
        })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>] [--user <user_id>]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  {ENV_DB_URL}, {ENV_USER_ID}, {ENV_ADMIN_USER}, {ENV_ADMIN_PASSWORD}, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_user(raw: String) -> Result<UserId, ArgsError> {
    UserId::new(raw.clone()).map_err(|_| ArgsError::InvalidUserId { raw })
}

/// Turn a bare path or `sqlite:` path into an absolute `sqlite://` url.
#[must_use]
pub fn normalize_sqlite_url(raw: String) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn parse(env: &[(&str, &str)], args: &[&str]) -> Result<AppConfig, ArgsError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_sources(
            |key| env.get(key).cloned(),
            args.iter().map(|arg| (*arg).to_string()),
        )
    }

    #[test]
    fn defaults_launch_ui_against_local_file() {
        let config = parse(&[], &[]).unwrap();
        assert_eq!(config.command, Command::Ui);
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert!(config.prefill_user.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn flags_override_environment() {
        let config = parse(
            &[(ENV_DB_URL, "sqlite:///tmp/env.db"), (ENV_USER_ID, "amy")],
            &["ui", "--db", "/tmp/flag.db", "--user", "ben"],
        )
        .unwrap();
        assert_eq!(config.db_url, "sqlite:///tmp/flag.db");
        assert_eq!(config.prefill_user.unwrap().as_str(), "ben");
    }

    #[test]
    fn seed_subcommand_and_admin_bootstrap() {
        let config = parse(
            &[(ENV_ADMIN_USER, "root"), (ENV_ADMIN_PASSWORD, "pw")],
            &["seed"],
        )
        .unwrap();
        assert_eq!(config.command, Command::Seed);
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(admin.password, "pw");
    }

    #[test]
    fn half_configured_admin_is_rejected() {
        let err = parse(&[(ENV_ADMIN_USER, "root")], &[]).unwrap_err();
        assert_eq!(err, ArgsError::IncompleteAdmin);
    }

    #[test]
    fn blank_env_values_count_as_unset() {
        let config = parse(&[(ENV_DB_URL, "  "), (ENV_USER_ID, "")], &[]).unwrap();
        assert_eq!(config.db_url, DEFAULT_DB_URL);
        assert!(config.prefill_user.is_none());
    }

    #[test]
    fn malformed_arguments_are_reported() {
        assert_eq!(
            parse(&[], &["--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert_eq!(
            parse(&[], &["serve"]).unwrap_err(),
            ArgsError::UnknownCommand("serve".into())
        );
        assert_eq!(
            parse(&[], &["--verbose"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert!(matches!(
            parse(&[], &["--user", " "]).unwrap_err(),
            ArgsError::InvalidUserId { .. }
        ));
        assert_eq!(parse(&[], &["-h"]).unwrap_err(), ArgsError::HelpRequested);
    }

    #[test]
    fn normalizes_sqlite_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/quiz.db".into()),
            "sqlite:///var/quiz.db"
        );
        assert!(normalize_sqlite_url("quiz.db".into()).ends_with("/quiz.db"));
    }
}
