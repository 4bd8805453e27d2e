mod config;

use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::UserId;
use services::{
    AccountService, AppServices, Clock, QuestionService, QuizRunner, QuizService, ScoreService,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

use crate::config::{AppConfig, ArgsError, Command, print_usage};

const DEFAULT_LOG_FILTER: &str = "app=info,services=info,storage=warn";

struct DesktopApp {
    prefill_user: Option<UserId>,
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn prefill_user(&self) -> Option<UserId> {
        self.prefill_user.clone()
    }

    fn quiz(&self) -> Arc<QuizService> {
        self.services.quiz()
    }

    fn runner(&self) -> Arc<QuizRunner> {
        self.services.runner()
    }

    fn questions(&self) -> Arc<QuestionService> {
        self.services.questions()
    }

    fn accounts(&self) -> Arc<AccountService> {
        self.services.accounts()
    }

    fn scores(&self) -> Arc<ScoreService> {
        self.services.scores()
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(ArgsError::HelpRequested) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let services =
        AppServices::new_sqlite(&config.db_url, Clock::default_clock(), config.admin.clone())
            .await?;
    info!(db_url = %config.db_url, command = ?config.command, "storage ready");

    match config.command {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                prefill_user: config.prefill_user,
                services,
            });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
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
        Command::Seed => {
            let questions = services.questions().list_questions().await?;
            let scores = services.scores().list_all().await?;
            info!(
                questions = questions.len(),
                scores = scores.len(),
                admin_configured = config.admin.is_some(),
                "database initialized"
            );
            Ok(())
        }
    }
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

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "quiz app failed");
        std::process::exit(2);
    }
}
