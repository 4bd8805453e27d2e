use std::fmt;

use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{QuestionDraft, Response, ScoreDraft, UserId};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    questions: u32,
    scores: u32,
    user: String,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidQuestions { raw: String },
    InvalidScores { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidScores { raw } => write!(f, "invalid --scores value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3?mode=rwc".into());
        let mut questions = std::env::var("QUIZ_SEED_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut scores = std::env::var("QUIZ_SEED_SCORES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(2);
        let mut user = std::env::var("QUIZ_USER_ID").unwrap_or_else(|_| "demo".into());
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidQuestions { raw: value.clone() })?;
                }
                "--scores" => {
                    let value = require_value(&mut args, "--scores")?;
                    scores = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidScores { raw: value.clone() })?;
                }
                "--user" => {
                    user = require_value(&mut args, "--user")?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions,
            scores,
            user,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3?mode=rwc)");
    eprintln!("  --questions <n>           Number of sample questions to insert (default: 5)");
    eprintln!("  --scores <n>              Number of sample score records to append (default: 2)");
    eprintln!("  --user <id>               User the sample scores belong to (default: demo)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_SEED_QUESTIONS, QUIZ_SEED_SCORES, QUIZ_USER_ID");
}

const SAMPLES: [(&str, [&str; 4], &str, u32); 5] = [
    ("What is 2 + 2?", ["3", "4", "5", "22"], "B", 20),
    (
        "Which planet is known as the red planet?",
        ["Venus", "Jupiter", "Mars", "Mercury"],
        "C",
        30,
    ),
    (
        "Which keyword declares an immutable binding in Rust?",
        ["let", "var", "const mut", "static mut"],
        "A",
        30,
    ),
    (
        "How many bits are in a byte?",
        ["4", "16", "32", "8"],
        "D",
        15,
    ),
    (
        "What is the boiling point of water at sea level in Celsius?",
        ["90", "100", "110", "120"],
        "B",
        25,
    ),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut inserted = Vec::new();
    for i in 0..args.questions {
        let idx = (i as usize) % SAMPLES.len();
        let (prompt, options, correct, secs) = SAMPLES[idx];
        let validated = QuestionDraft {
            kind: "mcq".into(),
            prompt: prompt.into(),
            options: options.map(String::from),
            correct_answer: correct.into(),
            time_limit_secs: Some(secs),
        }
        .validate()?;
        let correct_answer = validated.correct_answer;
        let id = storage.questions.insert_question(&validated).await?;
        inserted.push((id, correct_answer));
    }

    let user_id = UserId::new(args.user.clone())?;
    for i in 0..args.scores {
        let submitted_at = now - Duration::days(i64::from(i));
        // Alternate between perfect and half-answered attempts.
        let take = if i % 2 == 0 {
            inserted.len()
        } else {
            inserted.len() / 2
        };
        let responses: Vec<Response> = inserted
            .iter()
            .take(take)
            .map(|(question_id, correct)| Response {
                question_id: *question_id,
                selected: *correct,
                is_correct: true,
            })
            .collect();
        let draft = ScoreDraft {
            user_id: user_id.clone(),
            score: u32::try_from(responses.len())?,
            responses,
        };
        let _ = storage.scores.append_score(&draft, submitted_at).await?;
    }

    println!(
        "Seeded {} questions and {} score records for {} into {}",
        inserted.len(),
        args.scores,
        user_id,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
