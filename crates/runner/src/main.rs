//! `assist-runner` -- escalation assist job client.
//!
//! Submits an escalation to the AI backend, polls for the answer, posts it
//! to the originating Slack thread, and records reviewer votes.
//!
//! Configuration comes from the environment (and a `.env` file when
//! present); see `AssistConfig::from_env` for the variable table.
//!
//! | Variable     | Default | Description                         |
//! |--------------|---------|-------------------------------------|
//! | `RUST_LOG`   | --      | tracing filter directives           |
//! | `LOG_FORMAT` | `text`  | `json` for one JSON object per line |

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assist_backend::{BackendApi, FeedbackRecorder};
use assist_core::{AnswerId, AssistConfig, IntakeRecord};
use assist_delivery::{SlackConversation, ThreadRef};
use assist_runner::Workflow;

const DEFAULT_LOG_FILTER: &str = "assist_runner=info,assist_backend=info,assist_delivery=info";

#[derive(Debug, Parser)]
#[command(name = "assist-runner", version, about = "Escalation assist job client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit an intake record, wait for the answer and publish it.
    Run {
        /// JSON file holding the intake record.
        #[arg(long)]
        intake: PathBuf,
        /// Channel of the escalation message.
        #[arg(long)]
        channel: String,
        /// Timestamp of the escalation message to reply under.
        #[arg(long)]
        message_ts: String,
    },
    /// Record a reviewer vote on an answer.
    Vote {
        #[arg(long)]
        answer_id: String,
        /// `Good`, `Bad`, or an emoji name.
        #[arg(long)]
        feedback: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Remove a reviewer vote from an answer.
    Unvote {
        #[arg(long)]
        answer_id: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AssistConfig::from_env().context("Failed to load configuration")?;
    let api = BackendApi::new(&config.backend).context("Failed to build backend client")?;

    tracing::info!(
        production = config.environment.is_production(),
        variant = config.variant.as_str(),
        base_url = api.base_url(),
        "Starting assist-runner",
    );

    match cli.command {
        Command::Run {
            intake,
            channel,
            message_ts,
        } => {
            let raw = std::fs::read_to_string(&intake)
                .with_context(|| format!("Failed to read {}", intake.display()))?;
            let record: IntakeRecord = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid intake record in {}", intake.display()))?;
            let conversation =
                SlackConversation::new(&config.slack, config.backend.request_timeout)
                    .context("Failed to build Slack client")?;

            let workflow = Workflow::new(&config, api, conversation);
            let thread = ThreadRef {
                channel,
                message_ts,
            };
            let report = workflow.run(&record, &thread).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Vote {
            answer_id,
            feedback,
            comment,
        } => {
            let answer_id = AnswerId::new(answer_id);
            let report = FeedbackRecorder::new(api)
                .record(Some(&answer_id), &feedback, comment.as_deref())
                .await;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::Unvote { answer_id } => {
            let answer_id = AnswerId::new(answer_id);
            let report = FeedbackRecorder::new(api).remove(Some(&answer_id)).await;
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    Ok(())
}
