//! Crackd CLI — upload an image, generate captions, browse and vote.
//!
//! Set CRACKD_API_URL for the caption pipeline and CRACKD_ACCESS_TOKEN for
//! auth. Caption listing and voting additionally need CRACKD_STORE_URL and
//! CRACKD_STORE_API_KEY.

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use std::io::IsTerminal;

use crackd_cli::{init_tracing, truncate_string, StatusLine};
use crackd_core::models::{vote_totals, AuthSession, CaptionRow, WorkflowStage};
use crackd_core::Config;
use crackd_pipeline::workflow::ProgressSink;
use crackd_pipeline::{
    CaptionStore, EnvSession, PipelineClient, RetryPolicy, SessionProvider, UploadWorkflow,
};

#[derive(Parser)]
#[command(name = "crackd", about = "Crackd caption pipeline CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and generate captions for it
    Generate {
        /// Path to the image file (jpeg, jpg, png, webp, gif, or heic)
        file: std::path::PathBuf,
        /// Content type override; inferred from the extension if omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// List captions with vote totals, newest first
    Captions {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Vote on a caption (one vote per user, revoting replaces it)
    Vote {
        /// Caption UUID
        caption_id: Uuid,
        /// Cast a downvote instead of an upvote
        #[arg(long)]
        down: bool,
    },
}

/// Renders workflow announcements on stderr. Each announcement replaces the
/// previous one in place on a terminal; piped stderr gets one line each.
struct StderrProgress {
    line: StatusLine<std::io::Stderr>,
}

impl StderrProgress {
    fn new() -> Self {
        let interactive = std::io::stderr().is_terminal();
        StderrProgress {
            line: StatusLine::new(std::io::stderr(), interactive),
        }
    }
}

impl ProgressSink for StderrProgress {
    fn on_progress(&mut self, stage: WorkflowStage, detail: &str) {
        self.line.update(detail);
        if matches!(stage, WorkflowStage::Completed | WorkflowStage::Failed) {
            self.line.finish();
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[derive(Serialize)]
struct CaptionListing {
    id: Uuid,
    text: String,
    votes: i64,
    created_datetime_utc: chrono::DateTime<chrono::Utc>,
}

async fn generate(
    config: &Config,
    session: Option<AuthSession>,
    file: std::path::PathBuf,
    content_type: Option<String>,
) -> anyhow::Result<()> {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("File path has no file name")?;
    let data = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let selected = crackd_core::models::SelectedFile::new(
        name,
        content_type.unwrap_or_default(),
        Bytes::from(data),
    );

    let client = PipelineClient::from_config(config)?;
    let mut workflow = UploadWorkflow::new(&client, RetryPolicy::from_config(config));
    let done = workflow
        .run(Some(selected), session.as_ref(), &mut StderrProgress::new())
        .await?;

    print_json(&done)
}

async fn list_captions(
    config: &Config,
    session: Option<&AuthSession>,
    format: &str,
) -> anyhow::Result<()> {
    let store = CaptionStore::from_config(config)?;
    let bearer = store_bearer(config, session)?;

    let captions = store.list_captions(&bearer).await?;
    let ids: Vec<Uuid> = captions.iter().map(|c| c.id).collect();
    let votes = store.list_votes(&bearer, &ids).await?;
    let totals = vote_totals(&votes);

    let listings: Vec<CaptionListing> = captions
        .into_iter()
        .map(|row: CaptionRow| CaptionListing {
            votes: totals.get(&row.id).copied().unwrap_or(0),
            id: row.id,
            text: row.text,
            created_datetime_utc: row.created_datetime_utc,
        })
        .collect();

    match format {
        "json" => print_json(&listings),
        _ => {
            print_caption_table(&listings);
            Ok(())
        }
    }
}

fn print_caption_table(listings: &[CaptionListing]) {
    if listings.is_empty() {
        println!("No captions found.");
        return;
    }

    println!(
        "{:<36} {:>6} {:<50} {:>20}",
        "ID", "Votes", "Caption", "Created At"
    );
    println!("{}", "-".repeat(116));
    for listing in listings {
        println!(
            "{:<36} {:>6} {:<50} {:>20}",
            listing.id,
            listing.votes,
            truncate_string(&listing.text, 50),
            listing.created_datetime_utc.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

async fn vote(
    config: &Config,
    session: Option<&AuthSession>,
    caption_id: Uuid,
    down: bool,
) -> anyhow::Result<()> {
    let session = session.context("Voting requires a session. Set CRACKD_ACCESS_TOKEN")?;
    let profile_id: Uuid = session
        .user_id
        .as_deref()
        .context("Voting requires CRACKD_USER_ID")?
        .parse()
        .context("CRACKD_USER_ID is not a valid UUID")?;

    let store = CaptionStore::from_config(config)?;
    let vote_value = if down { -1 } else { 1 };
    store
        .cast_vote(&session.access_token, caption_id, profile_id, vote_value)
        .await?;

    print_json(&serde_json::json!({
        "caption_id": caption_id,
        "vote_value": vote_value,
    }))
}

/// Store reads run as the signed-in user when a session exists, otherwise
/// anonymously with the api key as the bearer.
fn store_bearer(config: &Config, session: Option<&AuthSession>) -> anyhow::Result<String> {
    if let Some(session) = session {
        return Ok(session.access_token.clone());
    }
    config
        .store_api_key
        .clone()
        .context("CRACKD_STORE_API_KEY is not set")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    let session = EnvSession.active_session();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { file, content_type } => {
            generate(&config, session, file, content_type).await?;
        }
        Commands::Captions { format } => {
            list_captions(&config, session.as_ref(), &format).await?;
        }
        Commands::Vote { caption_id, down } => {
            vote(&config, session.as_ref(), caption_id, down).await?;
        }
    }

    Ok(())
}
