//! Warden replay tool
//!
//! Feeds a JSON-lines script of game server hooks and state changes through
//! the moderation core and prints one JSON outcome per step. Useful for
//! checking a policy file against a recorded session, or for poking at the
//! history store a live server writes to.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
use warden_core::{KeyValueEffects, PolicyEffects, WardenError};
use warden_effects::{FileKvHandler, MemoryKvHandler, TokioTimerHandler, TomlPolicyHandler};

mod replay;
mod script;

use replay::{Reloader, Replayer};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Replay game server hooks through the warden moderation core", long_about = None)]
struct Cli {
    /// Script to replay; reads stdin when omitted
    script: Option<PathBuf>,

    /// Policy file (TOML, one table per namespace)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persist player history to this JSON snapshot instead of memory
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Wait for pending vote confirmations before exiting
    #[arg(long)]
    drain: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store: Arc<dyn KeyValueEffects> = match &cli.store {
        Some(path) => Arc::new(
            FileKvHandler::open(path)
                .await
                .with_context(|| format!("opening store {}", path.display()))?,
        ),
        None => Arc::new(MemoryKvHandler::new()),
    };

    let (policy, reload): (Arc<dyn PolicyEffects>, Option<Reloader>) = match &cli.config {
        Some(path) => {
            let handler = Arc::new(
                TomlPolicyHandler::load(path)
                    .with_context(|| format!("loading policy {}", path.display()))?,
            );
            let reloader = handler.clone();
            let reload: Reloader =
                Box::new(move || reloader.reload().map_err(WardenError::from));
            (handler as Arc<dyn PolicyEffects>, Some(reload))
        }
        None => (Arc::new(TomlPolicyHandler::default()) as Arc<dyn PolicyEffects>, None),
    };

    let timer = Arc::new(TokioTimerHandler::new());
    let replayer = Replayer::new(store, timer.clone(), policy, reload);

    match &cli.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening script {}", path.display()))?;
            run_script(&replayer, file).await?;
        }
        None => run_script(&replayer, tokio::io::stdin()).await?,
    }

    if cli.drain {
        while timer.pending() > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        tracing::info!(decisions = ?replayer.server().decisions(), "Drained confirmations");
    }
    timer.shutdown();
    Ok(())
}

async fn run_script(replayer: &Replayer, input: impl AsyncRead + Unpin) -> Result<()> {
    let mut lines = BufReader::new(input).lines();
    let mut stdout = tokio::io::stdout();
    let mut number = 0usize;

    while let Some(line) = lines.next_line().await.context("reading script")? {
        number += 1;
        let outcome = match script::parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(step)) => {
                let op = step.name();
                match replayer.execute(step).await {
                    Ok(result) => json!({ "line": number, "op": op, "result": result }),
                    Err(error) => {
                        tracing::warn!(line = number, op, %error, "Step failed");
                        json!({ "line": number, "op": op, "error": error.to_string() })
                    }
                }
            }
            Err(error) => {
                tracing::warn!(line = number, %error, "Skipping malformed script line");
                json!({ "line": number, "error": format!("malformed step: {error}") })
            }
        };
        let mut rendered = serde_json::to_vec(&outcome)?;
        rendered.push(b'\n');
        stdout.write_all(&rendered).await?;
    }
    stdout.flush().await?;
    Ok(())
}
