use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use emojiart::config::{ConfigError, SessionConfig};
use emojiart::decode::RasterDecoder;
use emojiart::fetch::{FetchError, HttpFetcher};
use emojiart::host::{self, HostCommand, HostError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("fetcher init failed: {0}")]
    Fetcher(#[from] FetchError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Parser, Debug)]
#[command(name = "emojiart", about = "Headless emoji art canvas driven by JSON-lines commands")]
struct Cli {
    /// Read commands from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Stop at the first command that fails instead of reporting and continuing.
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // stdout carries protocol output.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env");
        }
    }

    let cli = Cli::parse();
    let config = SessionConfig::from_env()?;
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let (handle, task) = emojiart::session::spawn_session(&config, RasterDecoder, fetcher);
    tracing::info!(session_id = %handle.id(), "emojiart ready");

    match cli.script {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            run_lines(&handle, BufReader::new(file), cli.strict).await?;
        }
        None => run_lines(&handle, BufReader::new(tokio::io::stdin()), cli.strict).await?,
    }

    drop(handle);
    if let Err(e) = task.await {
        tracing::error!(error = %e, "session task failed");
    }
    Ok(())
}

async fn run_lines<R, I>(
    handle: &emojiart::session::SessionHandle<I>,
    reader: R,
    strict: bool,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    I: Clone,
{
    let mut stdout = tokio::io::stdout();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let output = match HostCommand::parse(line) {
            Ok(command) => host::execute(handle, command).await,
            Err(e) => Err(e),
        };
        let value = match output {
            Ok(Some(value)) => value,
            Ok(None) => continue,
            Err(e) if strict => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "command failed");
                serde_json::json!({ "error": e.to_string() })
            }
        };
        let mut encoded = serde_json::to_vec(&value)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }
    Ok(())
}
