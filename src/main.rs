#![forbid(unsafe_code)]

//! `benchdash`: replay recorded push events through the session engine.
//!
//! Reads newline-delimited event frames, applies them in order while the
//! runtime ticker keeps rendering, and prints the final snapshot as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use benchdash::channel::codec::EventCodec;
use benchdash::clock::SystemClock;
use benchdash::driver::OfflineSender;
use benchdash::orchestrator::{spawn_event_consumer, RuntimeTicker, SessionController};
use benchdash::presenter::LogPresenter;
use benchdash::{AppError, GlobalConfig, Result, SessionEngine};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "benchdash", about = "Benchmark console session engine", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply a recorded NDJSON event log and print the final snapshot.
    Replay {
        /// File of `{"event": ..., "data": ...}` frames, one per line.
        #[arg(long)]
        events: PathBuf,

        /// Keep ticking this long after the last event (milliseconds).
        #[arg(long, default_value_t = 0)]
        linger_ms: u64,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    info!(?config, "configuration loaded");

    match args.command {
        Command::Replay { events, linger_ms } => {
            replay(&config, &events, Duration::from_millis(linger_ms)).await
        }
    }
}

async fn replay(config: &GlobalConfig, events: &Path, linger: Duration) -> Result<()> {
    let engine = SessionEngine::from_config(config, Arc::new(SystemClock::new()));
    let controller = Arc::new(SessionController::new(
        engine,
        Arc::new(OfflineSender),
        Arc::new(LogPresenter),
    ));

    let ct = CancellationToken::new();
    let (tx, rx) = mpsc::channel(config.event_buffer);
    let consumer = spawn_event_consumer(rx, Arc::clone(&controller), ct.clone());
    let ticker = RuntimeTicker::new(config.tick_interval(), Arc::clone(&controller), ct.clone())
        .spawn();

    let file = tokio::fs::File::open(events)
        .await
        .map_err(|err| AppError::Io(format!("cannot open {}: {err}", events.display())))?;
    let mut frames = FramedRead::new(file, EventCodec::new());

    let mut forwarded: u64 = 0;
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    error!("event consumer stopped early");
                    break;
                }
                forwarded += 1;
            }
            Err(err) => {
                warn!(%err, forwarded, "event log unreadable; stopping replay");
                break;
            }
        }
    }
    drop(tx);
    info!(forwarded, "event log exhausted");

    // Consumer drains what was queued, then exits on channel close.
    if let Err(err) = consumer.await {
        error!(%err, "event consumer task failed");
    }
    if !linger.is_zero() {
        tokio::time::sleep(linger).await;
    }
    info!(ticks = ticker.ticks(), renders = ticker.renders(), "replay finished");
    ticker.await_completion().await;
    ct.cancel();

    let snapshot = controller.snapshot().await;
    let rendered = serde_json::to_string_pretty(&snapshot)
        .map_err(|err| AppError::Codec(format!("cannot encode snapshot: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}"))),
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}"))),
    }
}
