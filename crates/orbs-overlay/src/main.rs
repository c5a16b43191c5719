//! Skill Orbs overlay binary
//!
//! Replays a session trace and prints orb frames as JSON lines.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use orbs_common::VERSION;
use orbs_engine::OrbRegistry;
use orbs_overlay::{
    parse_trace, replay_realtime, replay_virtual, write_frame, OverlayConfig, ReplayMode,
    TraceRecord,
};

#[derive(Parser, Debug)]
#[command(name = "orbs-overlay")]
#[command(about = "Replay a Skill Orbs session trace and print orb frames", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    /// Session trace (JSON lines); `-` reads stdin
    trace: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay on the tokio clock instead of jumping between events
    #[arg(long)]
    realtime: bool,

    /// Write frames to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print only the final summary
    #[arg(long)]
    summary_only: bool,
}

fn read_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = File::open(path).with_context(|| format!("opening trace {}", path.display()))?;
        Box::new(BufReader::new(file))
    };
    let records = parse_trace(reader).with_context(|| format!("reading trace {}", path.display()))?;
    Ok(records)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = OverlayConfig::load(cli.config.as_deref())?;
    if cli.realtime {
        config.replay.mode = ReplayMode::Realtime;
    }

    // Initialize tracing; stdout carries the frames
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.logging.ansi),
        )
        .with(filter)
        .init();

    info!("Starting Skill Orbs overlay v{}", VERSION);
    debug!("Loaded configuration: {:?}", config);

    let records = read_trace(&cli.trace)?;
    info!(records = records.len(), mode = ?config.replay.mode, "Trace loaded");

    let mut out: Box<dyn Write + Send> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let summary_only = cli.summary_only;
    let registry = OrbRegistry::new(config.settings.clone());

    let summary = match config.replay.mode {
        ReplayMode::Virtual => {
            let mut registry = registry;
            replay_virtual(&mut registry, &records, &config.replay, |frame| {
                if summary_only {
                    return Ok(());
                }
                write_frame(&mut out, &frame)
            })?
        }
        ReplayMode::Realtime => {
            let shared = Arc::new(Mutex::new(registry));
            let (tx, mut rx) = mpsc::unbounded_channel();

            let writer = tokio::spawn(async move {
                while let Some(frame) = rx.recv().await {
                    if !summary_only {
                        write_frame(&mut out, &frame)?;
                        out.flush()?;
                    }
                }
                Ok::<_, orbs_common::OrbsError>(out)
            });

            let summary = replay_realtime(shared, records, config.replay.clone(), tx).await?;
            out = writer.await??;
            summary
        }
    };

    if summary_only {
        serde_json::to_writer(&mut out, &summary)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!(
        records = summary.records,
        created = summary.created,
        removed = summary.removed,
        frames = summary.frames,
        "Replay finished"
    );
    Ok(())
}
