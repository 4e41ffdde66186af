//! Drishti recognition node.
//!
//! Loads the TOML configuration, starts the recognition loop, replays
//! recorded frames from disk through the normal ingestion path and writes
//! results as JSON lines.
//!
//! # Usage
//!
//! ```bash
//! # With default config
//! cargo run --release
//!
//! # Custom config, frames directory and output file
//! cargo run --release -- --config drishti.toml --frames demos/frames --output results.jsonl
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use clap::Parser;

use drishti::engine::NullEngine;
use drishti::io::{FrameReplay, JsonLinesSink, ResultSink};
use drishti::utils::install_shutdown_handler;
use drishti::{AppConfig, RecognitionNode};

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Continuous tabletop object recognition", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "drishti.toml")]
    config: PathBuf,

    /// Directory of `.xyz` frames to replay (overrides [replay].directory)
    #[arg(short, long)]
    frames: Option<PathBuf>,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include full foreground clouds in the output
    #[arg(long)]
    foreground_points: bool,

    /// Exit once the replay finished and the buffer drained
    #[arg(long)]
    once: bool,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    let mut config = match AppConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };
    if let Some(frames) = &args.frames {
        config.replay.directory = frames.clone();
    }

    log::info!("drishti starting");
    log::info!("  Config: {}", args.config.display());
    log::info!("  Models: {}", config.models.len());
    log::info!("  World frame: {}", config.interface.world_frame);
    log::info!(
        "  Replay: {} @ {} Hz{}",
        config.replay.directory.display(),
        config.replay.rate_hz,
        if config.replay.loop_playback {
            " (loop)"
        } else {
            ""
        }
    );

    if let Err(e) = run(&config, &args) {
        log::error!("Node error: {}", e);
        std::process::exit(1);
    }

    log::info!("drishti shutdown complete");
}

fn run(config: &AppConfig, args: &Args) -> drishti::Result<()> {
    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    let sink: Box<dyn ResultSink> =
        Box::new(JsonLinesSink::new(writer).with_foreground_points(args.foreground_points));
    let engine = Box::new(NullEngine::new(config.recognition.construction()));

    let replay = FrameReplay::load(config.replay.clone())?;
    let node = RecognitionNode::new(config, engine, sink)?;
    let ingest = node.ingest();

    let running = install_shutdown_handler()?;

    let played = replay.run(&ingest, &running);
    log::info!("Replayed {} frame(s)", played);

    let buffer = ingest.buffer();
    while running.load(Ordering::Acquire) {
        if args.once && buffer.is_empty() {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    let stats = node.stats();
    log::info!(
        "Ticks: {} ({} completed, {} empty, {} without plane, {} failed), detections: {}",
        stats.ticks,
        stats.completed,
        stats.empty,
        stats.no_plane,
        stats.failed,
        stats.detections
    );
    node.shutdown();
    Ok(())
}
