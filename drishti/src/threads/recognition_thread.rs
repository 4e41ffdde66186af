//! Recognition thread.
//!
//! Runs [`RecognitionPipeline::tick`] on a dedicated thread, rate-limited to
//! `max_rate_hz`. Starts in [`LoopState::Running`]; [`RecognitionThread::stop`]
//! moves it to [`LoopState::Stopped`] and the loop exits at the next tick
//! boundary. Dropping the handle stops and joins the thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pipeline::{RecognitionPipeline, TickOutcome};
use crate::io::FrameBuffer;
use crate::utils::{Rate, Throttle};

/// Configuration for the recognition loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound on tick frequency (Hz).
    pub max_rate_hz: f64,
    /// Minimum spacing of empty-buffer warnings (seconds).
    pub empty_warn_period_s: f64,
    /// Longest wait for new frames after an empty tick (milliseconds).
    pub empty_wait_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_rate_hz: 100.0,
            empty_warn_period_s: 1.0,
            empty_wait_ms: 100,
        }
    }
}

impl SchedulerConfig {
    fn empty_warn_period(&self) -> Duration {
        if self.empty_warn_period_s.is_finite() && self.empty_warn_period_s > 0.0 {
            Duration::from_secs_f64(self.empty_warn_period_s)
        } else {
            Duration::ZERO
        }
    }
}

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Tick counters, readable while the loop runs.
#[derive(Debug, Default)]
struct LoopCounters {
    ticks: AtomicU64,
    empty: AtomicU64,
    no_plane: AtomicU64,
    failed: AtomicU64,
    completed: AtomicU64,
    detections: AtomicU64,
}

/// Snapshot of the loop counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopStats {
    pub ticks: u64,
    pub empty: u64,
    pub no_plane: u64,
    pub failed: u64,
    pub completed: u64,
    pub detections: u64,
}

impl LoopCounters {
    fn record(&self, outcome: &TickOutcome) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            TickOutcome::BufferEmpty => &self.empty,
            TickOutcome::NoPlane => &self.no_plane,
            TickOutcome::RecognitionFailed => &self.failed,
            TickOutcome::Completed(summary) => {
                self.detections
                    .fetch_add(summary.detections as u64, Ordering::Relaxed);
                &self.completed
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LoopStats {
        LoopStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            no_plane: self.no_plane.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            detections: self.detections.load(Ordering::Relaxed),
        }
    }
}

/// Recognition thread handle.
pub struct RecognitionThread {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    buffer: Arc<FrameBuffer>,
    counters: Arc<LoopCounters>,
}

impl RecognitionThread {
    /// Spawn the recognition thread. The loop is Running on return.
    pub fn spawn(config: SchedulerConfig, pipeline: RecognitionPipeline) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(LoopCounters::default());
        let buffer = Arc::clone(pipeline.buffer());

        let handle = {
            let running = Arc::clone(&running);
            let counters = Arc::clone(&counters);
            thread::Builder::new()
                .name("recognition".into())
                .spawn(move || run_recognition_loop(config, pipeline, running, counters))
                .expect("Failed to spawn recognition thread")
        };

        Self {
            handle: Some(handle),
            running,
            buffer,
            counters,
        }
    }

    /// Request shutdown. Returns immediately; the loop exits at the next
    /// tick boundary.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.buffer.notify_all();
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        if self.running.load(Ordering::Acquire) {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    /// Tick counters so far.
    pub fn stats(&self) -> LoopStats {
        self.counters.snapshot()
    }

    /// Stop and wait for the thread to finish.
    pub fn join(mut self) -> thread::Result<()> {
        self.stop();
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

impl Drop for RecognitionThread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop();
            if handle.join().is_err() {
                log::error!("Recognition thread panicked");
            }
        }
    }
}

/// Main recognition loop.
fn run_recognition_loop(
    config: SchedulerConfig,
    mut pipeline: RecognitionPipeline,
    running: Arc<AtomicBool>,
    counters: Arc<LoopCounters>,
) {
    log::info!("Recognition thread running at up to {}Hz", config.max_rate_hz);

    let mut rate = Rate::new(config.max_rate_hz);
    let mut empty_warning = Throttle::new(config.empty_warn_period());
    let empty_wait = Duration::from_millis(config.empty_wait_ms);

    while running.load(Ordering::Acquire) {
        rate.sleep();
        if !running.load(Ordering::Acquire) {
            break;
        }

        let outcome = pipeline.tick();
        counters.record(&outcome);

        match outcome {
            TickOutcome::BufferEmpty => {
                if empty_warning.ready() {
                    log::warn!("Point cloud buffer is empty");
                }
                pipeline.buffer().wait_for_frames(empty_wait, &running);
            }
            TickOutcome::Completed(summary) => {
                log::debug!(
                    "Tick complete: {} frame(s), {} foreground points, {} detection(s)",
                    summary.frames,
                    summary.foreground_points,
                    summary.detections
                );
            }
            TickOutcome::NoPlane | TickOutcome::RecognitionFailed => {}
        }
    }

    log::info!("Recognition thread stopped");
}
