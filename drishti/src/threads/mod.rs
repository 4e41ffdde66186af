//! Recognition loop.
//!
//! - `RecognitionPipeline`: the stages of one tick
//! - `RecognitionThread`: dedicated, rate-limited thread running the ticks

mod pipeline;
mod recognition_thread;

pub use pipeline::{RecognitionPipeline, TickOutcome, TickSummary};
pub use recognition_thread::{LoopState, LoopStats, RecognitionThread, SchedulerConfig};
