//! Utilities.
//!
//! - Loop rate limiting and log throttling
//! - Signal handling (Ctrl-C)

mod rate;
mod signal;

pub use rate::{Rate, Throttle, now_us};
pub use signal::install_shutdown_handler;
