//! Ctrl-C handling for graceful shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Install a Ctrl-C handler.
///
/// The returned flag starts true and is cleared on the first signal.
pub fn install_shutdown_handler() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        if flag.swap(false, Ordering::SeqCst) {
            log::info!("Received shutdown signal");
        }
    })
    .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
    Ok(running)
}
