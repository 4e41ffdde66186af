//! Shared state between ingestion, reconfiguration and the recognition
//! thread.

mod params;

pub use params::{InterfaceParams, ReconfigureRequest, RuntimeParams, SharedParams};
