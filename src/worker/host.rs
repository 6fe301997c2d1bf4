//! Host runtime hooks used by the worker

use tracing::info;

/// Capabilities the hosting runtime exposes to the worker
pub trait WorkerHost: Send + Sync {
    /// Activate this worker without waiting for the previous one to be released
    fn skip_waiting(&self);

    /// Take control of already-open client pages immediately
    fn claim_clients(&self);
}

/// Host for environments without client pages; records the calls in the log
#[derive(Debug, Default)]
pub struct LoggingHost;

impl WorkerHost for LoggingHost {
    fn skip_waiting(&self) {
        info!("Worker requested immediate activation");
    }

    fn claim_clients(&self) {
        info!("Worker claimed open clients");
    }
}
