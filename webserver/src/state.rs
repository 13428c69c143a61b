//! Webserver state shared by every handler

use std::net::SocketAddr;
use std::time::Instant;
use tracker::TrackerHandle;

/// Core webserver state
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,

    /// Client of the tracker task that owns the records
    pub tracker: TrackerHandle,

    /// Storage backend name reported by the health check
    pub backend: String,

    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(bind_address: SocketAddr, tracker: TrackerHandle, backend: impl Into<String>) -> Self {
        Self {
            bind_address,
            tracker,
            backend: backend.into(),
            server_start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }
}
