//! Periodic time-synchronization broadcasts

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use bacnet_discovery::{EndpointRegistry, LocalEndpoint};

use crate::error::{AdapterError, Result};

/// Background task broadcasting the local time on one endpoint.
///
/// Holds a reference to the endpoint until stopped or dropped.
pub struct TimeSyncTask {
    endpoint: LocalEndpoint,
    registry: Arc<EndpointRegistry>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TimeSyncTask {
    /// Starts broadcasting immediately and then every `interval`. Takes over
    /// the caller's reference to `endpoint`.
    pub(crate) fn start(endpoint: LocalEndpoint, registry: Arc<EndpointRegistry>, interval: Duration) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));

        let spawned = {
            let running = Arc::clone(&running);
            let endpoint = endpoint.clone();
            thread::Builder::new()
                .name(format!("bacnet-time-sync-{}", endpoint.port()))
                .spawn(move || run(endpoint, running, interval))
        };

        match spawned {
            Ok(handle) => Ok(Self {
                endpoint,
                registry,
                running,
                handle: Some(handle),
            }),
            Err(err) => {
                registry.release(&endpoint);
                Err(AdapterError::Worker(err))
            }
        }
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.running.store(false, Ordering::SeqCst);
        handle.thread().unpark();
        if handle.join().is_err() {
            tracing::error!("Time sync task on port {} panicked", self.endpoint.port());
        }
        self.registry.release(&self.endpoint);
    }
}

impl Drop for TimeSyncTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(endpoint: LocalEndpoint, running: Arc<AtomicBool>, interval: Duration) {
    tracing::debug!("Time sync started on port {} every {:?}", endpoint.port(), interval);

    while running.load(Ordering::SeqCst) {
        if let Err(err) = endpoint.engine().broadcast_time_synchronization(SystemTime::now()) {
            tracing::warn!("Time sync broadcast on port {} failed: {}", endpoint.port(), err);
        }

        let deadline = Instant::now() + interval;
        while running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }

    tracing::debug!("Time sync stopped on port {}", endpoint.port());
}
