//! Background thread routing engine events into a session's subscriptions
//!
//! Each listening-capable session registers one event channel with its
//! endpoint's engine and spawns a worker draining it. The worker polls with
//! a timeout so it notices shutdown even when no events arrive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bacnet_api::{EngineEvent, ListenerId, ProtocolEngine};

use crate::error::{AdapterError, Result};
use crate::subscription::SubscriptionManager;

pub(crate) struct NotificationWorker {
    listener: ListenerId,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NotificationWorker {
    /// Registers with `engine` and starts routing its events.
    pub fn start(
        name: String,
        engine: &Arc<dyn ProtocolEngine>,
        subscriptions: Arc<SubscriptionManager>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let listener = engine.register_listener(event_tx);
        let running = Arc::new(AtomicBool::new(true));

        let spawned = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(name)
                .spawn(move || run_worker(event_rx, subscriptions, running, poll_interval))
        };

        match spawned {
            Ok(handle) => Ok(Self {
                listener,
                running,
                handle: Some(handle),
            }),
            Err(err) => {
                engine.unregister_listener(listener);
                Err(AdapterError::Worker(err))
            }
        }
    }

    /// Unregisters from the engine and joins the thread.
    pub fn stop(&mut self, engine: &dyn ProtocolEngine) {
        engine.unregister_listener(self.listener);
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Notification worker panicked");
            }
        }
    }
}

fn run_worker(
    events: mpsc::Receiver<EngineEvent>,
    subscriptions: Arc<SubscriptionManager>,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    tracing::debug!("Notification worker started");

    while running.load(Ordering::SeqCst) {
        match events.recv_timeout(poll_interval) {
            Ok(event) => {
                subscriptions.route(&event);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::debug!("Notification worker stopped");
}
