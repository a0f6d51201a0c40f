use std::sync::Arc;

use tokio::sync::broadcast;

use crate::backend::{Backend, InMemoryBackend};
use crate::engine::lifecycle::LifecycleEvent;
use crate::notify::{LogNotifier, Notifier};
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub notifier: Arc<dyn Notifier>,
    pub lifecycle_events_tx: broadcast::Sender<LifecycleEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()), event_buffer_size)
    }

    pub fn with_backend(backend: Arc<dyn Backend>, event_buffer_size: usize) -> Self {
        let (lifecycle_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            backend,
            notifier: Arc::new(LogNotifier),
            lifecycle_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// Publish a lifecycle event to observers. Fire-and-forget; no
    /// subscribers is not an error.
    pub fn publish(&self, event: LifecycleEvent) {
        let _ = self.lifecycle_events_tx.send(event);
    }
}
