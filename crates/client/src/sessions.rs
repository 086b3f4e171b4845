use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::ambient::AmbientStore;
use crate::backend::TaskBackend;
use crate::events::DomainEvent;

/// Opens a focus session on the backend whenever the mode changes.
///
/// The session starts with the energy recorded in the ambient store at the
/// time of the switch. Failures are logged and dropped.
pub struct SessionTracker {
    backend: Arc<dyn TaskBackend>,
    ambient: Arc<AmbientStore>,
}

impl SessionTracker {
    pub fn new(backend: Arc<dyn TaskBackend>, ambient: Arc<AmbientStore>) -> Self {
        Self { backend, ambient }
    }

    pub fn spawn(self, mut rx: broadcast::Receiver<DomainEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "session tracker lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub async fn handle(&self, event: &DomainEvent) {
        let DomainEvent::ModeChanged { to, .. } = *event else {
            return;
        };
        let energy = self.ambient.state().energy;
        match self.backend.start_session(to, Some(energy), None).await {
            Ok(session) => {
                tracing::debug!(session_id = %session.id, mode = %to, "focus session started");
            }
            Err(e) => {
                tracing::warn!(mode = %to, error = %e, "failed to start focus session");
            }
        }
    }
}
