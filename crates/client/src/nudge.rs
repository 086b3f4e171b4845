use std::sync::Arc;

use ob_domain::ChatMessage;
use ob_messaging::{ContextualMessageRequest, MessageContext, Trigger};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::ambient::AmbientStore;
use crate::backend::TaskBackend;
use crate::events::DomainEvent;
use crate::transcript::ChatTranscript;

/// Turns domain events into contextual assistant messages.
///
/// Fire-and-forget: a failed fetch is logged and dropped, and never affects
/// the write that caused the event.
pub struct NudgeListener {
    backend: Arc<dyn TaskBackend>,
    transcript: Arc<ChatTranscript>,
    ambient: Option<Arc<AmbientStore>>,
}

impl NudgeListener {
    pub fn new(backend: Arc<dyn TaskBackend>, transcript: Arc<ChatTranscript>) -> Self {
        Self {
            backend,
            transcript,
            ambient: None,
        }
    }

    /// Attach ambient state so requests carry the current mode, mood and
    /// energy.
    pub fn with_ambient(mut self, ambient: Arc<AmbientStore>) -> Self {
        self.ambient = Some(ambient);
        self
    }

    pub fn trigger_for(event: &DomainEvent) -> Option<Trigger> {
        match event {
            DomainEvent::TaskListEmptied => Some(Trigger::NoTask),
            DomainEvent::ModeChanged { .. } => Some(Trigger::ModeChange),
            DomainEvent::EnergyLow { .. } => Some(Trigger::EnergyLow),
            DomainEvent::ReflectionLogged { .. } => Some(Trigger::ReflectionLogged),
            _ => None,
        }
    }

    pub fn spawn(self, mut rx: broadcast::Receiver<DomainEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "nudge listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Fetch and append the message for one event, if it maps to a trigger.
    pub async fn handle(&self, event: &DomainEvent) {
        let Some(trigger) = Self::trigger_for(event) else {
            return;
        };
        let req = ContextualMessageRequest::new(trigger, Some(self.context(event)));
        match self.backend.contextual_message(&req).await {
            Ok(resp) => {
                self.transcript
                    .append(ChatMessage::assistant(resp.chat_message.content));
            }
            Err(e) => {
                tracing::warn!(trigger = %trigger, error = %e, "contextual message fetch failed");
            }
        }
    }

    fn context(&self, event: &DomainEvent) -> MessageContext {
        let mut ctx = MessageContext::default();
        if let Some(ref ambient) = self.ambient {
            let state = ambient.state();
            ctx.mode = Some(state.mode);
            ctx.mood = state.mood.map(|m| m.as_str().to_string());
            ctx.energy_level = Some(state.energy);
        }
        match *event {
            DomainEvent::ModeChanged { to, .. } => ctx.mode = Some(to),
            DomainEvent::EnergyLow { energy } => ctx.energy_level = Some(energy),
            DomainEvent::MoodChanged { mood } => ctx.mood = Some(mood.as_str().to_string()),
            // The reflection's own mood beats the ambient one.
            DomainEvent::ReflectionLogged {
                mood: Some(mood), ..
            } => ctx.mood = Some(mood.as_str().to_string()),
            _ => {}
        }
        ctx
    }
}
