use ob_domain::{Energy, Mode, Mood};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Things that happened to client state that other parts of the app may
/// react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    TaskListEmptied,
    TaskListFilled,
    TaskCompleted { task_id: Uuid },
    ModeChanged { from: Mode, to: Mode },
    MoodChanged { mood: Mood },
    EnergyLow { energy: Energy },
    ReflectionLogged {
        reflection_id: Uuid,
        mood: Option<Mood>,
    },
}

/// Fan-out bus for [`DomainEvent`]s. Publishing with no subscribers is a
/// no-op.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: DomainEvent) {
        tracing::debug!(?event, "domain event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(DomainEvent::TaskListFilled);
        bus.publish(DomainEvent::TaskListEmptied);
        assert_eq!(rx.recv().await.unwrap(), DomainEvent::TaskListFilled);
        assert_eq!(rx.recv().await.unwrap(), DomainEvent::TaskListEmptied);
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        EventBus::default().publish(DomainEvent::TaskListEmptied);
    }
}
