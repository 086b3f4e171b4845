use serde::Serialize;

/// Structured trace events emitted across all Orbit crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TaskCreated {
        user_id: String,
        task_id: String,
        ai_generated: bool,
    },
    TaskUpdated {
        user_id: String,
        task_id: String,
        status: String,
    },
    TaskDeleted {
        user_id: String,
        task_id: String,
    },
    ReflectionLogged {
        user_id: String,
        reflection_id: String,
        mood: Option<String>,
    },
    SessionStarted {
        user_id: String,
        session_id: String,
        mode: String,
        closed_previous: usize,
    },
    SessionClosed {
        user_id: String,
        session_id: String,
        duration_secs: Option<i64>,
    },
    ContextualMessage {
        trigger: String,
        version: String,
        chars: usize,
    },
    LlmRequest {
        provider: String,
        model: String,
        operation: String,
        duration_ms: u64,
        ok: bool,
    },
    AssistantFallback {
        operation: String,
        reason: String,
    },
    AuthRejected {
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ob_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let ev = TraceEvent::AssistantFallback {
            operation: "quote".into(),
            reason: "offline".into(),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "AssistantFallback");
        assert_eq!(v["operation"], "quote");
    }
}
