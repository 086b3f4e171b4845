use std::sync::Arc;
use std::time::Instant;

use ob_domain::error::{Error, Result};
use ob_domain::llm::Message;
use ob_domain::trace::TraceEvent;
use ob_domain::{Energy, Mode, Mood, Priority, Task, TaskStatus};
use ob_providers::{ChatRequest, LlmProvider, ProviderRegistry};
use serde::{Deserialize, Serialize};

use crate::{fallback, parse, prompts};

/// Role the assistant resolves from the provider registry.
pub const ASSISTANT_ROLE: &str = "assistant";

pub const MAX_SUGGESTIONS: usize = 2;
const MAX_QUOTE_WORDS: usize = 15;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The slice of a task the chat prompt needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Task> for TaskSummary {
    fn from(t: &Task) -> Self {
        Self {
            title: t.title.clone(),
            status: t.status,
            priority: t.priority,
            description: t.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatContext {
    pub mode: Option<Mode>,
    pub mood: Option<Mood>,
    pub energy: Option<Energy>,
    pub tasks: Vec<TaskSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    #[default]
    Task,
    ChatPrompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub kind: SuggestionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub chat_response: String,
    pub suggested_tasks: Vec<SuggestedTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reframe {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Shape the model is asked to reply with for chat turns. Suggestions are
/// parsed loosely so one malformed entry does not discard the reply.
#[derive(Deserialize)]
struct RawChatReply {
    chat_response: String,
    #[serde(default)]
    suggested_tasks: Vec<serde_json::Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, Default)]
pub struct Assistant {
    llm: Option<(Arc<dyn LlmProvider>, Option<String>)>,
}

impl Assistant {
    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        let llm = registry.for_role(ASSISTANT_ROLE);
        match llm {
            Some((ref p, ref model)) => tracing::info!(
                provider = %p.provider_id(),
                model = model.as_deref().unwrap_or("default"),
                "assistant online"
            ),
            None => tracing::warn!("no provider for assistant role; serving fallback content"),
        }
        Self { llm }
    }

    /// An assistant that always serves fallback content.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        Self {
            llm: Some((provider, model)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.llm.is_some()
    }

    /// 4–6 subtasks, easiest first. Falls back to a fixed 4-item list.
    pub async fn task_breakdown(&self, title: &str) -> Vec<String> {
        const OP: &str = "task_breakdown";
        let reply = match self.complete(OP, prompts::breakdown(title), false, 300).await {
            Ok(r) => r,
            Err(e) => return fallback_with(OP, &e, fallback::breakdown()),
        };
        let subtasks = parse::parse_subtasks(&reply);
        if subtasks.is_empty() {
            return fallback_with(OP, &"empty subtask list", fallback::breakdown());
        }
        subtasks
    }

    /// A short supportive reply with up to two suggestions.
    pub async fn chat_response(&self, message: &str, ctx: &ChatContext) -> ChatReply {
        const OP: &str = "chat_response";
        let reply = match self.complete(OP, prompts::chat(message, ctx), true, 600).await {
            Ok(r) => r,
            Err(e) => {
                let text = match e {
                    Error::Timeout(_) => fallback::CHAT_TIMEOUT,
                    _ => fallback::CHAT_UNAVAILABLE,
                };
                return fallback_with(
                    OP,
                    &e,
                    ChatReply {
                        chat_response: text.to_string(),
                        suggested_tasks: Vec::new(),
                    },
                );
            }
        };

        match parse::parse_json::<RawChatReply>(&reply) {
            Some(raw) if !raw.chat_response.trim().is_empty() => ChatReply {
                chat_response: raw.chat_response.trim().to_string(),
                suggested_tasks: raw
                    .suggested_tasks
                    .into_iter()
                    .filter_map(|v| serde_json::from_value::<SuggestedTask>(v).ok())
                    .filter(|s| !s.title.trim().is_empty())
                    .take(MAX_SUGGESTIONS)
                    .collect(),
            },
            _ => {
                tracing::debug!("chat reply was not structured JSON, using raw text");
                ChatReply {
                    chat_response: parse::unwrap_code_fence(&reply).to_string(),
                    suggested_tasks: Vec::new(),
                }
            }
        }
    }

    /// A quote of at most 15 words tailored to mode and mood.
    pub async fn motivational_quote(&self, mode: Mode, mood: Mood) -> String {
        const OP: &str = "motivational_quote";
        let reply = match self.complete(OP, prompts::quote(mode, mood), false, 60).await {
            Ok(r) => r,
            Err(e) => return fallback_with(OP, &e, fallback::QUOTE.to_string()),
        };
        let quote = parse::clean_quote(&reply);
        let words = quote.split_whitespace().count();
        if words == 0 || words > MAX_QUOTE_WORDS {
            return fallback_with(
                OP,
                &format!("unusable quote ({words} words)"),
                fallback::QUOTE.to_string(),
            );
        }
        quote
    }

    /// Rewrite a task to feel more approachable. Falls back to the original
    /// title with a "smallest first step" description.
    pub async fn reframe_task(
        &self,
        title: &str,
        description: Option<&str>,
        mode: Mode,
        mood: Mood,
    ) -> Reframe {
        const OP: &str = "reframe_task";
        let default = || Reframe {
            title: title.to_string(),
            description: fallback::REFRAME_DESCRIPTION.to_string(),
        };
        let prompt = prompts::reframe(title, description, mode, mood);
        let reply = match self.complete(OP, prompt, true, 300).await {
            Ok(r) => r,
            Err(e) => return fallback_with(OP, &e, default()),
        };
        match parse::parse_json::<Reframe>(&reply) {
            Some(r) if !r.title.trim().is_empty() => Reframe {
                title: r.title.trim().to_string(),
                description: if r.description.trim().is_empty() {
                    fallback::REFRAME_DESCRIPTION.to_string()
                } else {
                    r.description.trim().to_string()
                },
            },
            _ => fallback_with(OP, &"unparseable reframe", default()),
        }
    }

    /// One LLM round trip. No retries.
    async fn complete(
        &self,
        operation: &str,
        messages: Vec<Message>,
        json_mode: bool,
        max_tokens: u32,
    ) -> Result<String> {
        let (provider, model) = self
            .llm
            .as_ref()
            .ok_or_else(|| Error::Config("no LLM provider configured".into()))?;

        let req = ChatRequest {
            messages,
            temperature: Some(0.7),
            max_tokens: Some(max_tokens),
            json_mode,
            model: model.clone(),
        };

        let started = Instant::now();
        let result = provider.chat(&req).await;
        TraceEvent::LlmRequest {
            provider: provider.provider_id().to_string(),
            model: match result {
                Ok(ref r) => r.model.clone(),
                Err(_) => model.clone().unwrap_or_default(),
            },
            operation: operation.to_string(),
            duration_ms: started.elapsed().as_millis() as u64,
            ok: result.is_ok(),
        }
        .emit();

        let content = result?.content;
        if content.trim().is_empty() {
            return Err(Error::Provider {
                provider: provider.provider_id().to_string(),
                message: "empty completion".into(),
            });
        }
        Ok(content)
    }
}

fn fallback_with<T>(operation: &str, reason: &dyn std::fmt::Display, value: T) -> T {
    tracing::warn!(operation, reason = %reason, "assistant falling back to static content");
    TraceEvent::AssistantFallback {
        operation: operation.to_string(),
        reason: reason.to_string(),
    }
    .emit();
    value
}
