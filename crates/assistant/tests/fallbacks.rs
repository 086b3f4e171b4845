use std::sync::{Arc, Mutex};

use ob_assistant::fallback;
use ob_assistant::{Assistant, ChatContext, SuggestionKind};
use ob_domain::error::{Error, Result};
use ob_domain::{Mode, Mood, Priority};
use ob_providers::{ChatRequest, ChatResponse, LlmProvider};

enum Script {
    Reply(&'static str),
    Timeout,
    Down,
}

/// Returns a fixed reply (or error) and records the last request it saw.
struct ScriptedProvider {
    script: Script,
    last_request: Mutex<Option<ChatRequest>>,
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        *self.last_request.lock().unwrap() = Some(req.clone());
        match self.script {
            Script::Reply(text) => Ok(ChatResponse {
                content: text.to_string(),
                usage: None,
                model: "scripted-1".into(),
                finish_reason: Some("stop".into()),
            }),
            Script::Timeout => Err(Error::Timeout("deadline elapsed".into())),
            Script::Down => Err(Error::Http("connection refused".into())),
        }
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

fn assistant(script: Script) -> (Assistant, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider {
        script,
        last_request: Mutex::new(None),
    });
    (
        Assistant::with_provider(provider.clone(), Some("scripted-1".into())),
        provider,
    )
}

#[tokio::test]
async fn offline_breakdown_is_the_fixed_four_items() {
    let out = Assistant::offline().task_breakdown("Write report").await;
    assert_eq!(out.len(), 4);
    assert_eq!(out, fallback::breakdown());
}

#[tokio::test]
async fn failing_provider_breakdown_falls_back() {
    let (a, _) = assistant(Script::Down);
    assert_eq!(a.task_breakdown("Write report").await, fallback::breakdown());
}

#[tokio::test]
async fn garbage_breakdown_falls_back() {
    let (a, _) = assistant(Script::Reply("```\n\n```"));
    assert_eq!(a.task_breakdown("Write report").await, fallback::breakdown());
}

#[tokio::test]
async fn breakdown_parses_fenced_json() {
    let (a, provider) = assistant(Script::Reply(
        "```json\n[\"Open the doc\",\"Outline\",\"Draft\",\"Edit\",\"Send\"]\n```",
    ));
    let out = a.task_breakdown("Write report").await;
    assert_eq!(out, vec!["Open the doc", "Outline", "Draft", "Edit", "Send"]);
    let req = provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(req.model.as_deref(), Some("scripted-1"));
    assert!(req.messages[1].content.contains("Write report"));
}

#[tokio::test]
async fn chat_structured_reply_keeps_two_suggestions() {
    let (a, provider) = assistant(Script::Reply(
        r#"{"chat_response":"Let's take it slow.","suggested_tasks":[
            {"title":"Drink water","priority":"low","kind":"task"},
            {"title":"What drains you?","kind":"chat_prompt"},
            {"title":"Third","kind":"task"}
        ]}"#,
    ));
    let reply = a.chat_response("I'm exhausted", &ChatContext::default()).await;
    assert_eq!(reply.chat_response, "Let's take it slow.");
    assert_eq!(reply.suggested_tasks.len(), 2);
    assert_eq!(reply.suggested_tasks[0].priority, Some(Priority::Low));
    assert_eq!(reply.suggested_tasks[1].kind, SuggestionKind::ChatPrompt);
    assert!(provider.last_request.lock().unwrap().as_ref().unwrap().json_mode);
}

#[tokio::test]
async fn chat_plain_text_reply_is_used_verbatim() {
    let (a, _) = assistant(Script::Reply("You're doing fine. Take a breath."));
    let reply = a.chat_response("hi", &ChatContext::default()).await;
    assert_eq!(reply.chat_response, "You're doing fine. Take a breath.");
    assert!(reply.suggested_tasks.is_empty());
}

#[tokio::test]
async fn chat_fallback_depends_on_failure_kind() {
    let (slow, _) = assistant(Script::Timeout);
    let (down, _) = assistant(Script::Down);
    assert_eq!(
        slow.chat_response("hi", &ChatContext::default()).await.chat_response,
        fallback::CHAT_TIMEOUT
    );
    assert_eq!(
        down.chat_response("hi", &ChatContext::default()).await.chat_response,
        fallback::CHAT_UNAVAILABLE
    );
    assert_eq!(
        Assistant::offline()
            .chat_response("hi", &ChatContext::default())
            .await
            .chat_response,
        fallback::CHAT_UNAVAILABLE
    );
}

#[tokio::test]
async fn quote_is_cleaned_or_falls_back() {
    let (a, _) = assistant(Script::Reply("\"Rest is part of the work.\""));
    assert_eq!(
        a.motivational_quote(Mode::Restore, Mood::Tired).await,
        "Rest is part of the work."
    );

    let (long, _) = assistant(Script::Reply(
        "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen",
    ));
    assert_eq!(
        long.motivational_quote(Mode::Build, Mood::Happy).await,
        fallback::QUOTE
    );
    assert_eq!(
        Assistant::offline()
            .motivational_quote(Mode::Flow, Mood::Calm)
            .await,
        fallback::QUOTE
    );
}

#[tokio::test]
async fn reframe_parses_or_keeps_title() {
    let (a, _) = assistant(Script::Reply(
        r#"{"title":"Open the tax folder","description":"Just look at it for five minutes."}"#,
    ));
    let r = a
        .reframe_task("Do taxes", None, Mode::Build, Mood::Anxious)
        .await;
    assert_eq!(r.title, "Open the tax folder");

    let r = Assistant::offline()
        .reframe_task("Do taxes", Some("all of them"), Mode::Build, Mood::Anxious)
        .await;
    assert_eq!(r.title, "Do taxes");
    assert_eq!(r.description, fallback::REFRAME_DESCRIPTION);
}
