//! Prompt builders.

use ob_domain::llm::Message;
use ob_domain::{Mode, Mood};

use crate::assistant::{ChatContext, TaskSummary};
use crate::parse::truncate_chars;

pub const MAX_PROMPT_TASKS: usize = 10;
pub const MAX_TASK_DESCRIPTION_CHARS: usize = 100;

const PERSONA: &str = "You are Orbit, a warm and practical productivity companion. \
You adapt your tone to the user's current mode, mood and energy. \
Keep replies short, encouraging and concrete.";

pub fn breakdown(title: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            "{PERSONA}\nBreak tasks into 4 to 6 concrete subtasks ordered from easiest to hardest. \
             Reply with a JSON array of strings only."
        )),
        Message::user(format!("Task: {title}")),
    ]
}

pub fn quote(mode: Mode, mood: Mood) -> Vec<Message> {
    vec![
        Message::system(format!(
            "{PERSONA}\nWrite one original motivational quote of at most 15 words. \
             Reply with the quote only, no attribution."
        )),
        Message::user(format!(
            "The user is in {mode} mode ({}) and is feeling {mood} ({}).",
            mode.describe(),
            mood.describe()
        )),
    ]
}

pub fn reframe(title: &str, description: Option<&str>, mode: Mode, mood: Mood) -> Vec<Message> {
    let mut user = format!("Task title: {title}\n");
    if let Some(d) = description.filter(|d| !d.trim().is_empty()) {
        user.push_str(&format!("Task description: {d}\n"));
    }
    user.push_str(&format!(
        "The user is in {mode} mode ({}) and is feeling {mood} ({}).",
        mode.describe(),
        mood.describe()
    ));
    vec![
        Message::system(format!(
            "{PERSONA}\nRewrite the task so it feels approachable for the user right now. \
             Reply with JSON: {{\"title\": string, \"description\": string}}."
        )),
        Message::user(user),
    ]
}

pub fn chat(message: &str, ctx: &ChatContext) -> Vec<Message> {
    let mut state = Vec::new();
    if let Some(mode) = ctx.mode {
        state.push(format!("Mode: {mode} ({})", mode.describe()));
    }
    if let Some(mood) = ctx.mood {
        state.push(format!("Mood: {mood} ({})", mood.describe()));
    }
    if let Some(energy) = ctx.energy {
        state.push(format!("Energy: {energy}/100 ({})", energy.describe()));
    }

    let tasks = task_list(&ctx.tasks);

    let system = format!(
        "{PERSONA}\n\
         Current user state:\n{}\n\n\
         Current tasks:\n{}\n\n\
         Reply with JSON: {{\"chat_response\": string, \"suggested_tasks\": [{{\"title\": string, \
         \"description\": string, \"priority\": \"low\"|\"medium\"|\"high\"|\"urgent\", \
         \"kind\": \"task\"|\"chat_prompt\"}}]}}. \
         Keep chat_response to a few supportive sentences. Suggest at most 2 items, \
         and only when they clearly help.",
        if state.is_empty() {
            "(unknown)".to_string()
        } else {
            state.join("\n")
        },
        tasks
    );

    vec![Message::system(system), Message::user(message)]
}

fn task_list(tasks: &[TaskSummary]) -> String {
    if tasks.is_empty() {
        return "(none)".into();
    }
    tasks
        .iter()
        .take(MAX_PROMPT_TASKS)
        .map(|t| {
            let mut line = format!("- {} [{}, {}]", t.title, t.status, t.priority);
            if let Some(d) = t.description.as_deref().filter(|d| !d.trim().is_empty()) {
                line.push_str(": ");
                line.push_str(&truncate_chars(d, MAX_TASK_DESCRIPTION_CHARS));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ob_domain::{Energy, Priority, TaskStatus};

    fn summary(i: usize) -> TaskSummary {
        TaskSummary {
            title: format!("task {i}"),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            description: Some("d".repeat(300)),
        }
    }

    #[test]
    fn chat_prompt_limits_tasks_and_descriptions() {
        let ctx = ChatContext {
            mode: Some(Mode::Build),
            mood: Some(Mood::Tired),
            energy: Energy::new(20).ok(),
            tasks: (0..15).map(summary).collect(),
        };
        let messages = chat("help", &ctx);
        let system = &messages[0].content;
        assert!(system.contains("task 9 ["));
        assert!(!system.contains("task 10 ["));
        assert!(system.contains(&format!("{}…", "d".repeat(MAX_TASK_DESCRIPTION_CHARS))));
        assert!(!system.contains(&"d".repeat(MAX_TASK_DESCRIPTION_CHARS + 1)));
        assert!(system.contains("Mode: build"));
        assert!(system.contains("Energy: 20/100 (low energy)"));
        assert_eq!(messages[1].content, "help");
    }

    #[test]
    fn chat_prompt_without_state() {
        let messages = chat("hi", &ChatContext::default());
        assert!(messages[0].content.contains("(unknown)"));
        assert!(messages[0].content.contains("(none)"));
    }
}
