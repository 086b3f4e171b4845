//! Static content served when the LLM is unavailable or misbehaves.

/// Fixed breakdown used whenever subtasks cannot be generated.
pub const BREAKDOWN: [&str; 4] = [
    "Gather what you need to get started",
    "Break the work into a first small step",
    "Work on the core part of the task",
    "Review and wrap up",
];

pub const QUOTE: &str = "Small steps still move you forward.";

pub const REFRAME_DESCRIPTION: &str = "Start with the smallest first step you can take right now.";

pub const CHAT_TIMEOUT: &str =
    "I'm taking longer than usual to think. Could you try again in a moment?";

pub const CHAT_UNAVAILABLE: &str =
    "I'm having trouble connecting right now, but I'm still here for you. Please try again in a little while.";

pub fn breakdown() -> Vec<String> {
    BREAKDOWN.iter().map(|s| s.to_string()).collect()
}
