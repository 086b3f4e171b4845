//! Personality phrase bank.

use ob_domain::{Mode, TimeOfDay, Valence};

/// Short closing nudges appended to most messages.
pub const NUDGES: &[&str] = &[
    "One small step at a time.",
    "You've got this.",
    "Progress over perfection.",
    "Be kind to yourself today.",
    "Remember to breathe.",
    "Small wins add up.",
];

/// Every entry mentions energy.
pub const LOW_ENERGY: &[&str] = &[
    "Your energy seems low. How about a short break to recharge?",
    "Low energy is a signal, not a failure. A glass of water and a stretch might help.",
    "Running on empty? Protect your energy and pick one gentle task, or rest for a bit.",
];

/// Every entry mentions a task.
pub const NO_TASK: &[&str] = &[
    "Your task list is clear. Add a new task when you're ready, or enjoy the space to rest.",
    "No tasks right now. Want to add one small task, or take a well-earned pause?",
];

pub const MODE_CHANGE_WITHOUT_MODE: &str = "Switching modes. ";

pub fn mode_greeting(mode: Mode) -> &'static str {
    match mode {
        Mode::Build => "Build mode is on: let's focus and get things done.",
        Mode::Flow => "Flow mode is on: follow your curiosity and let ideas come.",
        Mode::Restore => "Restore mode is on: go gently and give yourself room to recover.",
    }
}

pub fn reflection_response(bucket: Valence) -> &'static str {
    match bucket {
        Valence::Positive => "Love hearing that! Celebrate what went well today.",
        Valence::Neutral => "Thanks for taking a moment to reflect.",
        Valence::Negative => {
            "Thank you for being honest about a hard day. Tomorrow is a fresh start."
        }
    }
}

pub fn time_greeting(time_of_day: TimeOfDay) -> &'static str {
    match time_of_day {
        TimeOfDay::Morning => "Good morning!",
        TimeOfDay::Afternoon => "Good afternoon!",
        TimeOfDay::Evening => "Good evening!",
        TimeOfDay::Night => "Working late tonight? Hope you're winding down soon, night owl.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_energy_phrases_mention_energy() {
        assert!(LOW_ENERGY.iter().all(|p| p.to_lowercase().contains("energy")));
    }

    #[test]
    fn no_task_phrases_mention_task() {
        assert!(NO_TASK.iter().all(|p| p.to_lowercase().contains("task")));
    }

    #[test]
    fn greetings_name_their_time_of_day() {
        for t in [
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
            TimeOfDay::Night,
        ] {
            assert!(time_greeting(t).to_lowercase().contains(t.as_str()));
        }
    }
}
