//! Field-level validation for request bodies.
//!
//! Serde rejects structurally wrong input (unknown enum values, wrong
//! types); [`Validate`] covers the rules serde cannot express, such as
//! length limits and "at least one of" constraints.

use crate::error::FieldError;
use crate::reflection::NewReflection;
use crate::task::{NewTask, Subtask, TaskPatch};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 2_000;
/// One week.
pub const MAX_ESTIMATE_MINUTES: u32 = 10_080;
pub const MAX_SUBTASKS: usize = 50;
pub const MAX_TAG_CHARS: usize = 40;

pub trait Validate {
    /// Every problem with the value; empty when valid.
    fn validate(&self) -> Vec<FieldError>;
}

fn check_title(field: &str, title: &str, out: &mut Vec<FieldError>) {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        out.push(FieldError::new(field, "must not be empty"));
    } else if trimmed.chars().count() > MAX_TITLE_CHARS {
        out.push(FieldError::new(
            field,
            format!("must be at most {MAX_TITLE_CHARS} characters"),
        ));
    }
}

fn check_description(description: Option<&str>, out: &mut Vec<FieldError>) {
    if let Some(d) = description {
        if d.chars().count() > MAX_DESCRIPTION_CHARS {
            out.push(FieldError::new(
                "description",
                format!("must be at most {MAX_DESCRIPTION_CHARS} characters"),
            ));
        }
    }
}

fn check_estimate(minutes: Option<u32>, out: &mut Vec<FieldError>) {
    if let Some(m) = minutes {
        if m > MAX_ESTIMATE_MINUTES {
            out.push(FieldError::new(
                "estimatedMinutes",
                format!("must be at most {MAX_ESTIMATE_MINUTES}"),
            ));
        }
    }
}

fn check_tags<'a>(tags: impl IntoIterator<Item = &'a String>, out: &mut Vec<FieldError>) {
    for tag in tags {
        let len = tag.trim().chars().count();
        if len == 0 || len > MAX_TAG_CHARS {
            out.push(FieldError::new(
                "tags",
                format!("tags must be 1 to {MAX_TAG_CHARS} characters"),
            ));
            return;
        }
    }
}

fn check_subtask_count(count: usize, out: &mut Vec<FieldError>) {
    if count > MAX_SUBTASKS {
        out.push(FieldError::new(
            "subtasks",
            format!("at most {MAX_SUBTASKS} subtasks"),
        ));
    }
}

impl Validate for NewTask {
    fn validate(&self) -> Vec<FieldError> {
        let mut out = Vec::new();
        check_title("title", &self.title, &mut out);
        check_description(self.description.as_deref(), &mut out);
        check_estimate(self.estimated_minutes, &mut out);
        check_subtask_count(self.subtasks.len(), &mut out);
        for (i, s) in self.subtasks.iter().enumerate() {
            check_title(&format!("subtasks[{i}]"), s, &mut out);
        }
        check_tags(&self.tags, &mut out);
        out
    }
}

impl Validate for TaskPatch {
    fn validate(&self) -> Vec<FieldError> {
        let mut out = Vec::new();
        if let Some(ref title) = self.title {
            check_title("title", title, &mut out);
        }
        if let Some(Some(ref d)) = self.description {
            check_description(Some(d), &mut out);
        }
        if let Some(estimate) = self.estimated_minutes {
            check_estimate(estimate, &mut out);
        }
        if let Some(ref subtasks) = self.subtasks {
            check_subtask_count(subtasks.len(), &mut out);
            for (i, Subtask { title, .. }) in subtasks.iter().enumerate() {
                check_title(&format!("subtasks[{i}].title"), title, &mut out);
            }
        }
        if let Some(ref tags) = self.tags {
            check_tags(tags, &mut out);
        }
        out
    }
}

impl Validate for NewReflection {
    fn validate(&self) -> Vec<FieldError> {
        let mut out = Vec::new();
        let journal_empty = self.journal.as_deref().map_or(true, |j| j.trim().is_empty());
        if self.wins.trim().is_empty() && self.struggles.trim().is_empty() && journal_empty {
            out.push(FieldError::new(
                "wins",
                "one of wins, struggles or journal is required",
            ));
        }
        if let Some(load) = self.cognitive_load {
            if load > 100 {
                out.push(FieldError::new("cognitiveLoad", "must be between 0 and 100"));
            }
        }
        if let Some(rating) = self.control_rating {
            if !(1..=5).contains(&rating) {
                out.push(FieldError::new("controlRating", "must be between 1 and 5"));
            }
        }
        check_tags(&self.tags, &mut out);
        out
    }
}
