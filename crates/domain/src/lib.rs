//! Shared domain model for Orbit.
//!
//! Tasks, reflections, chat messages and focus sessions, the ambient
//! mode/mood/energy vocabulary, the shared error type, configuration, and
//! structured trace events used by every Orbit crate.

pub mod chat;
pub mod config;
pub mod error;
pub mod focus;
pub mod llm;
pub mod mode;
pub mod reflection;
pub mod task;
pub mod trace;
pub mod validate;

pub use chat::{ChatMessage, ChatRole};
pub use focus::FocusSession;
pub use mode::{Energy, Mode, Mood, TimeOfDay, Valence};
pub use reflection::{ClarityGained, NewReflection, Reflection};
pub use task::{NewTask, Priority, Subtask, Task, TaskPatch, TaskStatus};
pub use validate::Validate;
