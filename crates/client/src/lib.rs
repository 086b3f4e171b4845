//! Client-side state for Orbit.
//!
//! [`OptimisticStore`] mirrors the user's tasks and reflections and applies
//! writes locally before the backend confirms them. [`AmbientStore`] keeps
//! mode, mood and energy on disk. Both publish [`DomainEvent`]s on an
//! [`EventBus`]; [`NudgeListener`] turns some of those into contextual
//! messages appended to the [`ChatTranscript`], and [`SessionTracker`] opens
//! a focus session on every mode switch.

pub mod ambient;
pub mod backend;
pub mod events;
pub mod nudge;
pub mod optimistic;
pub mod rest;
pub mod sessions;
pub mod transcript;

pub use ambient::{AmbientState, AmbientStore, Streak};
pub use backend::TaskBackend;
pub use events::{DomainEvent, EventBus};
pub use nudge::NudgeListener;
pub use optimistic::OptimisticStore;
pub use rest::ApiClient;
pub use sessions::SessionTracker;
pub use transcript::ChatTranscript;
