//! Relational persistence for Orbit on SQLite.
//!
//! One [`Store`] owns a single connection behind a mutex. Every query is
//! scoped by the owning user id; rows belonging to other users are never
//! visible.

mod codec;
pub mod db;
pub mod messages;
pub mod reflections;
pub mod sessions;
pub mod tasks;
pub mod users;

pub use db::Store;
pub use reflections::{Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use sessions::{SessionStart, StartSession};
pub use tasks::TaskFilter;
pub use users::User;
