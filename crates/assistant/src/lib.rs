//! AI assistant adapter.
//!
//! Four operations, each wrapping at most one LLM call. Every failure
//! (no provider, transport error, unparseable reply) is converted into
//! static fallback content, so none of these operations return an error.

pub mod assistant;
pub mod fallback;
pub mod parse;
pub mod prompts;

pub use assistant::{Assistant, ChatContext, ChatReply, Reframe, SuggestedTask, SuggestionKind, TaskSummary};
