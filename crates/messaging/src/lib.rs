//! Contextual messaging: maps a trigger event plus ambient user state to a
//! short assistant-authored message.

pub mod generator;
pub mod phrases;
pub mod trigger;

pub use generator::{
    ChatMessagePayload, ContextualMessageRequest, ContextualMessageResponse, MessageGenerator,
    ResponseMetadata, DEFAULT_VERSION,
};
pub use trigger::{MessageContext, Trigger};
