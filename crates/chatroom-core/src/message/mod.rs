//! Message domain module.
//!
//! This module contains the chat message models, the visibility rule that
//! decides who may read a message, and the append-only log interface.
//!
//! # Module Structure
//!
//! - `model`: `MessageKind`, `MessageDraft`, `Message`, limit parsing
//! - `repository`: Message log trait for persistence

mod model;
mod repository;

// Re-export public API
pub use model::{
    BROADCAST_RECIPIENT, JOINED_TEXT, LEFT_TEXT, Message, MessageDraft, MessageKind, parse_limit,
};
pub use repository::MessageRepository;
