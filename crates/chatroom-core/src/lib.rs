//! Domain layer for the chatroom.
//!
//! Participants, messages, the repository traits the stores implement, and
//! the clock every time-dependent decision reads from.

pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod participant;

// Re-export common error type
pub use error::ChatError;
