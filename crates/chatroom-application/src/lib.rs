//! Application layer for the chatroom.
//!
//! This crate provides the request-level room operations and the background
//! presence reaper, both composed over the repository traits from
//! `chatroom-core`.

pub mod presence_reaper;
pub mod room_usecase;

#[cfg(test)]
mod test_support;

pub use presence_reaper::{PresenceReaper, ReaperHandle, ReaperState, ReaperStatus, SweepReport};
pub use room_usecase::{RoomUseCase, SendMessageRequest};
