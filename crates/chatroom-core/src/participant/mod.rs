//! Participant domain module.
//!
//! # Module Structure
//!
//! - `model`: The live participant record (`Participant`) and name validation
//! - `repository`: Registry trait for participant persistence
//!
//! # Usage
//!
//! ```ignore
//! use chatroom_core::participant::{Participant, ParticipantRepository};
//! ```

mod model;
mod repository;

// Re-export public API
pub use model::{Participant, validate_name};
pub use repository::ParticipantRepository;
