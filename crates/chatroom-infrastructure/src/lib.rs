pub mod config_service;
pub mod memory_message_repository;
pub mod memory_participant_repository;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::memory_message_repository::InMemoryMessageRepository;
pub use crate::memory_participant_repository::InMemoryParticipantRepository;
