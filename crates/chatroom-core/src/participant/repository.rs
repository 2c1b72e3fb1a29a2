//! Participant repository trait.
//!
//! Defines the interface for the participant registry.

use super::model::Participant;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An abstract registry of live participants keyed by name.
///
/// # Implementation Notes
///
/// - `insert` must be atomic: two concurrent inserts of the same name may not
///   both succeed. Implementations enforce this as a unique constraint, never
///   as a separate find-then-insert pair.
/// - Operations on the same name are linearizable with each other.
/// - Operations on different names may proceed concurrently.
/// - Storage failures are reported as `ChatError::StorageUnavailable`.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Inserts a participant if its name is not taken.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Participant stored
    /// - `Err(ChatError::Conflict)`: A participant with this name is already live
    /// - `Err(_)`: Storage failure
    async fn insert(&self, participant: &Participant) -> Result<()>;

    /// Finds a participant by name.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Participant))`: Participant found
    /// - `Ok(None)`: No live participant with this name
    /// - `Err(_)`: Storage failure
    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>>;

    /// Refreshes `last_seen` for an existing participant.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: Participant updated
    /// - `Ok(false)`: No live participant with this name
    /// - `Err(_)`: Storage failure
    async fn touch(&self, name: &str, last_seen: DateTime<Utc>) -> Result<bool>;

    /// Removes a participant.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: An entry was deleted by this call
    /// - `Ok(false)`: Nothing to delete
    /// - `Err(_)`: Storage failure
    async fn remove(&self, name: &str) -> Result<bool>;

    /// Removes every participant.
    async fn remove_all(&self) -> Result<()>;

    /// Returns a point-in-time copy of all participants, ordered by name.
    async fn list_all(&self) -> Result<Vec<Participant>>;
}
