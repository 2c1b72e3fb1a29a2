//! Message repository trait.
//!
//! Defines the interface for the append-only message log.

use super::model::{Message, MessageDraft};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract append-only message log.
///
/// # Implementation Notes
///
/// - Appends never reorder or mutate existing entries.
/// - Sequence numbers are assigned under the same synchronization as the
///   append, so `seq` order equals insertion order.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a message to the end of the log.
    ///
    /// # Returns
    ///
    /// - `Ok(Message)`: The stored message with its assigned `seq`
    /// - `Err(_)`: Storage failure
    async fn append(&self, draft: MessageDraft) -> Result<Message>;

    /// Returns the messages `requester` may read, oldest first.
    ///
    /// # Arguments
    ///
    /// * `requester` - Name of the reading participant
    /// * `limit` - If set, only the last `limit` visible messages are returned
    async fn find_visible_to(&self, requester: &str, limit: Option<usize>)
    -> Result<Vec<Message>>;

    /// Returns the whole log, oldest first.
    async fn list_all(&self) -> Result<Vec<Message>>;

    /// Empties the log.
    async fn remove_all(&self) -> Result<()>;
}
