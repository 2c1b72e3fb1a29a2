//! In-memory append-only message log.

use async_trait::async_trait;
use chatroom_core::error::Result;
use chatroom_core::message::{Message, MessageDraft, MessageRepository};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MessageLog {
    next_seq: u64,
    entries: Vec<Message>,
}

/// Message log held in process memory.
///
/// Sequence numbers keep increasing across `remove_all`, so a reader that
/// remembers the last `seq` it saw never confuses a post-reset message with
/// an old one.
#[derive(Clone, Default)]
pub struct InMemoryMessageRepository {
    log: Arc<RwLock<MessageLog>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, draft: MessageDraft) -> Result<Message> {
        draft.validate()?;

        let mut log = self.log.write().await;
        log.next_seq += 1;
        let message = Message::from_draft(log.next_seq, draft);
        log.entries.push(message.clone());
        Ok(message)
    }

    async fn find_visible_to(
        &self,
        requester: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        let log = self.log.read().await;
        let visible = log
            .entries
            .iter()
            .filter(|message| message.is_visible_to(requester));

        let messages = match limit {
            Some(limit) => {
                let mut tail: Vec<Message> = visible.rev().take(limit).cloned().collect();
                tail.reverse();
                tail
            }
            None => visible.cloned().collect(),
        };
        Ok(messages)
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        Ok(self.log.read().await.entries.clone())
    }

    async fn remove_all(&self) -> Result<()> {
        self.log.write().await.entries.clear();
        Ok(())
    }
}
