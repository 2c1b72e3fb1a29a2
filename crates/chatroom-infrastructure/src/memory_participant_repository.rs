//! In-memory participant registry.

use async_trait::async_trait;
use chatroom_core::error::{ChatError, Result};
use chatroom_core::participant::{Participant, ParticipantRepository};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Participant registry held in process memory.
///
/// Every mutation takes the write lock, which makes insert-if-absent a single
/// atomic step. Clones share the same registry.
#[derive(Clone, Default)]
pub struct InMemoryParticipantRepository {
    participants: Arc<RwLock<BTreeMap<String, Participant>>>,
}

impl InMemoryParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    async fn insert(&self, participant: &Participant) -> Result<()> {
        let mut participants = self.participants.write().await;
        match participants.entry(participant.name.clone()) {
            Entry::Occupied(_) => Err(ChatError::conflict("participant", &participant.name)),
            Entry::Vacant(slot) => {
                slot.insert(participant.clone());
                Ok(())
            }
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>> {
        let participants = self.participants.read().await;
        Ok(participants.get(name).cloned())
    }

    async fn touch(&self, name: &str, last_seen: DateTime<Utc>) -> Result<bool> {
        let mut participants = self.participants.write().await;
        match participants.get_mut(name) {
            Some(participant) => {
                participant.last_seen = last_seen;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        let mut participants = self.participants.write().await;
        Ok(participants.remove(name).is_some())
    }

    async fn remove_all(&self) -> Result<()> {
        self.participants.write().await.clear();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Participant>> {
        let participants = self.participants.read().await;
        Ok(participants.values().cloned().collect())
    }
}
