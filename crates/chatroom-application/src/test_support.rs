//! Shared fixtures for the use case and reaper tests.

use crate::room_usecase::RoomUseCase;
use async_trait::async_trait;
use chatroom_core::clock::{Clock, ManualClock};
use chatroom_core::error::{ChatError, Result};
use chatroom_core::message::{Message, MessageDraft, MessageRepository};
use chatroom_core::participant::{Participant, ParticipantRepository};
use chatroom_infrastructure::{InMemoryMessageRepository, InMemoryParticipantRepository};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// A room wired to in-memory stores and a manual clock.
pub struct Room {
    pub usecase: RoomUseCase,
    pub clock: ManualClock,
    pub participants: Arc<dyn ParticipantRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Room {
    pub fn new() -> Self {
        Self::with_stores(
            Arc::new(InMemoryParticipantRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
        )
    }

    pub fn with_messages(messages: Arc<dyn MessageRepository>) -> Self {
        Self::with_stores(Arc::new(InMemoryParticipantRepository::new()), messages)
    }

    pub fn with_stores(
        participants: Arc<dyn ParticipantRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        let clock = ManualClock::new(start_time());
        let usecase = RoomUseCase::new(
            participants.clone(),
            messages.clone(),
            Arc::new(clock.clone()),
        );
        Self {
            usecase,
            clock,
            participants,
            messages,
        }
    }
}

/// Message log whose appends can be switched to fail.
#[derive(Default)]
pub struct FlakyMessageRepository {
    inner: InMemoryMessageRepository,
    failing: AtomicBool,
}

impl FlakyMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageRepository for FlakyMessageRepository {
    async fn append(&self, draft: MessageDraft) -> Result<Message> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChatError::storage("message log offline"));
        }
        self.inner.append(draft).await
    }

    async fn find_visible_to(
        &self,
        requester: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        self.inner.find_visible_to(requester, limit).await
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        self.inner.list_all().await
    }

    async fn remove_all(&self) -> Result<()> {
        self.inner.remove_all().await
    }
}

/// Registry whose scans and removals can be switched to fail.
#[derive(Default)]
pub struct FlakyParticipantRepository {
    inner: InMemoryParticipantRepository,
    failing_list: AtomicBool,
    failing_remove: AtomicBool,
}

impl FlakyParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing_list(&self, failing: bool) {
        self.failing_list.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_remove(&self, failing: bool) {
        self.failing_remove.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ParticipantRepository for FlakyParticipantRepository {
    async fn insert(&self, participant: &Participant) -> Result<()> {
        self.inner.insert(participant).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>> {
        self.inner.find_by_name(name).await
    }

    async fn touch(&self, name: &str, last_seen: DateTime<Utc>) -> Result<bool> {
        self.inner.touch(name, last_seen).await
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        if self.failing_remove.load(Ordering::SeqCst) {
            return Err(ChatError::storage("registry offline"));
        }
        self.inner.remove(name).await
    }

    async fn remove_all(&self) -> Result<()> {
        self.inner.remove_all().await
    }

    async fn list_all(&self) -> Result<Vec<Participant>> {
        if self.failing_list.load(Ordering::SeqCst) {
            return Err(ChatError::storage("registry offline"));
        }
        self.inner.list_all().await
    }
}

/// Registry that refreshes a participant right before removing it, as if a
/// heartbeat arrived between the reaper's snapshot and its removal.
pub struct HeartbeatOnRemoveRepository {
    inner: Arc<dyn ParticipantRepository>,
    clock: ManualClock,
}

impl HeartbeatOnRemoveRepository {
    pub fn new(inner: Arc<dyn ParticipantRepository>, clock: ManualClock) -> Self {
        Self { inner, clock }
    }
}

#[async_trait]
impl ParticipantRepository for HeartbeatOnRemoveRepository {
    async fn insert(&self, participant: &Participant) -> Result<()> {
        self.inner.insert(participant).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Participant>> {
        self.inner.find_by_name(name).await
    }

    async fn touch(&self, name: &str, last_seen: DateTime<Utc>) -> Result<bool> {
        self.inner.touch(name, last_seen).await
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        self.inner.touch(name, self.clock.now()).await?;
        self.inner.remove(name).await
    }

    async fn remove_all(&self) -> Result<()> {
        self.inner.remove_all().await
    }

    async fn list_all(&self) -> Result<Vec<Participant>> {
        self.inner.list_all().await
    }
}
