//! Room use case implementation.
//!
//! This module provides the `RoomUseCase`, the entry point the outer shell
//! (HTTP handlers, the CLI) invokes for every request. It composes the
//! participant registry and the message log and owns the rules that span
//! both: every join is announced, senders must be live, and private messages
//! stay private.

use chatroom_core::clock::Clock;
use chatroom_core::error::{ChatError, Result};
use chatroom_core::message::{
    JOINED_TEXT, LEFT_TEXT, Message, MessageDraft, MessageKind, MessageRepository,
};
use chatroom_core::participant::{Participant, ParticipantRepository, validate_name};
use serde::Deserialize;
use std::sync::Arc;

/// Body of a send request as received from the shell.
///
/// The sender is deliberately absent: it comes from the caller's established
/// identity, never from the body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendMessageRequest {
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl SendMessageRequest {
    pub fn new(to: impl Into<String>, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            to: to.into(),
            text: text.into(),
            kind: kind.as_str().to_string(),
        }
    }
}

/// Request-level operations on the room.
///
/// # Thread Safety
///
/// `RoomUseCase` holds only `Arc`s to the stores and is shared freely
/// between request tasks; all synchronization lives in the repositories.
pub struct RoomUseCase {
    /// Registry of live participants
    participant_repository: Arc<dyn ParticipantRepository>,
    /// Append-only message log
    message_repository: Arc<dyn MessageRepository>,
    /// Time source for heartbeats and message timestamps
    clock: Arc<dyn Clock>,
}

impl RoomUseCase {
    pub fn new(
        participant_repository: Arc<dyn ParticipantRepository>,
        message_repository: Arc<dyn MessageRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participant_repository,
            message_repository,
            clock,
        }
    }

    /// Adds `name` to the room and announces the arrival.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is blank
    /// - `Conflict` if the name is already live; nothing is written
    /// - `StorageUnavailable` if either store fails. When the announcement
    ///   fails after the registry insert, the participant stays joined.
    pub async fn join_room(&self, name: &str) -> Result<Participant> {
        validate_name(name)?;

        let now = self.clock.now();
        let participant = Participant::new(name, now);
        if let Err(e) = self.participant_repository.insert(&participant).await {
            if e.is_conflict() {
                tracing::info!("[RoomUseCase] Rejected duplicate join for '{}'", name);
            }
            return Err(e);
        }

        let announcement = MessageDraft::status(name, JOINED_TEXT, self.clock.format_time(now));
        if let Err(e) = self.message_repository.append(announcement).await {
            tracing::warn!(
                "[RoomUseCase] '{}' joined but the announcement was not stored: {}",
                name,
                e
            );
            return Err(e);
        }

        tracing::info!("[RoomUseCase] '{}' joined the room", name);
        Ok(participant)
    }

    /// Refreshes the liveness of `name`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the participant is not live, for example because the
    /// reaper already evicted it.
    pub async fn send_heartbeat(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        let now = self.clock.now();
        if self.participant_repository.touch(name, now).await? {
            tracing::trace!("[RoomUseCase] Heartbeat from '{}'", name);
            Ok(())
        } else {
            Err(ChatError::not_found("participant", name))
        }
    }

    /// Appends a chat message sent by `from`.
    ///
    /// `from` must be a live participant. Only `message` and
    /// `private_message` may be sent; status messages belong to the room.
    pub async fn send_message(&self, from: &str, request: SendMessageRequest) -> Result<Message> {
        let kind: MessageKind = request.kind.parse()?;
        if !kind.is_sendable() {
            return Err(ChatError::validation(format!(
                "message type '{}' cannot be sent",
                kind
            )));
        }

        let draft = MessageDraft {
            from: from.to_string(),
            to: request.to,
            text: request.text,
            kind,
            time: String::new(),
        };
        draft.validate()?;

        if self.participant_repository.find_by_name(from).await?.is_none() {
            return Err(ChatError::validation(format!(
                "sender '{}' is not in the room",
                from
            )));
        }

        let draft = MessageDraft {
            time: self.clock.format_time(self.clock.now()),
            ..draft
        };
        let message = self.message_repository.append(draft).await?;

        tracing::debug!(
            "[RoomUseCase] Message #{} {} -> {} ({})",
            message.seq,
            message.from,
            message.to,
            message.kind
        );
        Ok(message)
    }

    /// Returns the messages `requester` may read, oldest first, optionally
    /// only the last `limit` of them.
    pub async fn read_messages(
        &self,
        requester: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        let limit = limit.filter(|limit| *limit > 0);
        self.message_repository
            .find_visible_to(requester, limit)
            .await
    }

    /// Returns a snapshot of the live participants, ordered by name.
    pub async fn list_participants(&self) -> Result<Vec<Participant>> {
        self.participant_repository.list_all().await
    }

    /// Removes `name` and announces the departure.
    ///
    /// Idempotent: leaving twice, or leaving after being evicted, writes
    /// nothing and returns `Ok(false)`.
    pub async fn leave_room(&self, name: &str) -> Result<bool> {
        if !self.participant_repository.remove(name).await? {
            return Ok(false);
        }

        let departure =
            MessageDraft::status(name, LEFT_TEXT, self.clock.format_time(self.clock.now()));
        self.message_repository.append(departure).await?;

        tracing::info!("[RoomUseCase] '{}' left the room", name);
        Ok(true)
    }

    /// Clears both the registry and the log.
    ///
    /// Administrative operation; not part of steady-state chat.
    pub async fn reset_room(&self) -> Result<()> {
        self.participant_repository.remove_all().await?;
        self.message_repository.remove_all().await?;

        tracing::info!("[RoomUseCase] Room reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FlakyMessageRepository, Room};
    use chatroom_core::message::BROADCAST_RECIPIENT;

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_join_announces_exactly_once() {
        let room = Room::new();

        room.usecase.join_room("alice").await.unwrap();

        let log = room.messages.list_all().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].from, "alice");
        assert_eq!(log[0].to, BROADCAST_RECIPIENT);
        assert_eq!(log[0].text, JOINED_TEXT);
        assert_eq!(log[0].kind, MessageKind::Status);
    }

    #[tokio::test]
    async fn test_duplicate_join_conflicts_without_side_effects() {
        let room = Room::new();
        room.usecase.join_room("alice").await.unwrap();

        let err = room.usecase.join_room("alice").await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(room.usecase.list_participants().await.unwrap().len(), 1);
        assert_eq!(room.messages.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let room = Room::new();

        let err = room.usecase.join_room("  ").await.unwrap_err();

        assert!(err.is_validation());
        assert!(room.usecase.list_participants().await.unwrap().is_empty());
        assert!(room.messages.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_heartbeat_refreshes_last_seen() {
        let room = Room::new();
        let joined = room.usecase.join_room("alice").await.unwrap();

        room.clock.advance_secs(8);
        room.usecase.send_heartbeat("alice").await.unwrap();

        let alice = room.usecase.list_participants().await.unwrap().remove(0);
        assert_eq!((alice.last_seen - joined.last_seen).num_seconds(), 8);
    }

    #[tokio::test]
    async fn test_heartbeat_for_unknown_participant_is_not_found() {
        let room = Room::new();

        let err = room.usecase.send_heartbeat("ghost").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_send_rejects_status_and_unknown_types() {
        let room = Room::new();
        room.usecase.join_room("a").await.unwrap();

        let status = SendMessageRequest::new(BROADCAST_RECIPIENT, "hi", MessageKind::Status);
        assert!(room.usecase.send_message("a", status).await.unwrap_err().is_validation());

        let bogus = SendMessageRequest {
            to: BROADCAST_RECIPIENT.to_string(),
            text: "hi".to_string(),
            kind: "shout".to_string(),
        };
        assert!(room.usecase.send_message("a", bogus).await.unwrap_err().is_validation());

        assert_eq!(room.messages.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_rejects_empty_fields() {
        let room = Room::new();
        room.usecase.join_room("a").await.unwrap();

        let no_text = SendMessageRequest::new(BROADCAST_RECIPIENT, "", MessageKind::Message);
        assert!(room.usecase.send_message("a", no_text).await.unwrap_err().is_validation());

        let no_recipient = SendMessageRequest::new("", "hi", MessageKind::PrivateMessage);
        assert!(
            room.usecase
                .send_message("a", no_recipient)
                .await
                .unwrap_err()
                .is_validation()
        );
    }

    #[tokio::test]
    async fn test_send_requires_live_sender() {
        let room = Room::new();

        let request = SendMessageRequest::new(BROADCAST_RECIPIENT, "hi", MessageKind::Message);
        let err = room.usecase.send_message("mallory", request).await.unwrap_err();

        assert!(err.is_validation());
        assert!(room.messages.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sender_comes_from_caller_identity() {
        let room = Room::new();
        room.usecase.join_room("a").await.unwrap();

        // A forged "from" in the body is not a field the request can carry
        let body = serde_json::json!({
            "from": "b",
            "to": "Todos",
            "text": "hello",
            "type": "message",
        });
        let request: SendMessageRequest = serde_json::from_value(body).unwrap();
        let message = room.usecase.send_message("a", request).await.unwrap();

        assert_eq!(message.from, "a");
    }

    #[tokio::test]
    async fn test_read_applies_visibility_and_limit() {
        let room = Room::new();
        room.usecase.join_room("a").await.unwrap();
        room.usecase.join_room("b").await.unwrap();
        room.usecase
            .send_message("a", SendMessageRequest::new("b", "psst", MessageKind::PrivateMessage))
            .await
            .unwrap();
        room.usecase
            .send_message(
                "b",
                SendMessageRequest::new(BROADCAST_RECIPIENT, "hello all", MessageKind::Message),
            )
            .await
            .unwrap();

        let for_c = room.usecase.read_messages("c", None).await.unwrap();
        assert_eq!(texts(&for_c), vec![JOINED_TEXT, JOINED_TEXT, "hello all"]);

        let last_two_for_b = room.usecase.read_messages("b", Some(2)).await.unwrap();
        assert_eq!(texts(&last_two_for_b), vec!["psst", "hello all"]);

        let zero_means_all = room.usecase.read_messages("b", Some(0)).await.unwrap();
        assert_eq!(zero_means_all.len(), 4);
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        let room = Room::new();
        room.usecase.join_room("a").await.unwrap();

        assert!(room.usecase.leave_room("a").await.unwrap());
        assert!(!room.usecase.leave_room("a").await.unwrap());

        let log = room.messages.list_all().await.unwrap();
        assert_eq!(texts(&log), vec![JOINED_TEXT, LEFT_TEXT]);
        assert!(room.usecase.list_participants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let room = Room::new();
        room.usecase.join_room("a").await.unwrap();
        room.usecase.join_room("b").await.unwrap();

        room.usecase.reset_room().await.unwrap();

        assert!(room.usecase.list_participants().await.unwrap().is_empty());
        assert!(room.usecase.read_messages("a", None).await.unwrap().is_empty());
        // Names are free again
        room.usecase.join_room("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_announcement_keeps_join() {
        let messages = Arc::new(FlakyMessageRepository::new());
        let room = Room::with_messages(messages.clone());
        messages.set_failing(true);

        let err = room.usecase.join_room("alice").await.unwrap_err();

        assert!(err.is_transient());
        let names: Vec<_> = room
            .usecase
            .list_participants()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alice"]);
    }
}
