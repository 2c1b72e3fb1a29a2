//! Chat message types.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Destination meaning "visible to all participants".
pub const BROADCAST_RECIPIENT: &str = "Todos";

/// Status text appended when a participant joins.
pub const JOINED_TEXT: &str = "entered the room";

/// Status text appended when a participant leaves or is evicted.
pub const LEFT_TEXT: &str = "left the room";

/// The kind of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Join/leave notification
    Status,
    /// Public broadcast
    Message,
    /// Addressed to a single participant
    PrivateMessage,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Message => "message",
            Self::PrivateMessage => "private_message",
        }
    }

    /// Kinds that every participant may read regardless of the recipient.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Status | Self::Message)
    }

    /// Kinds a participant may send directly. Status messages are produced
    /// by the room itself.
    pub fn is_sendable(&self) -> bool {
        matches!(self, Self::Message | Self::PrivateMessage)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(Self::Status),
            "message" => Ok(Self::Message),
            "private_message" => Ok(Self::PrivateMessage),
            other => Err(ChatError::validation(format!(
                "unknown message type '{}'",
                other
            ))),
        }
    }
}

/// A message that has not been appended to the log yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
    /// Display time (`HH:MM:SS`)
    pub time: String,
}

impl MessageDraft {
    /// Builds the broadcast status message announcing `name`'s arrival or departure.
    pub fn status(name: impl Into<String>, text: &str, time: String) -> Self {
        Self {
            from: name.into(),
            to: BROADCAST_RECIPIENT.to_string(),
            text: text.to_string(),
            kind: MessageKind::Status,
            time,
        }
    }

    /// Checks the invariants every logged message must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(ChatError::validation("message sender must not be empty"));
        }
        if self.to.trim().is_empty() {
            return Err(ChatError::validation("message recipient must not be empty"));
        }
        if self.text.trim().is_empty() {
            return Err(ChatError::validation("message text must not be empty"));
        }
        Ok(())
    }
}

/// A message stored in the log.
///
/// `seq` is assigned by the log on append and strictly increases in insertion
/// order, so it orders messages even across midnight where `time` does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub seq: u64,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

impl Message {
    pub fn from_draft(seq: u64, draft: MessageDraft) -> Self {
        Self {
            seq,
            from: draft.from,
            to: draft.to,
            text: draft.text,
            kind: draft.kind,
            time: draft.time,
        }
    }

    /// Broadcasts and status updates are visible to everyone; private messages
    /// only to their recipient.
    pub fn is_visible_to(&self, requester: &str) -> bool {
        self.kind.is_public() || self.to == requester
    }
}

/// Interprets a tail limit supplied as text.
///
/// Missing, non-numeric, zero and negative values all mean "no limit".
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
}
