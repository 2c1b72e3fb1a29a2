//! Line-oriented command shell over a room.
//!
//! Each input line is one request; each response is one JSON object.
//! Failures carry the HTTP-style status an API front end would map them to
//! (422 validation, 409 conflict, 404 not found, 503 storage).

use chatroom_application::{RoomUseCase, SendMessageRequest};
use chatroom_core::ChatError;
use chatroom_core::message::parse_limit;
use serde_json::{Value, json};

pub const HELP: &str = "\
commands:
  join <name>                         enter the room
  heartbeat <name>                    signal that <name> is still here
  send <from> <to> <type> <text...>   type is message or private_message
  read <name> [limit]                 messages visible to <name>
  who                                 list participants
  leave <name>                        leave the room
  reset                               clear participants and messages
  help                                show this text
  quit                                stop the room";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Join(String),
    Heartbeat(String),
    Send {
        from: String,
        request: SendMessageRequest,
    },
    Read {
        requester: String,
        limit: Option<usize>,
    },
    Who,
    Leave(String),
    Reset,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let mut arg = |what: &str| {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| format!("{}: missing {}", verb, what))
    };

    let command = match verb {
        "join" => ShellCommand::Join(arg("name")?),
        "heartbeat" => ShellCommand::Heartbeat(arg("name")?),
        "send" => {
            let from = arg("sender")?;
            let to = arg("recipient")?;
            let kind = arg("type")?;
            let text = words.collect::<Vec<_>>().join(" ");
            ShellCommand::Send {
                from,
                request: SendMessageRequest { to, text, kind },
            }
        }
        "read" => {
            let requester = arg("name")?;
            let limit = parse_limit(words.next());
            ShellCommand::Read { requester, limit }
        }
        "who" => ShellCommand::Who,
        "leave" => ShellCommand::Leave(arg("name")?),
        "reset" => ShellCommand::Reset,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

/// Runs a parsed command against the room and renders the response.
pub async fn execute(room: &RoomUseCase, command: ShellCommand) -> Value {
    let result = match command {
        ShellCommand::Join(name) => room
            .join_room(&name)
            .await
            .and_then(|participant| to_value(&participant)),
        ShellCommand::Heartbeat(name) => room.send_heartbeat(&name).await.map(|_| Value::Null),
        ShellCommand::Send { from, request } => room
            .send_message(&from, request)
            .await
            .and_then(|message| to_value(&message)),
        ShellCommand::Read { requester, limit } => room
            .read_messages(&requester, limit)
            .await
            .and_then(|messages| to_value(&messages)),
        ShellCommand::Who => room
            .list_participants()
            .await
            .and_then(|participants| to_value(&participants)),
        ShellCommand::Leave(name) => room
            .leave_room(&name)
            .await
            .map(|removed| json!({ "removed": removed })),
        ShellCommand::Reset => room.reset_room().await.map(|_| Value::Null),
        ShellCommand::Help => Ok(Value::String(HELP.to_string())),
        ShellCommand::Quit => Ok(Value::Null),
    };

    match result {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(e) => error_response(&e),
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ChatError> {
    Ok(serde_json::to_value(value)?)
}

/// Status an HTTP front end would answer with for `err`.
pub fn status_for(err: &ChatError) -> u16 {
    match err {
        ChatError::Validation(_) => 422,
        ChatError::Conflict { .. } => 409,
        ChatError::NotFound { .. } => 404,
        ChatError::StorageUnavailable(_) | ChatError::Io { .. } => 503,
        ChatError::Config(_) | ChatError::Serialization { .. } => 500,
    }
}

pub fn error_response(err: &ChatError) -> Value {
    json!({
        "ok": false,
        "status": status_for(err),
        "error": err.to_string(),
    })
}

pub fn parse_error_response(message: &str) -> Value {
    json!({ "ok": false, "status": 400, "error": message })
}
