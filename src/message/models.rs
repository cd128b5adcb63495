use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recipient token addressing every participant
pub const BROADCAST_RECIPIENT: &str = "Todos";

/// Kind of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    /// System-generated join/leave notice
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
            MessageKind::Status => "status",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageKind::Message),
            "private_message" => Ok(MessageKind::PrivateMessage),
            "status" => Ok(MessageKind::Status),
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

/// Stored message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageModel {
    #[serde(alias = "user")]
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String, // HH:mm:ss, local time of insertion
}

impl MessageModel {
    /// Creates a message stamped with the current time
    pub fn new(from: String, to: String, text: String, kind: MessageKind) -> Self {
        Self {
            from,
            to,
            text,
            kind,
            time: format_time_now(),
        }
    }

    /// Broadcast notice announcing that a participant joined
    pub fn joined_notice(name: &str) -> Self {
        Self::new(
            name.to_string(),
            BROADCAST_RECIPIENT.to_string(),
            "entra na sala...".to_string(),
            MessageKind::Status,
        )
    }

    /// Broadcast notice announcing that a participant left
    pub fn left_notice(name: &str) -> Self {
        Self::new(
            name.to_string(),
            BROADCAST_RECIPIENT.to_string(),
            "sai da sala...".to_string(),
            MessageKind::Status,
        )
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST_RECIPIENT
    }

    /// A user sees messages they sent, messages addressed to them, and broadcasts
    pub fn is_visible_to(&self, user: &str) -> bool {
        self.from == user || self.to == user || self.is_broadcast()
    }
}

fn format_time_now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
