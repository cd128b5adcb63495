use serde::Deserialize;
use serde_json::Value;

use super::models::MessageKind;
use crate::shared::AppError;

/// Request payload for posting a message
///
/// Fields stay untyped until `validate`, so a wrong JSON type is reported
/// alongside every other violation.
#[derive(Debug, Default, Deserialize)]
pub struct CreateMessageRequest {
    pub to: Option<Value>,
    pub text: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<Value>,
}

/// A message payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMessage {
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
}

impl CreateMessageRequest {
    /// Checks every field and reports all violations at once
    pub fn validate(self) -> Result<ValidatedMessage, AppError> {
        let mut violations = Vec::new();

        let to = required_string("to", self.to, &mut violations);
        let text = required_string("text", self.text, &mut violations);

        let kind = match self.kind.as_ref().map(Value::as_str) {
            None => {
                violations.push("\"type\" is required".to_string());
                None
            }
            Some(Some("message")) => Some(MessageKind::Message),
            Some(Some("private_message")) => Some(MessageKind::PrivateMessage),
            Some(_) => {
                violations.push("\"type\" must be one of [message, private_message]".to_string());
                None
            }
        };

        match (to, text, kind) {
            (Some(to), Some(text), Some(kind)) if violations.is_empty() => {
                Ok(ValidatedMessage { to, text, kind })
            }
            _ => Err(AppError::Validation(violations)),
        }
    }
}

fn required_string(
    field: &str,
    value: Option<Value>,
    violations: &mut Vec<String>,
) -> Option<String> {
    match value {
        None => {
            violations.push(format!("\"{}\" is required", field));
            None
        }
        Some(Value::String(v)) if v.is_empty() => {
            violations.push(format!("\"{}\" is not allowed to be empty", field));
            None
        }
        Some(Value::String(v)) => Some(v),
        Some(_) => {
            violations.push(format!("\"{}\" must be a string", field));
            None
        }
    }
}

/// Query string for message retrieval
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<String>,
}

impl MessagesQuery {
    /// Parses `limit` as a positive integer when present
    pub fn limit(&self) -> Result<Option<usize>, AppError> {
        match self.limit.as_deref() {
            None => Ok(None),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => Ok(Some(limit)),
                _ => Err(AppError::BadRequest(format!(
                    "limit must be a positive integer, got {:?}",
                    raw
                ))),
            },
        }
    }
}
