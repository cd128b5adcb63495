use serde::Deserialize;
use serde_json::Value;

use crate::shared::AppError;

/// Request payload for registering a participant
#[derive(Debug, Default, Deserialize)]
pub struct CreateParticipantRequest {
    pub name: Option<Value>,
}

impl CreateParticipantRequest {
    /// Returns the trimmed name, or every rule the payload breaks
    pub fn validate(self) -> Result<String, AppError> {
        let name = match self.name {
            None => return Err(AppError::Validation(vec!["\"name\" is required".to_string()])),
            Some(Value::String(name)) => name.trim().to_string(),
            Some(_) => {
                return Err(AppError::Validation(vec![
                    "\"name\" must be a string".to_string(),
                ]))
            }
        };

        if name.is_empty() {
            return Err(AppError::Validation(vec![
                "\"name\" is not allowed to be empty".to_string(),
            ]));
        }
        Ok(name)
    }
}
