use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stored participant record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantModel {
    pub name: String,
    pub last_status: i64, // Milliseconds since the Unix epoch
}

impl ParticipantModel {
    /// Creates a participant whose last heartbeat is now
    pub fn new(name: String) -> Self {
        Self {
            name,
            last_status: now_millis(),
        }
    }

    /// True when the last heartbeat is strictly older than the threshold
    pub fn is_inactive(&self, now_ms: i64, inactivity_threshold: Duration) -> bool {
        now_ms - self.last_status > inactivity_threshold.as_millis() as i64
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_participant_is_active() {
        let participant = ParticipantModel::new("Maria".to_string());
        assert!(!participant.is_inactive(now_millis(), Duration::from_secs(10)));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let participant = ParticipantModel {
            name: "Maria".to_string(),
            last_status: 1_000,
        };

        assert!(!participant.is_inactive(11_000, Duration::from_millis(10_000)));
        assert!(participant.is_inactive(11_001, Duration::from_millis(10_000)));
    }

    #[test]
    fn test_serializes_last_status_in_camel_case() {
        let participant = ParticipantModel {
            name: "Maria".to_string(),
            last_status: 42,
        };

        let json = serde_json::to_value(&participant).unwrap();
        assert_eq!(json["name"], "Maria");
        assert_eq!(json["lastStatus"], 42);
    }
}
