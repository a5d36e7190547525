use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a single delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    /// Non-terminal failure; the dispatcher will retry
    FailedAttempt,
    /// Terminal failure; no further attempts
    Failure,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Success, Outcome::FailedAttempt, Outcome::Failure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::FailedAttempt => "FAILED_ATTEMPT",
            Self::Failure => "FAILURE",
        }
    }

    /// `SUCCESS` and `FAILURE` end a task
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(Self::Success),
            "FAILED_ATTEMPT" => Ok(Self::FailedAttempt),
            "FAILURE" => Ok(Self::Failure),
            other => Err(format!("unknown outcome: {}", other)),
        }
    }
}

/// One persisted try within a delivery task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAttemptRecord {
    pub id: i64,
    /// Shared by every attempt of one logical delivery
    pub delivery_task_id: String,
    /// Soft reference; the subscription may no longer exist
    pub subscription_id: String,
    /// URL actually dialed for this attempt
    pub target_url: String,
    /// ISO-8601 completion time, with or without offset
    pub timestamp: String,
    /// 1-based ordinal within the task
    pub attempt_number: u32,
    pub outcome: Outcome,
    /// Absent when no response was received (transport failure)
    #[serde(default)]
    pub http_status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl DeliveryAttemptRecord {
    /// Whether the HTTP status lies in `[200, 300)`.
    ///
    /// Independent of `outcome`: a `FAILED_ATTEMPT` may still carry a 2xx.
    pub fn is_http_success(&self) -> bool {
        self.http_status_code
            .is_some_and(|code| (200..300).contains(&code))
    }

    /// Parse `timestamp` into a naive local time.
    ///
    /// Accepts RFC 3339 as well as the offset-less form the status service emits.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.naive_local());
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    /// Compact timestamp for tables ("May 1, 10:00:00"); raw text if unparseable
    pub fn short_timestamp(&self) -> String {
        self.parsed_timestamp()
            .map(|ts| ts.format("%b %-d, %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }

    /// Full timestamp for detail views
    pub fn full_timestamp(&self) -> String {
        self.parsed_timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }

    /// Status code for display, `-` when no response was received
    pub fn status_display(&self) -> String {
        self.http_status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    /// Task id shortened for table display
    pub fn short_task_id(&self) -> &str {
        truncate_id(&self.delivery_task_id, 8)
    }
}

/// First `len` characters of an identifier
pub fn truncate_id(id: &str, len: usize) -> &str {
    match id.char_indices().nth(len) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
