//! Wire types shared by every backend

use crate::{ApiError, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Container status
///
/// Parsed case-insensitively; anything outside the runtime vocabulary is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Unknown,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Restarting => write!(f, "restarting"),
            Self::Removing => write!(f, "removing"),
            Self::Exited => write!(f, "exited"),
            Self::Dead => write!(f, "dead"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for ContainerStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }
}

/// Creation time as the backend reports it: an ISO-8601 string or a Unix epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(f64),
    Text(String),
}

impl Timestamp {
    /// Epoch values above this are taken as milliseconds rather than seconds
    const MILLIS_THRESHOLD: f64 = 1e11;

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(value) if value.is_finite() => {
                let millis = if value.abs() >= Self::MILLIS_THRESHOLD {
                    *value
                } else {
                    value * 1000.0
                };
                Utc.timestamp_millis_opt(millis as i64).single()
            }
            Self::Epoch(_) => None,
            Self::Text(text) => parse_timestamp(text),
        }
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    // Zone-less ISO strings are taken as UTC
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// One row of inventory state as reported by the backend.
///
/// Field decoding never fails: a malformed field degrades on its own row
/// instead of rejecting the whole inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Raw status text, kept verbatim for display
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created: Option<Timestamp>,
}

/// Strings as-is, numbers and booleans as text, anything else empty
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// Numbers and strings become a [`Timestamp`]; anything else is `None`
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(Timestamp::Epoch),
        Value::String(s) => Some(Timestamp::Text(s)),
        _ => None,
    })
}

impl ContainerRecord {
    pub fn status(&self) -> ContainerStatus {
        ContainerStatus::from(self.status.as_str())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_ref().and_then(Timestamp::to_utc)
    }
}

/// Lifecycle action accepted by the per-container action endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Stop,
    Restart,
    Delete,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Delete => "delete",
        }
    }

    /// Label used in the success notification
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Stop => "stopped",
            Self::Restart => "restarted",
            Self::Delete => "deleted",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LifecycleAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// A single lifecycle command, alive only for one dispatch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LifecycleRequest {
    pub container_id: String,
    pub action: LifecycleAction,
}

impl LifecycleRequest {
    pub fn new(container_id: impl Into<String>, action: LifecycleAction) -> Self {
        Self {
            container_id: container_id.into(),
            action,
        }
    }
}

/// Body of `POST /api/containers/{id}/action`
#[derive(Debug, Clone, Serialize)]
pub struct ActionBody {
    pub action: LifecycleAction,
}

/// `GET /api/containers`
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryEnvelope {
    pub success: bool,
    #[serde(default)]
    pub containers: Option<Vec<ContainerRecord>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl InventoryEnvelope {
    pub fn into_result(self) -> Result<Vec<ContainerRecord>> {
        if !self.success {
            return Err(backend_error(self.error, "Failed to fetch containers"));
        }
        Ok(self.containers.unwrap_or_default())
    }
}

/// `POST /api/containers/{id}/action`
#[derive(Debug, Clone, Deserialize)]
pub struct ActionEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionEnvelope {
    pub fn into_result(self) -> Result<()> {
        if !self.success {
            return Err(backend_error(self.error, "Action failed"));
        }
        Ok(())
    }
}

/// `GET /api/containers/{id}/logs`
#[derive(Debug, Clone, Deserialize)]
pub struct LogsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub logs: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LogsEnvelope {
    pub fn into_result(self) -> Result<Option<String>> {
        if !self.success {
            return Err(backend_error(self.error, "Failed to fetch logs"));
        }
        Ok(self.logs)
    }
}

fn backend_error(error: Option<String>, fallback: &str) -> ApiError {
    match error {
        Some(msg) if !msg.is_empty() => ApiError::Backend(msg),
        _ => ApiError::Backend(fallback.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_status_is_case_insensitive() {
        assert_eq!(ContainerStatus::from("RUNNING"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from("Exited"), ContainerStatus::Exited);
        assert_eq!(ContainerStatus::from(" paused "), ContainerStatus::Paused);
        assert_eq!(ContainerStatus::from("zombie"), ContainerStatus::Unknown);
        assert_eq!(ContainerStatus::from(""), ContainerStatus::Unknown);
    }

    #[test]
    fn test_record_tolerates_missing_fields() {
        let record: ContainerRecord = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.status(), ContainerStatus::Unknown);
        assert!(record.created_at().is_none());
    }

    #[test]
    fn test_created_accepts_iso_and_epoch() {
        let iso: ContainerRecord = serde_json::from_str(
            r#"{"id":"a","created":"2024-03-05T10:20:30.123456789Z"}"#,
        )
        .unwrap();
        assert_eq!(iso.created_at().unwrap().month(), 3);

        let naive: ContainerRecord =
            serde_json::from_str(r#"{"id":"b","created":"2024-03-05T10:20:30.5"}"#).unwrap();
        assert_eq!(naive.created_at().unwrap().day(), 5);

        let secs: ContainerRecord =
            serde_json::from_str(r#"{"id":"c","created":1700000000}"#).unwrap();
        let millis: ContainerRecord =
            serde_json::from_str(r#"{"id":"d","created":1700000000000}"#).unwrap();
        assert_eq!(secs.created_at(), millis.created_at());

        let garbage: ContainerRecord =
            serde_json::from_str(r#"{"id":"e","created":"last tuesday"}"#).unwrap();
        assert!(garbage.created_at().is_none());
    }

    #[test]
    fn test_malformed_record_keeps_the_rest_of_the_inventory() {
        let envelope: InventoryEnvelope = serde_json::from_str(
            r#"{"success":true,"containers":[
                {"id":"1","name":"web","status":"running","image":"nginx","created":1700000000},
                {"id":"2","name":null,"status":null,"image":["x"],"created":{"seconds":1}},
                {"id":3,"name":"flag","status":"exited","created":true}
            ]}"#,
        )
        .unwrap();
        let records = envelope.into_result().unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "web");
        assert!(records[0].created_at().is_some());

        assert_eq!(records[1].name, "");
        assert_eq!(records[1].image, "");
        assert_eq!(records[1].status(), ContainerStatus::Unknown);
        assert!(records[1].created.is_none());

        assert_eq!(records[2].id, "3");
        assert_eq!(records[2].status(), ContainerStatus::Exited);
        assert!(records[2].created_at().is_none());
    }

    #[test]
    fn test_inventory_envelope() {
        let ok: InventoryEnvelope = serde_json::from_str(
            r#"{"success":true,"containers":[{"id":"1","name":"web","status":"running","image":"nginx"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.into_result().unwrap().len(), 1);

        let missing: InventoryEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(missing.into_result().unwrap().is_empty());

        let failed: InventoryEnvelope =
            serde_json::from_str(r#"{"success":false,"error":"docker down"}"#).unwrap();
        assert_eq!(
            failed.into_result().unwrap_err(),
            ApiError::Backend("docker down".to_string())
        );
    }

    #[test]
    fn test_envelope_fallback_messages() {
        let action: ActionEnvelope = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(action.into_result().unwrap_err().to_string(), "Action failed");

        let logs: LogsEnvelope =
            serde_json::from_str(r#"{"success":false,"error":""}"#).unwrap();
        assert_eq!(logs.into_result().unwrap_err().to_string(), "Failed to fetch logs");
    }

    #[test]
    fn test_action_body_serializes_lowercase() {
        let body = serde_json::to_string(&ActionBody {
            action: LifecycleAction::Delete,
        })
        .unwrap();
        assert_eq!(body, r#"{"action":"delete"}"#);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(LifecycleAction::Stop.past_tense(), "stopped");
        assert_eq!(LifecycleAction::Restart.past_tense(), "restarted");
        assert_eq!(LifecycleAction::Delete.past_tense(), "deleted");
        assert_eq!("RESTART".parse::<LifecycleAction>(), Ok(LifecycleAction::Restart));
        assert!("start".parse::<LifecycleAction>().is_err());
    }
}
