//! Core types: bot credential, persisted bot state, and the externally visible status record.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Bot token. Identifies the bot to Telegram and namespaces its keys in the store.
///
/// `Debug` is redacted so the token does not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BotCredential(String);

impl BotCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for BotCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotCredential(***)")
    }
}

/// Arbitrary JSON state owned by one bot instance. Serialized whole as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotState(Map<String, Value>);

impl BotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object. Any other JSON value (array, number, ...) is an error.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for BotState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Deref for BotState {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for BotState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Lifecycle status reported to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Starting,
    Running,
    Stopped,
    Error,
}

impl BotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotStatus::Starting => "starting",
            BotStatus::Running => "running",
            BotStatus::Stopped => "stopped",
            BotStatus::Error => "error",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown bot status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BotStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starting" => Ok(BotStatus::Starting),
            "running" => Ok(BotStatus::Running),
            "stopped" => Ok(BotStatus::Stopped),
            "error" => Ok(BotStatus::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Status snapshot for one bot. Each write replaces the previous record entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: BotStatus,
    pub error: Option<String>,
    pub webhook_url: Option<String>,
}

impl StatusRecord {
    pub const STATUS_FIELD: &'static str = "status";
    pub const ERROR_FIELD: &'static str = "error";
    pub const WEBHOOK_URL_FIELD: &'static str = "webhook_url";

    pub fn new(status: BotStatus) -> Self {
        Self {
            status,
            error: None,
            webhook_url: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_webhook_url(mut self, webhook_url: Option<String>) -> Self {
        self.webhook_url = webhook_url;
        self
    }

    /// Hash fields as written to the store; `None` becomes an empty string.
    pub fn to_fields(&self) -> [(&'static str, String); 3] {
        [
            (Self::STATUS_FIELD, self.status.as_str().to_string()),
            (Self::ERROR_FIELD, self.error.clone().unwrap_or_default()),
            (
                Self::WEBHOOK_URL_FIELD,
                self.webhook_url.clone().unwrap_or_default(),
            ),
        ]
    }

    /// Inverse of [`to_fields`](Self::to_fields): empty or missing optional fields map to `None`.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, UnknownStatus> {
        let status = fields
            .get(Self::STATUS_FIELD)
            .map(String::as_str)
            .unwrap_or_default()
            .parse()?;
        let optional = |name: &str| fields.get(name).filter(|v| !v.is_empty()).cloned();
        Ok(Self {
            status,
            error: optional(Self::ERROR_FIELD),
            webhook_url: optional(Self::WEBHOOK_URL_FIELD),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = BotCredential::new("123:secret");
        assert_eq!(format!("{:?}", credential), "BotCredential(***)");
        assert_eq!(credential.as_str(), "123:secret");
    }

    #[test]
    fn test_blank_credential_is_empty() {
        assert!(BotCredential::new("  ").is_empty());
        assert!(!BotCredential::new("t").is_empty());
    }

    #[test]
    fn test_bot_state_rejects_non_object_json() {
        assert!(BotState::from_json("[1, 2, 3]").is_err());
        assert!(BotState::from_json("42").is_err());
        assert!(BotState::from_json("{not json").is_err());
    }

    #[test]
    fn test_bot_state_json_keeps_nested_values() {
        let mut state = BotState::new();
        state.insert("count".to_string(), json!(3));
        state.insert("nested".to_string(), json!({"list": [1, "two", true, null]}));

        let parsed = BotState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("running".parse::<BotStatus>().unwrap(), BotStatus::Running);
        assert_eq!(
            "paused".parse::<BotStatus>(),
            Err(UnknownStatus("paused".to_string()))
        );
    }

    #[test]
    fn test_status_record_fields_use_empty_strings_for_none() {
        let record = StatusRecord::new(BotStatus::Running);
        let fields = record.to_fields();
        assert_eq!(fields[0], ("status", "running".to_string()));
        assert_eq!(fields[1], ("error", String::new()));
        assert_eq!(fields[2], ("webhook_url", String::new()));
    }

    #[test]
    fn test_status_record_from_fields() {
        let fields: HashMap<String, String> = [
            ("status", "error"),
            ("error", "boom"),
            ("webhook_url", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let record = StatusRecord::from_fields(&fields).unwrap();
        assert_eq!(record, StatusRecord::new(BotStatus::Error).with_error("boom"));
    }

    #[test]
    fn test_status_record_from_fields_without_status() {
        let fields = HashMap::new();
        assert!(StatusRecord::from_fields(&fields).is_err());
    }
}
