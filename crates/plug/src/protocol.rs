//! Wire protocol types
//!
//! One JSON object per message. Outbound envelopes are discriminated by
//! `type`; the single inbound shape is an event fired on the host.

use crate::error::{PlugError, Result};
use dom::{NodeRecord, QueryKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound message sent to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    /// User-visible text output
    #[serde(rename = "stdout")]
    Stdout { content: String },

    #[serde(rename = "registerEvent")]
    RegisterEvent {
        query: QueryKind,
        #[serde(rename = "eventType")]
        event_type: String,
        listener: String,
    },

    #[serde(rename = "removeEvent")]
    RemoveEvent {
        query: QueryKind,
        #[serde(rename = "eventType")]
        event_type: String,
    },

    /// Replace the matched element(s) with `target`
    #[serde(rename = "updateDOM")]
    UpdateDom { query: QueryKind, target: NodeRecord },

    #[serde(rename = "error")]
    Error { context: ErrorContext },
}

impl Envelope {
    pub fn stdout(content: impl Into<String>) -> Self {
        Envelope::Stdout {
            content: content.into(),
        }
    }

    pub fn error(err: &PlugError) -> Self {
        Envelope::Error {
            context: ErrorContext {
                kind: err.kind().to_string(),
                msg: err.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Payload of an `error` envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    #[serde(rename = "type")]
    pub kind: String,
    pub msg: String,
}

/// Inbound event message: `{type, target, listener}`
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub event_type: String,
    pub target: NodeRecord,
    pub listener: String,
}

fn non_empty_str<'a>(msg: &'a Value, field: &str) -> Option<&'a str> {
    msg.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

impl InboundEvent {
    /// Decode and shape-check a raw inbound message
    pub fn parse(raw: &str) -> Result<Self> {
        let msg: Value = serde_json::from_str(raw).map_err(PlugError::Decode)?;

        let event_type = non_empty_str(&msg, "type");
        let listener = non_empty_str(&msg, "listener");
        let target = msg
            .get("target")
            .filter(|t| t.as_object().is_some_and(|o| !o.is_empty()));

        match (event_type, target, listener) {
            (Some(event_type), Some(target), Some(listener)) => Ok(Self {
                event_type: event_type.to_string(),
                target: serde_json::from_value(target.clone()).map_err(PlugError::Decode)?,
                listener: listener.to_string(),
            }),
            _ => Err(PlugError::IncompleteMessage(raw.to_string())),
        }
    }
}
