//! Message shapes exchanged between page contexts, the control surface and
//! the background coordinator.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::media::MediaSnapshot;

/// Background to page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageRequest {
    CheckMedia,
}

/// Page to background.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageMessage {
    MediaStateChanged(MediaStateChanged),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaStateChanged {
    pub is_playing: bool,
    pub has_ended: bool,
    pub details: MediaSnapshot,
}

impl MediaStateChanged {
    pub fn from_snapshot(details: MediaSnapshot) -> Self {
        Self {
            is_playing: details.has_playing(),
            has_ended: details.has_ended(),
            details,
        }
    }
}

/// Requests issued by the popup UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlRequest {
    Start,
    Stop,
    DownloadToday,
    ToggleAutoSwitch { enabled: bool },
    GetAutoSwitch,
}

impl ControlRequest {
    /// Decode a raw control message. `START` and `STOP` arrive as bare
    /// strings, everything else as `{type: ...}` objects.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let value = match value {
            Value::String(command) => json!({ "type": command }),
            other => other,
        };
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ControlResponse {
    Downloaded { success: bool, count: usize },
    Failed { success: bool, error: String },
    Ack { success: bool },
    AutoSwitch { enabled: bool },
}

impl ControlResponse {
    pub fn ack() -> Self {
        ControlResponse::Ack { success: true }
    }

    pub fn downloaded(count: usize) -> Self {
        ControlResponse::Downloaded {
            success: true,
            count,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ControlResponse::Failed {
            success: false,
            error: error.into(),
        }
    }

    pub fn auto_switch(enabled: bool) -> Self {
        ControlResponse::AutoSwitch { enabled }
    }

    pub fn is_success(&self) -> bool {
        match self {
            ControlResponse::Downloaded { success, .. }
            | ControlResponse::Failed { success, .. }
            | ControlResponse::Ack { success } => *success,
            ControlResponse::AutoSwitch { .. } => true,
        }
    }
}
