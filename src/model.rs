//! Wire shapes of oracle's JSON results, with their logical-path fields, and
//! the status envelope sent back on errors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImplementsResult {
    #[serde(default)]
    pub implements: Implements,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Implements {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fromptr: Vec<ImplementsType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<ImplementsType>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImplementsType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default, rename = "logicalPos")]
    pub logical_pos: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReferrersResult {
    #[serde(default)]
    pub referrers: Referrers,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Referrers {
    #[serde(default, rename = "logicalRefs")]
    pub logical_refs: Vec<String>,
    #[serde(default)]
    pub refs: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CallersResult {
    #[serde(default)]
    pub callers: Vec<Caller>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Caller {
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default, rename = "logicalPos")]
    pub logical_pos: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeersResult {
    #[serde(default)]
    pub peers: Peers,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Peers {
    #[serde(default)]
    pub logical_allocs: Vec<String>,
    #[serde(default)]
    pub allocs: Vec<String>,
    #[serde(default)]
    pub logical_receives: Vec<String>,
    #[serde(default)]
    pub receives: Vec<String>,
    #[serde(default)]
    pub logical_sends: Vec<String>,
    #[serde(default)]
    pub sends: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Cancel,
    Ok,
}

/// Uniform envelope for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub severity: Severity,
    pub http_code: u16,
    pub message: String,
    pub detailed_message: String,
}

impl Status {
    pub fn error(http_code: u16, message: &str, detail: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            http_code,
            message: message.to_string(),
            detailed_message: detail.unwrap_or_default(),
        }
    }
}
