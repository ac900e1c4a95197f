//! JSON envelopes returned to legacy clients.

use serde::Serialize;

/// `{ code, message, data: { url, sourceSwitch? } }`, the shape legacy
/// clients expect in place of an upstream redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamUrlEnvelope {
    pub code: u16,
    pub message: &'static str,
    pub data: StreamUrlData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamUrlData {
    /// Redirect target; `null` if upstream sent no `location`.
    pub url: Option<String>,
    #[serde(rename = "sourceSwitch", skip_serializing_if = "Option::is_none")]
    pub source_switch: Option<String>,
}

impl StreamUrlEnvelope {
    pub fn success(url: Option<String>, source_switch: Option<String>) -> Self {
        Self {
            code: 200,
            message: "success",
            data: StreamUrlData { url, source_switch },
        }
    }
}
