use serde::{Deserialize, Serialize};

/// Outcome flag carried by every API response.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Ok,
    Failed,
}

/// The `{status, result | comment}` wrapper around every API payload.
#[derive(Serialize, Deserialize, Debug)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub result: Option<T>,
    #[serde(default)]
    pub comment: Option<String>,
}
