//! Errors at the document boundary (load/save, name parsing).
//!
//! The interactive core never fails: coordinates clamp, dangling references
//! are skipped. Only data crossing in from the host can be rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode document snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode document snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("unknown icon key `{0}`")]
    UnknownIcon(String),

    #[error("unknown device class `{0}`")]
    UnknownDevice(String),

    #[error("unknown trigger `{0}`")]
    UnknownTrigger(String),
}
