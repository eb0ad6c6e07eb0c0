use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Event kind tag for patch events.
pub const PATCH_KIND: u32 = 19691228;

/// Default deadline for a single relay publish attempt (connect + send + ack).
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// A (key, value) tag pair attached to a patch event.
///
/// Tag order is preserved end to end: consumers rely on author before
/// subject before the optional hashtag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Current Unix time in seconds (UTC).
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before epoch")
        .as_secs()
}
