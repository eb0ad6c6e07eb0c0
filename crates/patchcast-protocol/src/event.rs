use serde::{Deserialize, Serialize};

use crate::types::{now_secs, Tag, PATCH_KIND};

/// An unsigned patch event — the unit the signer consumes.
///
/// Mutable only until signed: [`crate::crypto::sign`] takes the event by
/// value and returns an immutable [`crate::crypto::SignedPatchEvent`], so a
/// record can never be edited after its signature exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEvent {
    /// Creation timestamp (Unix seconds, UTC).
    pub created_at: u64,
    /// Numeric kind tag. Always [`PATCH_KIND`] for patch events.
    pub kind: u32,
    /// Ordered tag pairs: author, subject, then the optional hashtag.
    pub tags: Vec<Tag>,
    /// The patch text itself.
    pub content: String,
}

impl PatchEvent {
    /// Create a patch event from the patch text and its extracted metadata.
    ///
    /// `author` and `subject` are free-form; empty strings are accepted
    /// (upstream extraction is the caller's concern).
    pub fn new(content: impl Into<String>, author: &str, subject: &str) -> Self {
        Self {
            created_at: now_secs(),
            kind: PATCH_KIND,
            tags: vec![Tag::new("author", author), Tag::new("subject", subject)],
            content: content.into(),
        }
    }

    /// Append a `("t", value)` hashtag pair. Always ordered last.
    pub fn hashtag(mut self, value: &str) -> Self {
        self.tags.push(Tag::new("t", value));
        self
    }
}
