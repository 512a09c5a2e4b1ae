//! Represents an object (file) stored in the external object store.

/// Metadata for a single stored object, as reported by a stat call.
///
/// The content bytes stay in the object store; the gateway only ever sees them
/// while streaming an upload in or a download out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Size in bytes.
    pub size_bytes: i64,
}

/// An upload as received from a client, before it is written to the store.
#[derive(Clone, Debug)]
pub struct NewObject {
    /// Raw payload.
    pub content: bytes::Bytes,

    /// Content type reported by the client, if any.
    pub content_type: Option<String>,

    /// Filename reported by the client; only its extension is kept.
    pub original_name: Option<String>,
}

impl NewObject {
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
