//! Binary response bodies.

use bytes::Bytes;

/// A downloaded file.
#[derive(Debug, Clone)]
pub struct Download {
    /// File name from `Content-Disposition`, when the server sent one.
    pub filename: Option<String>,
    /// MIME type from `Content-Type`.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl Download {
    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Extract the file name from a `Content-Disposition` header value.
pub(crate) fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let value = part.strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}
