// src/content_type.rs
// Extension based Content-Type lookup for served files

use std::borrow::Cow;
use std::collections::HashMap;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    // Text
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("xml", "application/xml"),
    // Scripts and data
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("wasm", "application/wasm"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    // Video
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    // Documents and archives
    ("pdf", "application/pdf"),
    ("epub", "application/epub+zip"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("bz2", "application/x-bzip2"),
    ("xz", "application/x-xz"),
    ("7z", "application/x-7z-compressed"),
];

/// Immutable extension to MIME type table.
///
/// Built once at startup and handed to the dispatcher; lookups never mutate it.
#[derive(Debug, Clone)]
pub struct ContentTypeTable {
    types: HashMap<&'static str, &'static str>,
}

impl ContentTypeTable {
    pub fn new() -> Self {
        Self::from_entries(DEFAULT_ENTRIES)
    }

    /// Build a table from `(extension, mime)` pairs. Extensions must be lowercase
    /// and given without the leading dot.
    pub fn from_entries(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            types: entries.iter().copied().collect(),
        }
    }

    /// Resolve the Content-Type for a file name, falling back to
    /// `application/octet-stream` for missing or unknown extensions.
    pub fn resolve(&self, file_name: &str) -> &'static str {
        extension(file_name)
            .and_then(|ext| {
                let ext = if ext.bytes().any(|b| b.is_ascii_uppercase()) {
                    Cow::Owned(ext.to_ascii_lowercase())
                } else {
                    Cow::Borrowed(ext)
                };
                self.types.get(ext.as_ref()).copied()
            })
            .unwrap_or(FALLBACK_CONTENT_TYPE)
    }
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Substring after the last dot of the final path segment, if any.
fn extension(file_name: &str) -> Option<&str> {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}
