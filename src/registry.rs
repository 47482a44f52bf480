// src/registry.rs
// The fixed, ordered list of files shared by this server instance

use std::borrow::Cow;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    name: Vec<u8>,
}

impl FileEntry {
    fn new(raw: &OsStr) -> Self {
        // Only a single leading "./" is dropped, everything else is used verbatim.
        let bytes = raw.as_bytes();
        let name = bytes.strip_prefix(b"./").unwrap_or(bytes).to_vec();
        FileEntry {
            path: PathBuf::from(OsStr::from_bytes(&name)),
            name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Route segment of this file, exactly as given on the command line.
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// Index label of this file. Invalid UTF-8 is replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// Immutable registry built once from the command line.
///
/// Never empty. The prefix, when present, is non-empty, carries no leading
/// or trailing slash and needs no percent-encoding.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    prefix: Option<String>,
    entries: Vec<FileEntry>,
}

impl FileRegistry {
    pub fn build<I, S>(raw_args: I, prefix: Option<&str>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let entries: Vec<FileEntry> = raw_args
            .into_iter()
            .map(|raw| FileEntry::new(raw.as_ref()))
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::NoFiles);
        }

        let prefix = prefix.map(normalize_prefix).transpose()?;

        Ok(FileRegistry { prefix, entries })
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `/` or `/<prefix>/`.
    pub fn index_route(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("/{}/", prefix),
            None => "/".to_string(),
        }
    }

    /// Link under which `entry` is served.
    ///
    /// Every segment is percent-encoded. A `/` stays literal only between two
    /// non-empty segments, so the link never contains `//` and cannot be
    /// taken for a protocol-relative URL.
    pub fn href(&self, entry: &FileEntry) -> String {
        let segments: Vec<&[u8]> = entry.name.split(|&b| b == b'/').collect();
        let mut encoded = self.index_route();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                let literal = !segments[i - 1].is_empty() && !segment.is_empty();
                encoded.push_str(if literal { "/" } else { "%2F" });
            }
            encoded.push_str(&urlencoding::encode_binary(segment));
        }
        encoded
    }

    /// First entry whose name equals `name` byte for byte.
    pub fn find(&self, name: &[u8]) -> Option<&FileEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

fn normalize_prefix(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim_matches('/');
    let url_safe = trimmed
        .split('/')
        .all(|segment| !segment.is_empty() && urlencoding::encode(segment) == segment);

    if trimmed.is_empty() || !url_safe {
        return Err(ConfigError::InvalidPrefix(raw.to_string()));
    }

    Ok(trimmed.to_string())
}
