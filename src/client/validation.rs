//! Upload pre-flight validation.
//!
//! Rejects uploads that are cheap to detect as broken locally before any byte
//! crosses the wire. Size and type come from filesystem metadata and the file
//! extension; contents are never opened.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Limits applied to every upload of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_file_size: u64,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ["m4a", "mp3", "wav", "aac", "caf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl UploadLimits {
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }
}

/// What to upload and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub path: PathBuf,
    /// Destination route relative to the base URL.
    pub route: String,
    /// Multipart field name carrying the file.
    pub field_name: String,
    pub file_name: String,
    pub mime_type: String,
    /// Extra scalar form fields sent alongside the file.
    pub fields: Vec<(String, String)>,
}

impl UploadDescriptor {
    pub fn new(
        path: impl Into<PathBuf>,
        route: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_for_extension(extension_of(&path).as_deref()).to_string();
        Self {
            path,
            route: route.into(),
            field_name: field_name.into(),
            file_name,
            mime_type,
            fields: Vec::new(),
        }
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = mime.into();
        self
    }
}

/// An upload that passed validation. Only [`UploadValidator`] creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    descriptor: UploadDescriptor,
    size: u64,
}

impl ValidatedUpload {
    pub fn descriptor(&self) -> &UploadDescriptor {
        &self.descriptor
    }

    /// Size in bytes observed during validation.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Facts about a path as reported by a single metadata lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFacts {
    pub len: u64,
    pub is_file: bool,
}

/// Metadata source used by the validator.
pub trait FileStat: Send + Sync {
    fn stat(&self, path: &Path) -> io::Result<FileFacts>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileStat for LocalFs {
    // One blocking metadata call on the caller's task; the file itself is
    // only opened later by the transport, asynchronously.
    fn stat(&self, path: &Path) -> io::Result<FileFacts> {
        let meta = std::fs::metadata(path)?;
        Ok(FileFacts {
            len: meta.len(),
            is_file: meta.is_file(),
        })
    }
}

pub struct UploadValidator<S = LocalFs> {
    limits: UploadLimits,
    fs: S,
}

impl UploadValidator<LocalFs> {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits, fs: LocalFs }
    }
}

impl<S: FileStat> UploadValidator<S> {
    pub fn with_file_stat(limits: UploadLimits, fs: S) -> Self {
        Self { limits, fs }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Existence, then size, then extension; the first failure wins.
    pub fn validate(&self, descriptor: UploadDescriptor) -> Result<ValidatedUpload> {
        let facts = match self.fs.stat(&descriptor.path) {
            Ok(facts) if facts.is_file => facts,
            Ok(_) | Err(_) => {
                debug!(path = %descriptor.path.display(), "upload rejected: file not found");
                return Err(Error::FileNotFound {
                    path: descriptor.path,
                });
            }
        };

        if facts.len > self.limits.max_file_size {
            debug!(
                path = %descriptor.path.display(),
                size = facts.len,
                max_size = self.limits.max_file_size,
                "upload rejected: file too large"
            );
            return Err(Error::FileTooLarge {
                size: facts.len,
                max_size: self.limits.max_file_size,
            });
        }

        let actual = extension_of(&descriptor.path).unwrap_or_default();
        if !self.limits.allowed_extensions.iter().any(|e| *e == actual) {
            debug!(path = %descriptor.path.display(), extension = actual.as_str(), "upload rejected: invalid file type");
            return Err(Error::InvalidFileType {
                expected: self.limits.allowed_extensions.join(", "),
                actual: if actual.is_empty() {
                    "no extension".to_string()
                } else {
                    actual
                },
            });
        }

        Ok(ValidatedUpload {
            descriptor,
            size: facts.len,
        })
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// MIME type sent for a file extension.
pub fn mime_for_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("m4a") => "audio/m4a",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("aac") => "audio/aac",
        Some("caf") => "audio/x-caf",
        _ => "application/octet-stream",
    }
}
