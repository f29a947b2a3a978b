//! File selection and validation
//!
//! Uploads are gated by a [`FilePolicy`] before any network traffic: a file
//! that fails the extension or size check is never sent, not even partially.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

use crate::error::Error;

/// Extensions the service accepts for spreadsheet uploads
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

/// Upload size limit enforced by the service, in megabytes
pub const DEFAULT_MAX_SIZE_MB: f64 = 16.0;

/// A file validation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FileError {
    /// The file name has no extension or one outside the accepted set
    #[error("Invalid file type. Accepted types: {accepted}")]
    InvalidType { accepted: String },

    /// The file exceeds the size limit
    #[error("File too large. Maximum size: {limit_mb}MB")]
    TooLarge { limit_mb: f64 },
}

/// Which files may be uploaded
///
/// Checks are pure and synchronous. Extensions match case-insensitively on
/// the file name suffix; the size limit is strict (a file exactly at the
/// limit passes).
#[derive(Debug, Clone)]
pub struct FilePolicy {
    accepted: Vec<String>,
    max_size_mb: f64,
}

impl FilePolicy {
    /// Create a policy from accepted extensions and a size limit
    ///
    /// Extensions are normalized to lowercase with a leading dot.
    pub fn new(accepted: &[&str], max_size_mb: f64) -> Self {
        let accepted = accepted
            .iter()
            .map(|ext| {
                let ext = ext.to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        Self {
            accepted,
            max_size_mb,
        }
    }

    /// The policy the service applies to spreadsheet uploads
    pub fn spreadsheet() -> Self {
        Self::new(&SPREADSHEET_EXTENSIONS, DEFAULT_MAX_SIZE_MB)
    }

    /// The normalized accepted extensions
    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    /// The size limit in megabytes
    pub fn max_size_mb(&self) -> f64 {
        self.max_size_mb
    }

    /// Check a file name and size against the policy
    pub fn check(&self, name: &str, size_bytes: u64) -> Result<(), FileError> {
        let extension = name.rfind('.').map(|idx| name[idx..].to_lowercase());
        let accepted = match extension {
            Some(ext) => self.accepted.iter().any(|candidate| *candidate == ext),
            None => false,
        };
        if !accepted {
            return Err(FileError::InvalidType {
                accepted: self.accepted.join(", "),
            });
        }

        let size_mb = size_bytes as f64 / (1024.0 * 1024.0);
        if size_mb > self.max_size_mb {
            return Err(FileError::TooLarge {
                limit_mb: self.max_size_mb,
            });
        }

        Ok(())
    }

    /// Check a selected file against the policy
    pub fn check_file(&self, file: &SelectedFile) -> Result<(), FileError> {
        self.check(file.name(), file.size())
    }
}

impl Default for FilePolicy {
    fn default() -> Self {
        Self::spreadsheet()
    }
}

/// A file picked for upload: its name and its contents
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    data: Bytes,
}

impl SelectedFile {
    /// Create a selected file from in-memory contents
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, taking its name from the path
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self {
            name,
            data: data.into(),
        })
    }

    /// The file name sent to the service
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file contents
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Size in megabytes
    pub fn size_mb(&self) -> f64 {
        self.data.len() as f64 / (1024.0 * 1024.0)
    }
}
