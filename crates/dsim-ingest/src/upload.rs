//! Upload gate and the uploaded file handle.

use std::path::{Path, PathBuf};

use crate::csv::{CsvHeaders, check_file_size_with_limit, detect_utf16_bom};
use crate::error::{IngestError, Result};

/// Maximum accepted upload size (100 MB).
pub const MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Accepts a file name only if it ends with `.csv`, in any letter case.
pub fn validate_upload_name(name: &str) -> Result<()> {
    if name.to_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(IngestError::NotCsv {
            name: name.to_string(),
        })
    }
}

/// A CSV file accepted for submission.
///
/// Holds the raw bytes so a submission always sends exactly what was
/// validated, even if the file changes on disk afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    path: Option<PathBuf>,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Validates and reads a file from disk.
    ///
    /// Checks run in order: name gate, existence, size limit, encoding. The
    /// name gate is the only rule [`UploadedFile::from_bytes`] applies. A
    /// `.csv` file read from disk is also refused when it exceeds
    /// [`MAX_UPLOAD_SIZE`] or starts with a UTF-16 byte-order mark.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_limit(path, MAX_UPLOAD_SIZE)
    }

    /// Like [`UploadedFile::open`] with a custom size limit.
    pub fn open_with_limit(path: &Path, max_size: u64) -> Result<Self> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        validate_upload_name(&name)?;

        check_file_size_with_limit(path, max_size)?;
        let bytes = std::fs::read(path).map_err(|e| IngestError::io(path, e))?;
        if let Some(encoding) = detect_utf16_bom(&bytes) {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding,
            });
        }

        tracing::info!(file = %name, bytes = bytes.len(), "Accepted upload");
        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            bytes,
        })
    }

    /// Wraps in-memory contents under a display name, applying the name gate.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        validate_upload_name(&name)?;
        Ok(Self {
            name,
            path: None,
            bytes,
        })
    }

    /// Display name sent to the service as the multipart file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source path, when the file came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Header row of the contents, if any.
    pub fn headers(&self) -> Option<CsvHeaders> {
        CsvHeaders::from_bytes(&self.bytes)
    }
}
