use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::entry::AuditEntry;

/// Audit trail I/O failures. Every variant names the trail file.
#[derive(Debug, thiserror::Error)]
pub enum AuditWriteError {
    #[error("cannot create audit directory for {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot open audit trail {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("audit entry is not serialisable: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot append to audit trail {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Line-at-a-time appender for one audit trail file.
pub struct AuditWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl AuditWriter {
    /// Open `path` for appending, creating it and any missing parent
    /// directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditWriteError> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| AuditWriteError::CreateDir {
                path: path.clone(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditWriteError::OpenFile {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry` as one JSON line. The line is flushed before returning.
    pub fn append(&mut self, entry: &AuditEntry) -> Result<(), AuditWriteError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.out
            .write_all(&line)
            .and_then(|()| self.out.flush())
            .map_err(|source| AuditWriteError::Append {
                path: self.path.clone(),
                source,
            })
    }
}
