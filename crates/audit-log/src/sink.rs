use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::entry::AuditEntry;
use crate::writer::{AuditWriteError, AuditWriter};

/// A cheap, cloneable handle for appending [`AuditEntry`] values to the
/// audit log.
///
/// Writes happen on the caller's thread and are serialised through a mutex.
/// Each entry is flushed before `log` returns, so the trail survives an
/// abrupt process exit right after a block.
#[derive(Clone)]
pub struct AuditSink {
    writer: Arc<Mutex<AuditWriter>>,
    path: Arc<PathBuf>,
}

impl AuditSink {
    /// Open (or create) the audit log at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditWriteError> {
        let path = path.as_ref();
        let writer = AuditWriter::new(path)?;
        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            path: Arc::new(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry.
    ///
    /// I/O errors are logged via `tracing::error` and the entry is skipped;
    /// auditing never fails the operation being audited.
    pub fn log(&self, entry: AuditEntry) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writer.append(&entry) {
            tracing::error!(
                %err,
                event_type = ?entry.event_type,
                "failed to write audit entry"
            );
        }
    }
}

impl std::fmt::Debug for AuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditSink")
            .field("path", &self.path)
            .finish()
    }
}
