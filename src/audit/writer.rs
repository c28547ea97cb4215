//! Append-only writer for the moderation audit log

use crate::audit::AuditRecord;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Serializes audit lines into a single log file
///
/// The file handle lives behind a mutex held for the whole append, so bytes
/// of two records never interleave regardless of how many handlers write.
pub struct AuditWriter {
    file: Mutex<File>,
    path: PathBuf,
}

impl AuditWriter {
    /// Open (or create) the audit log in append mode
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        tracing::info!(path = %path.display(), "Audit log opened");

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Append one record. I/O failures are returned to the caller.
    pub async fn write(&self, record: &AuditRecord) -> Result<()> {
        let line = record.to_line();

        {
            let mut file = self.file.lock().await;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
        }

        // Diagnostic mirror, cannot fail the append above
        tracing::info!(target: "audit", kind = %record.kind, "{}", line.trim_end());

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
