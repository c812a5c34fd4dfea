use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- sheet recovery log: data that could not be saved normally.
     Each entry holds the full content of the failed write.
     Safe to delete once nothing here is needed. -->

---
";

/// Return the path to the recovery log file.
pub fn recovery_log_path(sheet_dir: &Path) -> PathBuf {
    sheet_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A failed write, captured so its content is not lost.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    /// File name the write was aimed at
    pub target: String,
    pub error: String,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(target: &str, error: &io::Error, body: String) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            target: target.to_string(),
            error: error.to_string(),
            body,
        }
    }

    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} write failed: {}\n\nError: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.target,
            self.error,
        );
        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push_str("\n---\n");
        out
    }
}

/// Append an entry to the recovery log. Best effort: failures are only logged.
pub fn log_recovery(sheet_dir: &Path, entry: RecoveryEntry) {
    let path = recovery_log_path(sheet_dir);
    let is_new = !path.exists();
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| {
            if is_new {
                file.write_all(FILE_HEADER.as_bytes())?;
            }
            file.write_all(entry.to_markdown().as_bytes())
        });
    match result {
        Ok(()) => tracing::warn!(target_file = %entry.target, log = %path.display(), "saved failed write to recovery log"),
        Err(e) => tracing::error!(error = %e, target_file = %entry.target, "could not write recovery log"),
    }
}
