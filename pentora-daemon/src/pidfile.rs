//! PID file management.
//!
//! Writes the daemon process id on startup and removes the file on
//! graceful shutdown. A stale PID file from a crashed process is
//! overwritten.

use std::path::Path;

use anyhow::{Context, Result};

/// Write the current process id to `path`.
///
/// Parent directories must already exist.
pub fn write_pid_file(path: &Path) -> Result<()> {
    let pid = std::process::id();
    std::fs::write(path, format!("{pid}\n"))
        .with_context(|| format!("failed to write PID file {}", path.display()))?;
    tracing::debug!(pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove the PID file. A missing file is not an error.
pub fn remove_pid_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "PID file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_remove_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pentora.pid");

        write_pid_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());

        remove_pid_file(&path);
        assert!(!path.exists());
    }

    #[test]
    fn remove_missing_pid_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        remove_pid_file(&dir.path().join("never-written.pid"));
    }

    #[test]
    fn stale_pid_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pentora.pid");
        std::fs::write(&path, "99999\n").unwrap();

        write_pid_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }
}
