//! Failure log written after a batch with at least one failed file.
//!
//! ```text
//! sealdir decrypt log - 2026-03-01T12:00:00+01:00
//! ------------------------------------------------------------
//! /data/a.txt : authentication failed: wrong password or corrupted data
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::config::APP_NAME;
use crate::types::{BatchResult, Failure, ProcessorMode};

const SEPARATOR_WIDTH: usize = 60;

/// `sealdir_errors_<mode>_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_name(mode: ProcessorMode, at: DateTime<Local>) -> String {
    format!("{APP_NAME}_errors_{}_{}.log", mode.name(), at.format("%Y%m%d_%H%M%S"))
}

pub fn format_log(mode: ProcessorMode, at: DateTime<Local>, failures: &[Failure]) -> String {
    let mut out = format!("{APP_NAME} {} log - {}\n{}\n", mode.name(), at.to_rfc3339(), "-".repeat(SEPARATOR_WIDTH));
    for failure in failures {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{} : {}", failure.path.display(), failure.reason);
    }
    out
}

/// Writes the failure log into `dir`. Returns `None` when nothing failed.
pub fn write_failure_log(dir: &Path, mode: ProcessorMode, result: &BatchResult) -> Result<Option<PathBuf>> {
    if !result.has_failures() {
        return Ok(None);
    }

    let now = Local::now();
    let path = dir.join(log_file_name(mode, now));
    fs::write(&path, format_log(mode, now, &result.failed)).with_context(|| format!("failed to write log: {}", path.display()))?;

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).single().unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(log_file_name(ProcessorMode::Decrypt, fixed_time()), "sealdir_errors_decrypt_20260301_090507.log");
    }

    #[test]
    fn test_format() {
        let failures = vec![
            Failure { path: PathBuf::from("/data/a.txt"), reason: "container trailer not found".into() },
            Failure { path: PathBuf::from("/data/b.txt"), reason: "read failed: denied".into() },
        ];
        let log = format_log(ProcessorMode::Encrypt, fixed_time(), &failures);
        let lines: Vec<&str> = log.lines().collect();

        assert!(lines[0].starts_with("sealdir encrypt log - 2026-03-01T09:05:07"));
        assert_eq!(lines[1], "-".repeat(60));
        assert_eq!(lines[2], "/data/a.txt : container trailer not found");
        assert_eq!(lines[3], "/data/b.txt : read failed: denied");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_written_only_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = BatchResult::default();
        assert!(write_failure_log(dir.path(), ProcessorMode::Decrypt, &result).unwrap().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        result.record_failure(PathBuf::from("/x"), "boom");
        let path = write_failure_log(dir.path(), ProcessorMode::Decrypt, &result).unwrap().unwrap();
        assert!(fs::read_to_string(path).unwrap().ends_with("/x : boom\n"));
    }
}
