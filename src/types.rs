//! Common type definitions for sealdir.
//!
//! - [`ProcessorMode`]: encrypt or decrypt
//! - [`FileTask`]: one file scheduled for rewriting
//! - [`FileReport`]: what a successful rewrite did
//! - [`BatchResult`]: the aggregated outcome of a run

use std::fmt::{Display, Formatter, Result};
use std::path::PathBuf;

/// Which direction a batch rewrites files in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorMode {
    Encrypt,
    Decrypt,
}

impl ProcessorMode {
    /// Array containing all processor modes for iteration.
    pub const ALL: &'static [Self] = &[Self::Encrypt, Self::Decrypt];

    /// Human-readable label for prompts and tables.
    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypt",
            Self::Decrypt => "Decrypt",
        }
    }

    /// Lowercase name used in log headers and log file names.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }

    /// Progress bar message.
    #[inline]
    pub const fn progress_label(self) -> &'static str {
        match self {
            Self::Encrypt => "Encrypting...",
            Self::Decrypt => "Decrypting...",
        }
    }
}

impl Display for ProcessorMode {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.label())
    }
}

/// A single file to rewrite in place.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub path: PathBuf,
    pub mode: ProcessorMode,
}

impl FileTask {
    #[inline]
    pub fn new(path: impl Into<PathBuf>, mode: ProcessorMode) -> Self {
        Self { path: path.into(), mode }
    }
}

/// Non-fatal problem attached to a successful rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Content was rewritten but timestamps or permission bits could not be restored.
    AttributeRestore(String),
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::AttributeRestore(reason) => write!(f, "attributes not restored: {reason}"),
        }
    }
}

/// Outcome of one successful rewrite.
#[derive(Debug, Default)]
pub struct FileReport {
    /// Size of the file before the rewrite.
    pub bytes_in: u64,

    /// Size of the file after the rewrite.
    pub bytes_out: u64,

    pub warnings: Vec<Warning>,
}

/// A file that could not be processed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
}

/// Aggregated result of a batch.
///
/// Workers only append; ordering reflects completion order, not input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<Failure>,
    pub warnings: Vec<(PathBuf, Warning)>,

    /// Sum of input sizes of the successfully rewritten files.
    pub bytes_processed: u64,
}

impl BatchResult {
    pub fn record_success(&mut self, path: PathBuf, report: FileReport) {
        self.bytes_processed += report.bytes_in;
        self.warnings.extend(report.warnings.into_iter().map(|w| (path.clone(), w)));
        self.succeeded.push(path);
    }

    pub fn record_failure(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.failed.push(Failure { path, reason: reason.into() });
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    #[inline]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(ProcessorMode::Encrypt.to_string(), "Encrypt");
        assert_eq!(ProcessorMode::Decrypt.name(), "decrypt");
        assert_eq!(ProcessorMode::ALL.len(), 2);
    }

    #[test]
    fn test_batch_result_accounting() {
        let mut result = BatchResult::default();
        result.record_success(PathBuf::from("/a"), FileReport { bytes_in: 10, bytes_out: 70, warnings: vec![Warning::AttributeRestore("chmod".into())] });
        result.record_success(PathBuf::from("/b"), FileReport { bytes_in: 5, bytes_out: 65, warnings: Vec::new() });
        result.record_failure(PathBuf::from("/c"), "authentication failed");

        assert_eq!(result.total(), 3);
        assert_eq!(result.bytes_processed, 15);
        assert!(result.has_failures());
        assert_eq!(result.warnings, vec![(PathBuf::from("/a"), Warning::AttributeRestore("chmod".into()))]);
        assert_eq!(result.failed[0].reason, "authentication failed");
    }
}
