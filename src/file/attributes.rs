use std::fs::{self, FileTimes, Metadata, Permissions};
use std::io;
use std::time::SystemTime;

use crate::types::Warning;

/// Timestamps and permission bits captured before a rewrite.
#[derive(Debug, Clone)]
pub struct Attributes {
    accessed: Option<SystemTime>,
    modified: Option<SystemTime>,
    permissions: Permissions,
}

impl Attributes {
    pub fn capture(metadata: &Metadata) -> Self {
        Self { accessed: metadata.accessed().ok(), modified: metadata.modified().ok(), permissions: metadata.permissions() }
    }

    /// Applies the captured attributes to an open handle.
    ///
    /// Both steps are attempted; failures are folded into one warning.
    pub fn apply(&self, file: &fs::File) -> Option<Warning> {
        let mut times = FileTimes::new();
        if let Some(accessed) = self.accessed {
            times = times.set_accessed(accessed);
        }
        if let Some(modified) = self.modified {
            times = times.set_modified(modified);
        }

        let timestamps = file.set_times(times);
        let permissions = file.set_permissions(self.permissions.clone());
        restore_warning(timestamps, permissions)
    }
}

fn restore_warning(timestamps: io::Result<()>, permissions: io::Result<()>) -> Option<Warning> {
    let problems: Vec<String> = [("timestamps", timestamps), ("permissions", permissions)]
        .into_iter()
        .filter_map(|(what, outcome)| outcome.err().map(|e| format!("{what}: {e}")))
        .collect();

    (!problems.is_empty()).then(|| Warning::AttributeRestore(problems.join("; ")))
}
