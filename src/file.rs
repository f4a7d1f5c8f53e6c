//! File discovery and in-place rewriting.
//!
//! [`Discovery`] turns the paths given on the command line into the flat,
//! de-duplicated list of regular files a batch will touch. The
//! [`rewriter`] does the per-file work.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use fast_glob::glob_match;
use hashbrown::HashSet;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::{TEMP_PREFIX, TEMP_SUFFIX};

pub mod attributes;
pub mod rewriter;

pub use rewriter::Rewriter;

/// Expands input paths into the files to process.
#[derive(Debug, Default)]
pub struct Discovery {
    excludes: Vec<String>,
}

impl Discovery {
    pub fn new(excludes: Vec<String>) -> Self {
        Self { excludes }
    }

    /// Walks every root and returns absolute paths of eligible regular files.
    ///
    /// A root may be a file or a directory. Symlinks are never followed.
    /// Unreadable directory entries are logged and skipped.
    pub fn collect(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for root in roots {
            let root = std::path::absolute(root).with_context(|| format!("invalid path: {}", root.display()))?;
            let metadata = fs::symlink_metadata(&root).with_context(|| format!("cannot access {}", root.display()))?;
            ensure!(metadata.is_file() || metadata.is_dir(), "not a regular file or directory: {}", root.display());

            for entry in WalkDir::new(&root).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("skipping unreadable entry: {e}");
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.into_path();
                if self.is_eligible(&path) && seen.insert(path.clone()) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    fn is_eligible(&self, path: &Path) -> bool {
        !is_temp_file(path) && !self.is_excluded(path)
    }

    /// True when any pattern matches the full path or one of its components.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_str().unwrap_or("");

        self.excludes.iter().any(|pattern| {
            if glob_match(pattern, path_str) {
                return true;
            }

            path.components().any(|comp| glob_match(pattern, comp.as_os_str().to_str().unwrap_or("")))
        })
    }
}

/// Leftover temp file from an interrupted rewrite.
fn is_temp_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|name| name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX))
}

/// Sum of the sizes of `paths`, ignoring files that vanished.
pub fn total_size(paths: &[PathBuf]) -> u64 {
    paths.iter().filter_map(|p| fs::metadata(p).ok()).map(|m| m.len()).sum()
}
