//! Context types for rule execution.

use crate::layer::{FileRole, Layer};
use std::path::{Path, PathBuf};

/// Context provided to per-file rules.
///
/// Carries the path-derived classification computed once per file so every
/// rule sees the same layer and roles.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path of the file as given to the analyzer.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Whether this file is detected as a test file.
    pub is_test: bool,
    /// Layer and structural roles derived from the path.
    pub role: FileRole,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        let role = FileRole::classify(&path.to_string_lossy());

        Self {
            path,
            content,
            is_test: role.is_test,
            role,
            relative_path,
        }
    }

    /// Creates a context for a standalone file with no project root.
    #[must_use]
    pub fn standalone(path: &'a Path, content: &'a str) -> Self {
        Self::new(path, content, Path::new(""))
    }

    /// Layer of the file, if any.
    #[must_use]
    pub fn layer(&self) -> Option<Layer> {
        self.role.layer
    }

    /// Calculates byte offset for a given line and column.
    ///
    /// Both are 1-indexed; out of range positions clamp to the end.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.split('\n').enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len() + 1;
        }

        self.content.len()
    }
}
