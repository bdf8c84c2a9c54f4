// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the wallet cache layout.

use std::path::{Path, PathBuf};

/// File name of the wallet cache inside the cache directory.
pub const CACHE_NAMESPACE: &str = ".wallet";

/// Storage path utilities for the wallet cache.
#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
}

impl Default for CachePaths {
    /// The user's home directory, or the working directory when it is unknown.
    fn default() -> Self {
        Self::new(dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

impl CachePaths {
    /// Create a new CachePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the cache file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the JSON cache file.
    pub fn cache_file(&self) -> PathBuf {
        self.root.join(CACHE_NAMESPACE)
    }

    /// Scratch file written during atomic saves.
    pub fn cache_temp_file(&self) -> PathBuf {
        self.root.join(format!("{CACHE_NAMESPACE}.tmp"))
    }

    /// Probe file used by the readiness check.
    pub fn health_check_file(&self) -> PathBuf {
        self.root.join(format!("{CACHE_NAMESPACE}.health_check"))
    }
}
