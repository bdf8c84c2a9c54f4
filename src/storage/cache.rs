// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Flat key-value cache persisted as a single JSON object.
//!
//! The whole map is held in memory and rewritten on every `save`, first to a
//! temp file and then renamed over the cache file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::CachePaths;

/// Error type for cache operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations
    Io(io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Cache file holds something other than a JSON object
    Corrupted(String),
    /// Health check read back different bytes
    IntegrityViolation(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Json(e) => write!(f, "JSON error: {e}"),
            StorageError::Corrupted(msg) => write!(f, "Corrupted cache: {msg}"),
            StorageError::IntegrityViolation(msg) => write!(f, "Integrity violation: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone)]
pub struct FlatCache {
    paths: CachePaths,
    entries: Map<String, Value>,
}

impl FlatCache {
    /// Load the cache file, starting empty when it does not exist yet.
    pub fn load(paths: CachePaths) -> StorageResult<Self> {
        let path = paths.cache_file();
        let entries = match File::open(&path) {
            Ok(file) => match serde_json::from_reader(BufReader::new(file))? {
                Value::Object(map) => map,
                other => {
                    return Err(StorageError::Corrupted(format!(
                        "{} holds a JSON {} instead of an object",
                        path.display(),
                        json_kind(&other)
                    )))
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { paths, entries })
    }

    #[cfg(test)]
    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Raw value stored under `key`.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Deserialize the value stored under `key`.
    pub fn get_key<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        self.entries
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(StorageError::from)
    }

    /// Set `key` in memory. Nothing is written until [`FlatCache::save`].
    pub fn set_key<T: Serialize>(&mut self, key: &str, value: &T) -> StorageResult<()> {
        self.entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Write the whole map (atomic write via rename).
    pub fn save(&self) -> StorageResult<()> {
        fs::create_dir_all(self.paths.root())?;

        let temp_path = self.paths.cache_temp_file();
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &self.entries)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, self.paths.cache_file())?;
        Ok(())
    }

    /// Write, read back and delete a probe file next to the cache.
    pub fn health_check(&self) -> StorageResult<()> {
        let test_file = self.paths.health_check_file();
        let test_data = b"health_check_data";

        fs::create_dir_all(self.paths.root())?;
        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
