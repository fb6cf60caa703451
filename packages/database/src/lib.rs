#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Path-addressed JSON document store access.
//!
//! The admin API only ever reads the `users` collection, but the store seam
//! mirrors the full Realtime Database surface (get, set, update, push,
//! delete) so the same trait backs both the hosted database and the
//! in-memory store used by tests and local development.

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Store returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// A response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The path contains characters the store does not allow in keys.
    #[error("Invalid path '{path}': {message}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Description of what is wrong.
        message: String,
    },
}

/// A hierarchical JSON store addressed by slash-separated paths.
///
/// An empty path addresses the root. Missing locations read as `None`;
/// writing `null` to a location removes it.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the path is invalid or the read fails.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the path is invalid or the write fails.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Merges `fields` into the object at `path`, leaving other children
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the path is invalid or the write fails.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Appends `value` under a newly generated child key of `path` and
    /// returns that key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the path is invalid or the write fails.
    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError>;

    /// Removes the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the path is invalid or the delete fails.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Characters the store rejects inside keys.
const FORBIDDEN_KEY_CHARS: [char; 5] = ['.', '$', '#', '[', ']'];

/// Splits a store path into its keys, ignoring leading, trailing and
/// repeated slashes.
///
/// # Errors
///
/// Returns [`StoreError::InvalidPath`] if a key contains a forbidden
/// character.
pub fn path_segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(bad) = segments
        .iter()
        .find(|s| s.contains(FORBIDDEN_KEY_CHARS.as_slice()))
    {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
            message: format!("key '{bad}' contains one of . $ # [ ]"),
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_ignore_extra_slashes() {
        assert_eq!(path_segments("/users//abc/").unwrap(), vec!["users", "abc"]);
        assert!(path_segments("").unwrap().is_empty());
        assert!(path_segments("/").unwrap().is_empty());
    }

    #[test]
    fn forbidden_characters_are_rejected() {
        for path in ["users/a.b", "users/$id", "a#b", "list[0]"] {
            assert!(
                matches!(path_segments(path), Err(StoreError::InvalidPath { .. })),
                "{path} accepted"
            );
        }
    }
}
