// Octopush - Atomic Multi-File Commits for GitHub
// Copyright (C) 2026 Octopush Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! In-memory staging table of path → entry operations
//!
//! The stage owns no remote knowledge: entries carry their
//! content-addressed digest from the moment they are added, computed
//! before any promotion decision. Ignored paths are tombstones that
//! exclude a path from both sync and the deletion sweep.

use crate::digest::blob_digest;
use serde::Serialize;
use std::collections::HashMap;

/// One staged file
///
/// Exactly one of content/buffer is populated once blob promotion has
/// run: `content` for inline-small text, `buffer` for anything destined
/// to be a separately-uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    content: Option<String>,
    buffer: Option<Vec<u8>>,
    digest: String,
}

impl FileEntry {
    /// Stage text content
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            digest: blob_digest(value.as_bytes()),
            content: Some(value),
            buffer: None,
        }
    }

    /// Stage raw bytes; always uploaded as a blob
    pub fn bytes(value: Vec<u8>) -> Self {
        Self {
            digest: blob_digest(&value),
            content: None,
            buffer: Some(value),
        }
    }

    /// Content-addressed digest of the logical bytes
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Inline text content, if not promoted to a blob
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Blob bytes, if staged as or promoted to a buffer
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Length of the logical bytes
    pub fn byte_len(&self) -> usize {
        match (&self.content, &self.buffer) {
            (Some(text), _) => text.len(),
            (None, Some(bytes)) => bytes.len(),
            (None, None) => 0,
        }
    }

    /// Move inline content into the buffer, as UTF-8 bytes
    ///
    /// Returns true if a promotion happened. The digest is unchanged;
    /// it was computed over the same bytes at stage time.
    pub(crate) fn promote(&mut self) -> bool {
        match self.content.take() {
            Some(text) => {
                self.buffer = Some(text.into_bytes());
                true
            }
            None => false,
        }
    }
}

enum Staged {
    File(FileEntry),
    Ignored,
}

/// Staging table with insertion-order iteration
///
/// Re-adding a path overwrites the prior entry (last write wins) while
/// keeping the path's original position, so iteration order is
/// deterministic for a given call sequence.
#[derive(Default)]
pub struct FileStage {
    entries: HashMap<String, Staged>,
    order: Vec<String>,
}

impl FileStage {
    /// Create an empty stage
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, path: String, entry: Staged) {
        if !self.entries.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.entries.insert(path, entry);
    }

    /// Stage text content at a path
    pub fn add(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.insert(path.into(), Staged::File(FileEntry::text(value)));
    }

    /// Stage raw bytes at a path
    pub fn add_bytes(&mut self, path: impl Into<String>, value: Vec<u8>) {
        self.insert(path.into(), Staged::File(FileEntry::bytes(value)));
    }

    /// Stage a serializable value at a path, as pretty-printed JSON
    pub fn add_json<T: Serialize>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let text = serde_json::to_string_pretty(value)?;
        self.add(path, text);
        Ok(())
    }

    /// Tombstone a path: excluded from sync and from the deletion sweep
    pub fn ignore(&mut self, path: impl Into<String>) {
        self.insert(path.into(), Staged::Ignored);
    }

    /// Check whether a path is tombstoned
    pub fn is_ignored(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(Staged::Ignored))
    }

    /// Check whether a path has a staged file (not a tombstone)
    pub fn contains(&self, path: &str) -> bool {
        matches!(self.entries.get(path), Some(Staged::File(_)))
    }

    /// Look up a staged file by path
    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        match self.entries.get(path) {
            Some(Staged::File(entry)) => Some(entry),
            _ => None,
        }
    }

    pub(crate) fn file_mut(&mut self, path: &str) -> Option<&mut FileEntry> {
        match self.entries.get_mut(path) {
            Some(Staged::File(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Staged files in insertion order, skipping tombstones
    pub fn files(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.order.iter().filter_map(|path| {
            self.file(path).map(|entry| (path.as_str(), entry))
        })
    }

    /// Paths of staged files in insertion order
    pub fn paths(&self) -> Vec<String> {
        self.files().map(|(path, _)| path.to_string()).collect()
    }

    /// Number of staged files (tombstones excluded)
    pub fn len(&self) -> usize {
        self.files().count()
    }

    /// Check whether no files are staged
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
