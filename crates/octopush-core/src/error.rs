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

//! Sync error types
//!
//! Every variant is fatal to the current push: there is no partial
//! success, no rollback of already-uploaded blobs (content-addressed
//! and inert if unreferenced), and no cleanup of an already-created
//! branch.

use octopush_api::ApiError;
use thiserror::Error;

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can abort a push
#[derive(Error, Debug)]
pub enum SyncError {
    /// A remote request failed; see [`ApiError`] for the taxonomy
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The remote reported a truncated tree enumeration
    ///
    /// Recursive listing must not silently under-report. The remedy is
    /// narrowing the sync to a sub-path, not retrying.
    #[error("remote tree at '{path}' is truncated; narrow the sync to a deeper sub-path")]
    TreeTooLarge {
        /// Sub-path whose tree could not be fully enumerated
        path: String,
    },

    /// A check run concluded with a failure during the auto-merge wait
    #[error("auto-merge aborted, check failed: {url}")]
    AutoMergeCheckFailed {
        /// Link to the failing check run
        url: String,
    },

    /// The auto-merge wait loop exhausted its attempt ceiling
    #[error("auto-merge wait gave up after {attempts} polls")]
    AutoMergeTimeout {
        /// Number of polls performed before giving up
        attempts: u32,
    },
}

impl SyncError {
    /// Create a TreeTooLarge error for the given sub-path
    pub fn tree_too_large(path: impl Into<String>) -> Self {
        SyncError::TreeTooLarge { path: path.into() }
    }

    /// Check if this is a TreeTooLarge error
    pub fn is_tree_too_large(&self) -> bool {
        matches!(self, SyncError::TreeTooLarge { .. })
    }

    /// Check if this error aborted an auto-merge wait
    pub fn is_auto_merge_failure(&self) -> bool {
        matches!(
            self,
            SyncError::AutoMergeCheckFailed { .. } | SyncError::AutoMergeTimeout { .. }
        )
    }
}
