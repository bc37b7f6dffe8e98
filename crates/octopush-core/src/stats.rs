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

//! Per-run counters and result telemetry
//!
//! [`RunStats`] is append-only during a run, reset at the start of each
//! push, and the sole externally observed result object.

use octopush_api::RateLimitSnapshot;
use serde::Serialize;

/// Terminal state of one push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushOutcome {
    /// Nothing to commit, or the commit introduced no file changes
    #[default]
    NoChange,
    /// The base branch was fast-forwarded to the new commit
    DirectUpdate,
    /// A pull request was opened and left for review
    PullRequestOpened,
    /// The pull request was auto-merged and its branch cleaned up
    Merged,
}

/// Counters and URLs accumulated through one push
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Tree-row mutations submitted (adds, updates, moves, deletions)
    pub tree_rows: usize,
    /// Chained tree-creation calls needed to stay under the payload
    /// ceiling
    pub tree_batches: usize,
    /// Entries promoted from inline content to blob upload
    pub promotions: usize,
    /// Blobs actually uploaded (probes that found nothing)
    pub blobs_uploaded: usize,
    /// Rows sent as inline text
    pub text_inline: usize,
    /// Deletion rows
    pub deletions: usize,
    /// Rows referencing an already-stored blob
    pub references: usize,
    /// Digest of the created commit
    pub commit_sha: Option<String>,
    /// Browser URL of the created commit
    pub commit_url: Option<String>,
    /// Number of the opened pull request
    pub pull_request_number: Option<u64>,
    /// Browser URL of the opened pull request
    pub pull_request_url: Option<String>,
    /// Terminal state of the run
    pub outcome: PushOutcome,
    /// Last-observed rate-limit telemetry
    pub rate_limit: RateLimitSnapshot,
}
