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

//! Push configuration
//!
//! One [`PushConfig`] describes one synchronize-then-commit workflow
//! against a single base branch. Optional pull-request sub-options are
//! explicit presence-flagged structures, never mutated dynamically.

use octopush_api::{IssuePatch, ReviewerRequest};
use std::time::Duration;

/// Commit message used when the caller supplies none
pub const DEFAULT_COMMIT_MESSAGE: &str = "Synchronize content";

/// PR title used when neither a title nor a source issue is supplied
pub const DEFAULT_PR_TITLE: &str = "Automated content update";

/// Configuration for one push
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Base branch the sync targets
    pub base: String,
    /// Sub-path under the repository root; `None` syncs the root tree
    pub path: Option<String>,
    /// Enumerate the remote tree recursively (default: true)
    pub recursive: bool,
    /// Delete remote paths absent from the stage (default: false)
    pub delete_other_files: bool,
    /// Inline-content byte threshold above which an entry is promoted
    /// to a separately-uploaded blob (default: 1000)
    pub content_to_blob_bytes: usize,
    /// Commit message; [`DEFAULT_COMMIT_MESSAGE`] when absent
    pub commit_message: Option<String>,
    /// Open a pull request instead of fast-forwarding the base branch
    pub pull_request: bool,
    /// Pull-request sub-options, used only when `pull_request` is set
    pub pull_request_options: Option<PullRequestOptions>,
}

impl PushConfig {
    /// Configuration with defaults for the given base branch
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: None,
            recursive: true,
            delete_other_files: false,
            content_to_blob_bytes: 1000,
            commit_message: None,
            pull_request: false,
            pull_request_options: None,
        }
    }

    /// Sub-path with any trailing slash removed, empty for the root
    pub fn sub_path(&self) -> &str {
        self.path
            .as_deref()
            .map(|p| p.trim_end_matches('/'))
            .unwrap_or("")
    }

    /// Commit message to use
    pub fn message(&self) -> &str {
        self.commit_message.as_deref().unwrap_or(DEFAULT_COMMIT_MESSAGE)
    }
}

/// Pull-request lifecycle options
#[derive(Debug, Clone)]
pub struct PullRequestOptions {
    /// PR title; mutually exclusive with `issue`
    pub title: Option<String>,
    /// Open the PR from an existing issue instead of a title
    pub issue: Option<u64>,
    /// PR body text
    pub body: Option<String>,
    /// Open as draft (default: false)
    pub draft: bool,
    /// Allow maintainer pushes to the source branch (default: true)
    pub maintainer_can_modify: bool,
    /// Reviewers/team reviewers to request after creation
    pub review_options: Option<ReviewerRequest>,
    /// Labels/assignees/milestone to patch onto the PR's issue
    pub issue_options: Option<IssuePatch>,
    /// Poll checks and merge automatically once they pass
    pub automatic_merge: bool,
    /// Initial sleep before the first poll; checks are not available
    /// immediately after PR creation
    pub automatic_merge_delay: Option<Duration>,
    /// Interval between polls (default: 1s)
    pub automatic_merge_poll: Duration,
    /// Poll ceiling before the wait aborts (default: 100)
    pub automatic_merge_attempts: u32,
}

impl Default for PullRequestOptions {
    fn default() -> Self {
        Self {
            title: None,
            issue: None,
            body: None,
            draft: false,
            maintainer_can_modify: true,
            review_options: None,
            issue_options: None,
            automatic_merge: false,
            automatic_merge_delay: None,
            automatic_merge_poll: Duration::from_secs(1),
            automatic_merge_attempts: 100,
        }
    }
}
