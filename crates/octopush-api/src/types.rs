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

//! Wire types for the GitHub REST endpoints consumed by octopush

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one repository on the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Create a repository reference
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// One node in a tree-creation request
///
/// Exactly one of `content` and `sha` is present. `sha` is tri-state:
/// omitted (inline `content` carries the bytes), an explicit `null`
/// (delete this path), or a digest (point the path at an existing
/// blob). The double-`Option` keeps `null` and "omitted" distinct on
/// the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRow {
    /// Path of the node, relative to the tree root
    pub path: String,
    /// File mode, always `100644` for synced files
    pub mode: String,
    /// Node type, always `blob`
    #[serde(rename = "type")]
    pub kind: String,
    /// Blob digest reference, or explicit `null` for a deletion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<Option<String>>,
    /// Inline text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl TreeRow {
    fn base(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            sha: None,
            content: None,
        }
    }

    /// Row carrying inline text content
    pub fn content(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::base(path)
        }
    }

    /// Row pointing the path at an already-stored blob
    pub fn reference(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            sha: Some(Some(sha.into())),
            ..Self::base(path)
        }
    }

    /// Row deleting the path (`sha: null`)
    pub fn deletion(path: impl Into<String>) -> Self {
        Self {
            sha: Some(None),
            ..Self::base(path)
        }
    }

    /// Check if this row deletes its path
    pub fn is_deletion(&self) -> bool {
        matches!(self.sha, Some(None))
    }

    /// Check if this row references an existing blob
    pub fn is_reference(&self) -> bool {
        matches!(self.sha, Some(Some(_))) && self.content.is_none()
    }

    /// Check if this row carries inline content
    pub fn is_content(&self) -> bool {
        self.content.is_some()
    }
}

/// A tree snapshot returned by the get-tree endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GitTree {
    /// Tree identifier
    pub sha: String,
    /// Flattened entries
    pub tree: Vec<GitTreeEntry>,
    /// Set when the remote could not enumerate every entry
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a fetched tree
#[derive(Debug, Clone, Deserialize)]
pub struct GitTreeEntry {
    /// Path relative to the fetched tree's root
    pub path: String,
    /// Entry type (`blob` or `tree`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Object digest
    pub sha: String,
    /// File mode
    #[serde(default)]
    pub mode: String,
}

impl GitTreeEntry {
    /// Check if this entry is a blob (file)
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// Response of a tree-creation call
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTree {
    /// Identifier of the created tree
    pub sha: String,
}

/// A branch reference
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    /// Fully qualified ref name
    #[serde(rename = "ref")]
    pub name: String,
    /// Object the ref points to
    pub object: GitObject,
}

/// Target of a [`GitRef`]
#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    /// Object digest
    pub sha: String,
    /// Object type
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A commit object
#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    /// Commit digest
    pub sha: String,
    /// Tree the commit snapshots
    pub tree: TreeId,
    /// Browser URL of the commit
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Tree reference inside a commit
#[derive(Debug, Clone, Deserialize)]
pub struct TreeId {
    /// Tree digest
    pub sha: String,
}

/// One entry of a directory listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Object digest
    pub sha: String,
    /// Entry type (`file` or `dir`)
    #[serde(rename = "type")]
    pub kind: String,
}

/// Result of comparing two commits
#[derive(Debug, Clone, Deserialize)]
pub struct CommitComparison {
    /// Files that differ between the two commits
    #[serde(default)]
    pub files: Vec<ComparedFile>,
}

impl CommitComparison {
    /// Check whether any file changed
    pub fn has_changes(&self) -> bool {
        !self.files.is_empty()
    }
}

/// One changed file in a commit comparison
#[derive(Debug, Clone, Deserialize)]
pub struct ComparedFile {
    /// Path of the changed file
    pub filename: String,
    /// Change kind reported by the remote (added, removed, renamed, ...)
    #[serde(default)]
    pub status: String,
}

/// Response of a blob-creation call
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedBlob {
    /// Digest the blob was stored under
    pub sha: String,
}

/// Parameters for opening a pull request
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPullRequest {
    /// PR title; omitted when the PR is created from an issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Source issue number, mutually exclusive with `title`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<u64>,
    /// Source branch
    pub head: String,
    /// Target branch
    pub base: String,
    /// PR body text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Open as draft
    pub draft: bool,
    /// Allow maintainer pushes to the source branch
    pub maintainer_can_modify: bool,
}

/// A pull request as returned by the remote
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Browser URL
    #[serde(default)]
    pub html_url: String,
    /// Whether the remote considers the PR mergeable; `null` while the
    /// remote is still computing it
    #[serde(default)]
    pub mergeable: Option<bool>,
    /// Remote-computed merge readiness
    #[serde(default)]
    pub mergeable_state: Option<String>,
}

impl PullRequest {
    /// Parsed [`MergeableState`] of this PR
    pub fn state(&self) -> MergeableState {
        MergeableState::parse(self.mergeable_state.as_deref())
    }
}

/// Remote-computed merge readiness of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeableState {
    /// The remote has not finished computing mergeability
    Unknown,
    /// Required checks or reviews are still outstanding
    Blocked,
    /// Non-required checks are failing or running
    Unstable,
    /// Ready to merge
    Clean,
    /// Merge conflicts
    Dirty,
    /// The head branch is behind the base
    Behind,
    /// Any state this client has no special handling for
    Other,
}

impl MergeableState {
    /// Parse the wire value; absent means the remote is still computing
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("unknown") => MergeableState::Unknown,
            Some("blocked") => MergeableState::Blocked,
            Some("unstable") => MergeableState::Unstable,
            Some("clean") => MergeableState::Clean,
            Some("dirty") => MergeableState::Dirty,
            Some("behind") => MergeableState::Behind,
            Some(_) => MergeableState::Other,
        }
    }
}

/// Labels/assignees/milestone patch for the issue behind a PR
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssuePatch {
    /// Labels to set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Assignees to set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    /// Milestone number to set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

impl IssuePatch {
    /// Check whether the patch would change anything
    pub fn is_empty(&self) -> bool {
        self.labels.is_none() && self.assignees.is_none() && self.milestone.is_none()
    }
}

/// Reviewer request for a pull request
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewerRequest {
    /// Individual reviewers by login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<String>>,
    /// Team reviewers by slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_reviewers: Option<Vec<String>>,
}

impl ReviewerRequest {
    /// Check whether the request names any reviewer
    pub fn is_empty(&self) -> bool {
        self.reviewers.is_none() && self.team_reviewers.is_none()
    }
}

/// Check runs attached to one commit
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunList {
    /// Total number of check runs
    #[serde(default)]
    pub total_count: u64,
    /// The check runs
    #[serde(default)]
    pub check_runs: Vec<CheckRun>,
}

impl CheckRunList {
    /// Check whether every run has completed
    pub fn all_completed(&self) -> bool {
        self.check_runs.iter().all(CheckRun::is_completed)
    }

    /// First run that concluded with a failure, if any
    pub fn first_failure(&self) -> Option<&CheckRun> {
        self.check_runs.iter().find(|r| r.is_failure())
    }
}

/// One CI check run
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    /// Check name
    #[serde(default)]
    pub name: String,
    /// Lifecycle status (`queued`, `in_progress`, `completed`)
    pub status: String,
    /// Conclusion once completed
    #[serde(default)]
    pub conclusion: Option<String>,
    /// Browser URL of the run
    #[serde(default)]
    pub html_url: Option<String>,
}

impl CheckRun {
    /// Check whether the run has finished
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    /// Check whether the run concluded with a failure
    pub fn is_failure(&self) -> bool {
        matches!(self.conclusion.as_deref(), Some("failure"))
    }

    /// Best available link for error reporting
    pub fn link(&self) -> &str {
        self.html_url.as_deref().unwrap_or(&self.name)
    }
}

/// Response of a merge call
#[derive(Debug, Clone, Deserialize)]
pub struct MergeResult {
    /// Whether the PR was merged
    pub merged: bool,
    /// Digest of the merge commit
    #[serde(default)]
    pub sha: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tree_row_content_serialization() {
        let row = TreeRow::content("docs/a.md", "hello");
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            json!({"path": "docs/a.md", "mode": "100644", "type": "blob", "content": "hello"})
        );
        assert!(row.is_content());
        assert!(!row.is_reference());
    }

    #[test]
    fn test_tree_row_deletion_serializes_null_sha() {
        let row = TreeRow::deletion("old.txt");
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["sha"], serde_json::Value::Null);
        assert!(value.get("content").is_none());
        assert!(row.is_deletion());
    }

    #[test]
    fn test_tree_row_reference_never_carries_content() {
        let row = TreeRow::reference("big.bin", "abc123");
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["sha"], json!("abc123"));
        assert!(value.get("content").is_none());
        assert!(row.is_reference());
        assert!(!row.is_deletion());
    }

    #[test]
    fn test_mergeable_state_parse() {
        assert_eq!(MergeableState::parse(None), MergeableState::Unknown);
        assert_eq!(MergeableState::parse(Some("blocked")), MergeableState::Blocked);
        assert_eq!(MergeableState::parse(Some("unstable")), MergeableState::Unstable);
        assert_eq!(MergeableState::parse(Some("clean")), MergeableState::Clean);
        assert_eq!(MergeableState::parse(Some("wat")), MergeableState::Other);
    }

    #[test]
    fn test_check_run_list_failure_detection() {
        let list: CheckRunList = serde_json::from_value(json!({
            "total_count": 2,
            "check_runs": [
                {"name": "build", "status": "completed", "conclusion": "success"},
                {"name": "lint", "status": "completed", "conclusion": "failure",
                 "html_url": "https://x/runs/2"}
            ]
        }))
        .unwrap();

        assert!(list.all_completed());
        let failing = list.first_failure().unwrap();
        assert_eq!(failing.link(), "https://x/runs/2");
    }

    #[test]
    fn test_check_run_list_pending() {
        let list: CheckRunList = serde_json::from_value(json!({
            "check_runs": [{"name": "build", "status": "in_progress", "conclusion": null}]
        }))
        .unwrap();
        assert!(!list.all_completed());
        assert!(list.first_failure().is_none());
    }

    #[test]
    fn test_new_pull_request_omits_absent_fields() {
        let pr = NewPullRequest {
            title: None,
            issue: Some(17),
            head: "main-abc".to_string(),
            base: "main".to_string(),
            body: None,
            draft: false,
            maintainer_can_modify: true,
        };
        let value = serde_json::to_value(&pr).unwrap();
        assert!(value.get("title").is_none());
        assert!(value.get("body").is_none());
        assert_eq!(value["issue"], json!(17));
    }

    #[test]
    fn test_pull_request_state() {
        let pr: PullRequest = serde_json::from_value(json!({
            "number": 9, "html_url": "https://x/pull/9",
            "mergeable": null, "mergeable_state": "unknown"
        }))
        .unwrap();
        assert_eq!(pr.state(), MergeableState::Unknown);
        assert_eq!(pr.mergeable, None);
    }

    #[test]
    fn test_repo_ref_display() {
        let repo = RepoRef::new("octo", "demo");
        assert_eq!(repo.to_string(), "octo/demo");
    }
}
