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

//! Tree and commit creation
//!
//! Turns the delta rows into one commit. Rows are submitted in batches
//! whose serialized JSON stays under a payload ceiling; each batch's
//! tree builds on the previous batch's result, so the final tree holds
//! every mutation and the branch receives exactly one new commit no
//! matter how many batches were needed.

use crate::error::SyncResult;
use crate::stage::FileStage;
use crate::stats::RunStats;
use octopush_api::{GithubApi, RepoRef, TreeRow};
use std::collections::HashSet;
use tracing::{debug, info};

/// Serialized-row budget per tree-creation call
pub const DEFAULT_PAYLOAD_CEILING: usize = 500_000;

/// The commit produced from one delta
#[derive(Debug)]
pub struct BuiltCommit {
    /// Digest of the new commit
    pub sha: String,
    /// Browser URL of the new commit
    pub url: Option<String>,
    /// Number of chained tree-creation calls
    pub batches: usize,
}

/// Builds one commit from a set of tree rows
pub struct CommitBuilder<'a> {
    api: &'a GithubApi,
    repo: &'a RepoRef,
    payload_ceiling: usize,
}

impl<'a> CommitBuilder<'a> {
    /// Builder with the default payload ceiling
    pub fn new(api: &'a GithubApi, repo: &'a RepoRef) -> Self {
        Self {
            api,
            repo,
            payload_ceiling: DEFAULT_PAYLOAD_CEILING,
        }
    }

    /// Override the payload ceiling (bytes of serialized rows per call)
    pub fn with_payload_ceiling(mut self, ceiling: usize) -> Self {
        self.payload_ceiling = ceiling;
        self
    }

    /// Create the chained trees and the single commit
    ///
    /// `parent` is the head commit of the base branch, `base_tree` its
    /// root tree. The rows must be non-empty.
    pub async fn build(
        &self,
        rows: &[TreeRow],
        parent: &str,
        base_tree: &str,
        message: &str,
    ) -> SyncResult<BuiltCommit> {
        let batches = split_rows(rows, self.payload_ceiling);
        let count = batches.len();

        let mut tree = base_tree.to_string();
        for (index, batch) in batches.iter().enumerate() {
            let created = self.api.create_tree(self.repo, batch, &tree).await?;
            debug!(
                batch = index + 1,
                of = count,
                rows = batch.len(),
                sha = %created.sha,
                "tree batch created"
            );
            tree = created.sha;
        }

        let commit = self
            .api
            .create_commit(self.repo, message, &tree, &[parent.to_string()])
            .await?;
        info!(sha = %commit.sha, rows = rows.len(), batches = count, "commit created");

        Ok(BuiltCommit {
            sha: commit.sha,
            url: commit.html_url,
            batches: count,
        })
    }
}

/// Split rows into slices whose serialized length fits the ceiling
///
/// Bisects recursively; a single row is never split further even when
/// it alone exceeds the ceiling.
fn split_rows(rows: &[TreeRow], ceiling: usize) -> Vec<&[TreeRow]> {
    if rows.len() <= 1 || payload_len(rows) <= ceiling {
        return vec![rows];
    }
    let mid = rows.len() / 2;
    let (left, right) = rows.split_at(mid);
    let mut batches = split_rows(left, ceiling);
    batches.extend(split_rows(right, ceiling));
    batches
}

fn payload_len(rows: &[TreeRow]) -> usize {
    serde_json::to_string(rows).map(|s| s.len()).unwrap_or(usize::MAX)
}

/// Fold the submitted rows into the run counters and the known set
///
/// Inline rows expose a digest now stored remotely, so they join the
/// known set for later pushes through the same session.
pub(crate) fn record_row_stats(
    rows: &[TreeRow],
    stage: &FileStage,
    stats: &mut RunStats,
    known: &mut HashSet<String>,
) {
    stats.tree_rows = rows.len();
    for row in rows {
        if row.is_deletion() {
            stats.deletions += 1;
        } else if row.is_reference() {
            stats.references += 1;
        } else {
            stats.text_inline += 1;
            if let Some(entry) = stage.file(&row.path) {
                known.insert(entry.digest().to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octopush_api::mock::MockTransport;
    use octopush_api::{ApiResponse, Method, Transport};
    use serde_json::json;
    use std::sync::Arc;

    fn api(mock: &MockTransport) -> GithubApi {
        GithubApi::new(Arc::new(mock.clone()) as Arc<dyn Transport>, "tok")
    }

    fn repo() -> RepoRef {
        RepoRef::new("octo", "demo")
    }

    fn rows(n: usize) -> Vec<TreeRow> {
        (0..n)
            .map(|i| TreeRow::content(format!("f{i}.txt"), "v"))
            .collect()
    }

    #[test]
    fn test_split_under_ceiling_is_one_batch() {
        let rows = rows(10);
        let batches = split_rows(&rows, DEFAULT_PAYLOAD_CEILING);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 10);
    }

    #[test]
    fn test_split_bisects_until_fitting() {
        let rows = rows(8);
        let single = payload_len(&rows[..1]);
        // Ceiling fits about two rows, so bisection bottoms out at
        // two-row slices.
        let batches = split_rows(&rows, single * 2 + 2);
        assert!(batches.len() >= 4);
        let total: usize = batches.iter().map(|b| b.len()).sum();
        assert_eq!(total, 8);
        for batch in &batches {
            assert!(payload_len(batch) <= single * 2 + 2 || batch.len() == 1);
        }
    }

    #[test]
    fn test_split_never_divides_a_single_row() {
        let rows = vec![TreeRow::content("huge.txt", "x".repeat(100))];
        let batches = split_rows(&rows, 8);
        assert_eq!(batches.len(), 1);
    }

    #[tokio::test]
    async fn test_build_chains_batches_into_one_commit() {
        let mock = MockTransport::new();
        mock.enqueue(
            Method::Post,
            "/git/trees",
            ApiResponse::json(201, json!({"sha": "tree-a"})),
        )
        .await;
        mock.enqueue(
            Method::Post,
            "/git/trees",
            ApiResponse::json(201, json!({"sha": "tree-b"})),
        )
        .await;
        mock.enqueue(
            Method::Post,
            "/git/commits",
            ApiResponse::json(
                201,
                json!({"sha": "c9", "tree": {"sha": "tree-b"},
                       "html_url": "https://example.test/c9"}),
            ),
        )
        .await;

        let all = rows(2);
        let single = payload_len(&all[..1]);
        let built = CommitBuilder::new(&api(&mock), &repo())
            .with_payload_ceiling(single)
            .build(&all, "head0", "root0", "sync")
            .await
            .unwrap();

        assert_eq!(built.sha, "c9");
        assert_eq!(built.batches, 2);
        assert_eq!(built.url.as_deref(), Some("https://example.test/c9"));

        let sent = mock.requests().await;
        assert_eq!(sent.len(), 3);
        // First batch builds on the branch tree, second on the first.
        assert_eq!(sent[0].body.as_ref().unwrap()["base_tree"], "root0");
        assert_eq!(sent[1].body.as_ref().unwrap()["base_tree"], "tree-a");
        // Single-parent commit on the final tree.
        let commit = sent[2].body.as_ref().unwrap();
        assert_eq!(commit["tree"], "tree-b");
        assert_eq!(commit["parents"], json!(["head0"]));
    }

    #[test]
    fn test_record_row_stats_classifies_rows() {
        let mut stage = FileStage::new();
        stage.add("a.txt", "inline");
        let digest = crate::digest::blob_digest(b"inline");

        let rows = vec![
            TreeRow::content("a.txt", "inline"),
            TreeRow::reference("b.bin", "d2"),
            TreeRow::deletion("c.txt"),
        ];
        let mut stats = RunStats::default();
        let mut known = HashSet::new();
        record_row_stats(&rows, &stage, &mut stats, &mut known);

        assert_eq!(stats.tree_rows, 3);
        assert_eq!(stats.text_inline, 1);
        assert_eq!(stats.references, 1);
        assert_eq!(stats.deletions, 1);
        assert!(known.contains(&digest));
    }
}
