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

//! Parent-to-commit change verification
//!
//! A commit can be byte-identical to its parent even after rows were
//! submitted (the remote normalizes content rows to the digests it
//! already stores). The comparison is the authoritative answer to
//! whether the new commit is worth publishing.

use crate::error::SyncResult;
use octopush_api::{CommitComparison, GithubApi, RepoRef};
use tracing::debug;

/// Compare the new commit against its parent
pub async fn verify_changes(
    api: &GithubApi,
    repo: &RepoRef,
    parent: &str,
    commit: &str,
) -> SyncResult<CommitComparison> {
    let comparison = api.compare_commits(repo, parent, commit).await?;
    for file in &comparison.files {
        debug!(path = %file.filename, status = %file.status, "changed file");
    }
    debug!(files = comparison.files.len(), "commit compared to parent");
    Ok(comparison)
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

    #[tokio::test]
    async fn test_changed_commit() {
        let mock = MockTransport::new();
        mock.enqueue(
            Method::Get,
            "/compare/head0...c9",
            ApiResponse::json(
                200,
                json!({"files": [{"filename": "a.txt", "status": "modified"}]}),
            ),
        )
        .await;

        let comparison = verify_changes(&api(&mock), &RepoRef::new("octo", "demo"), "head0", "c9")
            .await
            .unwrap();
        assert!(comparison.has_changes());
    }

    #[tokio::test]
    async fn test_identical_commit() {
        let mock = MockTransport::new();
        mock.enqueue(
            Method::Get,
            "/compare/",
            ApiResponse::json(200, json!({"files": []})),
        )
        .await;

        let comparison = verify_changes(&api(&mock), &RepoRef::new("octo", "demo"), "head0", "c9")
            .await
            .unwrap();
        assert!(!comparison.has_changes());
    }
}
