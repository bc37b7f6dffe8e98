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

//! Remote tree snapshot
//!
//! Resolves the configured sub-path to a tree identifier, flattens the
//! fetched tree to root-relative blob rows, and seeds the run's
//! known-digest set from every digest observed. The snapshot is
//! read-only once fetched.

use crate::config::PushConfig;
use crate::error::{SyncError, SyncResult};
use octopush_api::{GitTreeEntry, GithubApi, RepoRef};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Flattened blob rows of the remote tree under the configured sub-path
#[derive(Debug, Default)]
pub struct RemoteSnapshot {
    rows: Vec<(String, String)>,
    index: HashMap<String, String>,
}

impl RemoteSnapshot {
    /// Empty snapshot, as seen when the sub-path does not exist yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries arrive relative to the fetched tree's root; `prefix` is
    /// the configured sub-path, so stored paths are always
    /// root-relative and comparable against staged paths.
    pub(crate) fn from_entries(entries: &[GitTreeEntry], prefix: &str) -> Self {
        let mut snapshot = Self::empty();
        for entry in entries.iter().filter(|e| e.is_blob()) {
            let path = if prefix.is_empty() {
                entry.path.clone()
            } else {
                format!("{prefix}/{}", entry.path)
            };
            snapshot.index.insert(path.clone(), entry.sha.clone());
            snapshot.rows.push((path, entry.sha.clone()));
        }
        snapshot
    }

    /// Digest stored at a path, if the path exists remotely
    pub fn sha_for(&self, path: &str) -> Option<&str> {
        self.index.get(path).map(String::as_str)
    }

    /// Paths in remote enumeration order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(path, _)| path.as_str())
    }

    /// Number of blob rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the snapshot holds no blob rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fetch the remote snapshot for one push
///
/// `head_tree` is the root tree of the base branch's head commit. With
/// an empty sub-path it is fetched directly; otherwise the sub-path is
/// resolved through its parent directory listing first. Every blob
/// digest seen, anywhere in the fetched tree, is added to `known`.
pub async fn fetch_snapshot(
    api: &GithubApi,
    repo: &RepoRef,
    config: &PushConfig,
    head_tree: &str,
    known: &mut HashSet<String>,
) -> SyncResult<RemoteSnapshot> {
    let sub_path = config.sub_path();

    let tree_sha = if sub_path.is_empty() {
        Some(head_tree.to_string())
    } else {
        resolve_sub_path(api, repo, &config.base, sub_path).await?
    };

    let Some(tree_sha) = tree_sha else {
        debug!(path = sub_path, "sub-path absent remotely, empty snapshot");
        return Ok(RemoteSnapshot::empty());
    };

    let tree = api.get_tree(repo, &tree_sha, config.recursive).await?;
    if tree.truncated {
        return Err(SyncError::tree_too_large(sub_path));
    }

    for entry in tree.tree.iter().filter(|e| e.is_blob()) {
        known.insert(entry.sha.clone());
    }

    let snapshot = RemoteSnapshot::from_entries(&tree.tree, sub_path);
    debug!(
        path = sub_path,
        blobs = snapshot.len(),
        "remote snapshot fetched"
    );
    Ok(snapshot)
}

/// Resolve a sub-path to its tree id via the parent directory listing
async fn resolve_sub_path(
    api: &GithubApi,
    repo: &RepoRef,
    base: &str,
    sub_path: &str,
) -> SyncResult<Option<String>> {
    let parent = match sub_path.rfind('/') {
        Some(idx) => &sub_path[..idx],
        None => "",
    };
    let listing = api.list_directory(repo, parent, base).await?;
    Ok(listing
        .into_iter()
        .find(|entry| entry.kind == "dir" && entry.path == sub_path)
        .map(|entry| entry.sha))
}
