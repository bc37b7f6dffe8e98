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

//! The push pipeline
//!
//! [`RepoSync`] is the entry point: stage files, then [`RepoSync::push`]
//! runs snapshot → blob pass → delta → commit → comparison and either
//! fast-forwards the base branch or drives a pull request. The stage
//! survives the push, so a session can stage more files and push again.
//! The known-digest set also survives: content the remote stored on an
//! earlier push (inline or as a blob) is never re-sent by a later push
//! of the same session, even when the base branch has not moved. Each
//! push still unions in the fresh snapshot's digests.

use crate::blobs::sync_blobs;
use crate::commit::{record_row_stats, CommitBuilder};
use crate::compare::verify_changes;
use crate::config::{PullRequestOptions, PushConfig};
use crate::delta::compute_delta;
use crate::error::SyncResult;
use crate::merge::MergeOrchestrator;
use crate::snapshot::fetch_snapshot;
use crate::stage::FileStage;
use crate::stats::{PushOutcome, RunStats};
use octopush_api::{GithubApi, RepoRef};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// One repository synchronization session
pub struct RepoSync {
    api: GithubApi,
    repo: RepoRef,
    config: PushConfig,
    stage: FileStage,
    known_blobs: HashSet<String>,
}

impl RepoSync {
    /// Session against one repository with one push configuration
    pub fn new(api: GithubApi, repo: RepoRef, config: PushConfig) -> Self {
        Self {
            api,
            repo,
            config,
            stage: FileStage::new(),
            known_blobs: HashSet::new(),
        }
    }

    /// Stage text content at a path
    pub fn add(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.stage.add(path, value);
    }

    /// Stage raw bytes at a path
    pub fn add_bytes(&mut self, path: impl Into<String>, value: Vec<u8>) {
        self.stage.add_bytes(path, value);
    }

    /// Stage a serializable value at a path, as pretty-printed JSON
    pub fn add_json<T: Serialize>(
        &mut self,
        path: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        self.stage.add_json(path, value)
    }

    /// Exclude a path from sync and from the deletion sweep
    pub fn ignore(&mut self, path: impl Into<String>) {
        self.stage.ignore(path);
    }

    /// The staging table
    pub fn stage(&self) -> &FileStage {
        &self.stage
    }

    /// Synchronize the staged files into one commit
    ///
    /// Succeeds with [`PushOutcome::NoChange`] when the stage matches
    /// the remote state; nothing is created remotely in that case.
    pub async fn push(&mut self) -> SyncResult<RunStats> {
        let mut stats = RunStats::default();

        let head = self
            .api
            .get_branch_ref(&self.repo, &self.config.base)
            .await?;
        let head_sha = head.object.sha;
        let head_commit = self.api.get_commit(&self.repo, &head_sha).await?;
        let head_tree = head_commit.tree.sha;
        debug!(base = %self.config.base, head = %head_sha, "base branch resolved");

        let snapshot = fetch_snapshot(
            &self.api,
            &self.repo,
            &self.config,
            &head_tree,
            &mut self.known_blobs,
        )
        .await?;

        let report = sync_blobs(
            &self.api,
            &self.repo,
            &mut self.stage,
            self.config.content_to_blob_bytes,
            &mut self.known_blobs,
        )
        .await?;
        stats.promotions = report.promotions;
        stats.blobs_uploaded = report.uploaded;

        let rows = compute_delta(&self.stage, &snapshot, self.config.delete_other_files);
        if rows.is_empty() {
            info!("stage matches remote state, nothing to push");
            stats.rate_limit = self.api.rate_limit();
            return Ok(stats);
        }

        let built = CommitBuilder::new(&self.api, &self.repo)
            .build(&rows, &head_sha, &head_tree, self.config.message())
            .await?;
        record_row_stats(&rows, &self.stage, &mut stats, &mut self.known_blobs);
        stats.tree_batches = built.batches;
        stats.commit_sha = Some(built.sha.clone());
        stats.commit_url = built.url.clone();

        let comparison = verify_changes(&self.api, &self.repo, &head_sha, &built.sha).await?;
        if !comparison.has_changes() {
            info!(sha = %built.sha, "commit identical to parent, not publishing");
            stats.rate_limit = self.api.rate_limit();
            return Ok(stats);
        }

        if !self.config.pull_request {
            self.api
                .update_ref(&self.repo, &self.config.base, &built.sha)
                .await?;
            info!(base = %self.config.base, sha = %built.sha, "base branch updated");
            stats.outcome = PushOutcome::DirectUpdate;
            stats.rate_limit = self.api.rate_limit();
            return Ok(stats);
        }

        let default_options = PullRequestOptions::default();
        let options = self
            .config
            .pull_request_options
            .as_ref()
            .unwrap_or(&default_options);
        let orchestrator =
            MergeOrchestrator::new(&self.api, &self.repo, &self.config.base, options);

        let pr = orchestrator.open_pull_request(&built.sha).await?;
        stats.pull_request_number = Some(pr.number);
        stats.pull_request_url = Some(pr.html_url.clone());
        stats.outcome = PushOutcome::PullRequestOpened;

        if options.automatic_merge {
            orchestrator.auto_merge(&pr, &built.sha).await?;
            stats.outcome = PushOutcome::Merged;
        }

        stats.rate_limit = self.api.rate_limit();
        Ok(stats)
    }
}
