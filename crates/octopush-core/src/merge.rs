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

//! Pull-request lifecycle
//!
//! Opens the PR from a freshly created branch, optionally patches its
//! issue side and requests reviewers, then (when configured) polls the
//! PR's merge readiness and its head commit's check runs until the PR
//! is mergeable, merges it squash-style, and removes the branch.
//!
//! Polls are conditional GETs: a 304 costs no rate-limit budget and the
//! previous poll's value stays authoritative.

use crate::config::{PullRequestOptions, DEFAULT_PR_TITLE};
use crate::error::{SyncError, SyncResult};
use octopush_api::{
    CheckRunList, GithubApi, MergeResult, MergeableState, NewPullRequest, PullRequest, RepoRef,
};
use tracing::{debug, info, warn};

/// Drives one pull request from branch creation to (optional) merge
pub struct MergeOrchestrator<'a> {
    api: &'a GithubApi,
    repo: &'a RepoRef,
    base: &'a str,
    options: &'a PullRequestOptions,
}

impl<'a> MergeOrchestrator<'a> {
    /// Orchestrator for one push's pull request
    pub fn new(
        api: &'a GithubApi,
        repo: &'a RepoRef,
        base: &'a str,
        options: &'a PullRequestOptions,
    ) -> Self {
        Self {
            api,
            repo,
            base,
            options,
        }
    }

    /// Branch name derived from the base branch and the commit digest
    pub fn branch_name(&self, commit_sha: &str) -> String {
        let short = commit_sha.get(..8).unwrap_or(commit_sha);
        format!("{}-{short}", self.base)
    }

    /// Create the head branch and open the pull request
    ///
    /// When a source issue is configured the PR is attached to it and
    /// carries no title of its own; otherwise the configured title (or
    /// [`DEFAULT_PR_TITLE`]) is used.
    pub async fn open_pull_request(&self, commit_sha: &str) -> SyncResult<PullRequest> {
        let branch = self.branch_name(commit_sha);
        self.api.create_ref(self.repo, &branch, commit_sha).await?;

        let params = NewPullRequest {
            title: match self.options.issue {
                Some(_) => None,
                None => Some(
                    self.options
                        .title
                        .clone()
                        .unwrap_or_else(|| DEFAULT_PR_TITLE.to_string()),
                ),
            },
            issue: self.options.issue,
            head: branch.clone(),
            base: self.base.to_string(),
            body: self.options.body.clone(),
            draft: self.options.draft,
            maintainer_can_modify: self.options.maintainer_can_modify,
        };
        let pr = self.api.create_pull_request(self.repo, &params).await?;
        info!(number = pr.number, head = %branch, "pull request opened");

        if let Some(patch) = &self.options.issue_options {
            if !patch.is_empty() {
                self.api.update_issue(self.repo, pr.number, patch).await?;
            }
        }
        if let Some(reviewers) = &self.options.review_options {
            if !reviewers.is_empty() {
                self.api
                    .request_reviewers(self.repo, pr.number, reviewers)
                    .await?;
            }
        }

        Ok(pr)
    }

    /// Wait for the PR to become mergeable, merge it, delete the branch
    pub async fn auto_merge(
        &self,
        pr: &PullRequest,
        commit_sha: &str,
    ) -> SyncResult<MergeResult> {
        if let Some(delay) = self.options.automatic_merge_delay {
            debug!(?delay, "waiting before first poll");
            tokio::time::sleep(delay).await;
        }

        self.wait_until_mergeable(pr, commit_sha).await?;

        let result = self.api.merge_pull_request(self.repo, pr.number).await?;
        info!(number = pr.number, sha = ?result.sha, "pull request merged");

        let branch = self.branch_name(commit_sha);
        if self.api.branch_exists(self.repo, &branch).await? {
            self.api.delete_ref(self.repo, &branch).await?;
            debug!(head = %branch, "head branch deleted");
        }

        Ok(result)
    }

    /// Poll merge readiness and check runs up to the attempt ceiling
    ///
    /// A failed check aborts immediately. The wait continues while the
    /// remote is still computing mergeability, or while the PR is
    /// blocked/unstable with check runs outstanding.
    async fn wait_until_mergeable(&self, pr: &PullRequest, commit_sha: &str) -> SyncResult<()> {
        let mut latest_pr = pr.clone();
        let mut latest_checks: Option<CheckRunList> = None;
        let mut pr_etag: Option<String> = None;
        let mut checks_etag: Option<String> = None;

        for attempt in 1..=self.options.automatic_merge_attempts {
            let fetched = self
                .api
                .get_pull_request(self.repo, pr.number, pr_etag.as_deref())
                .await?;
            if let Some(value) = fetched.value {
                latest_pr = value;
            }
            pr_etag = fetched.etag;

            let fetched = self
                .api
                .list_check_runs(self.repo, commit_sha, checks_etag.as_deref())
                .await?;
            if let Some(value) = fetched.value {
                latest_checks = Some(value);
            }
            checks_etag = fetched.etag;

            if let Some(run) = latest_checks.as_ref().and_then(CheckRunList::first_failure) {
                warn!(check = %run.name, "check run failed, aborting merge");
                return Err(SyncError::AutoMergeCheckFailed {
                    url: run.link().to_string(),
                });
            }

            let checks_pending = latest_checks
                .as_ref()
                .map(|list| !list.all_completed())
                .unwrap_or(true);
            let waiting = match latest_pr.state() {
                MergeableState::Unknown => true,
                MergeableState::Blocked | MergeableState::Unstable => checks_pending,
                _ => false,
            };
            if !waiting {
                debug!(attempt, state = ?latest_pr.state(), "pull request mergeable");
                return Ok(());
            }

            debug!(attempt, state = ?latest_pr.state(), "not mergeable yet");
            tokio::time::sleep(self.options.automatic_merge_poll).await;
        }

        Err(SyncError::AutoMergeTimeout {
            attempts: self.options.automatic_merge_attempts,
        })
    }
}
