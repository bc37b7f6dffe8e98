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

//! Typed client for the GitHub REST endpoints
//!
//! [`GithubApi`] wraps a [`Transport`] with one method per consumed
//! endpoint. It owns the cross-cutting request concerns: bearer
//! credential injection, JSON content negotiation, rate-limit
//! telemetry capture after every call, and ETag-conditional reads.
//!
//! Every method maps an unexpected status to
//! [`ApiError::RequestFailed`] and a malformed JSON body to
//! [`ApiError::UnexpectedContentType`]; there is no retry at this
//! layer.

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::types::{
    CheckRunList, CommitComparison, ContentEntry, CreatedBlob, CreatedTree, GitCommit, GitRef,
    GitTree, IssuePatch, MergeResult, NewPullRequest, PullRequest, RepoRef, ReviewerRequest,
    TreeRow,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Last-observed rate-limit telemetry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    /// Value of the most recent `x-ratelimit-remaining` header
    pub remaining: Option<u64>,
    /// Value of the most recent `Retry-After` header, in seconds
    pub retry_after_secs: Option<u64>,
}

/// Result of an ETag-conditional read
///
/// `value` is `None` when the remote answered 304 Not Modified; the
/// caller keeps using its cached copy and the returned `etag`.
#[derive(Debug, Clone)]
pub struct Conditional<T> {
    /// Fresh value, absent on a 304 response
    pub value: Option<T>,
    /// Validation token for the next conditional request
    pub etag: Option<String>,
}

/// Typed endpoint wrappers over a [`Transport`]
pub struct GithubApi {
    transport: Arc<dyn Transport>,
    base_url: String,
    token: String,
    // -1 means "not observed yet"
    rate_remaining: AtomicI64,
    rate_retry_after: AtomicI64,
}

impl GithubApi {
    /// Create a client against the public GitHub API
    pub fn new(transport: Arc<dyn Transport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: "https://api.github.com".to_string(),
            token: token.into(),
            rate_remaining: AtomicI64::new(-1),
            rate_retry_after: AtomicI64::new(-1),
        }
    }

    /// Point the client at a different API root (GitHub Enterprise)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Last-observed rate-limit telemetry
    pub fn rate_limit(&self) -> RateLimitSnapshot {
        let load = |a: &AtomicI64| {
            let v = a.load(Ordering::Relaxed);
            (v >= 0).then_some(v as u64)
        };
        RateLimitSnapshot {
            remaining: load(&self.rate_remaining),
            retry_after_secs: load(&self.rate_retry_after),
        }
    }

    fn repo_url(&self, repo: &RepoRef, tail: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, repo, tail)
    }

    async fn dispatch(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        if self.token.trim().is_empty() {
            return Err(ApiError::AuthMissing(request.url));
        }
        request = request
            .with_header("authorization", format!("Bearer {}", self.token))
            .with_header("accept", "application/vnd.github+json");
        if request.body.is_some() {
            request = request.with_header("content-type", "application/json");
        }
        debug!(method = %request.method, url = %request.url, "api request");

        let response = self.transport.send(request).await?;
        self.record_rate_limit(&response);
        Ok(response)
    }

    fn record_rate_limit(&self, response: &ApiResponse) {
        let store = |a: &AtomicI64, header: &str| {
            if let Some(v) = response.header(header).and_then(|s| s.parse::<i64>().ok()) {
                a.store(v, Ordering::Relaxed);
            }
        };
        store(&self.rate_remaining, "x-ratelimit-remaining");
        store(&self.rate_retry_after, "retry-after");
    }

    async fn send_expect(
        &self,
        request: ApiRequest,
        expected: &[u16],
    ) -> ApiResult<ApiResponse> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.dispatch(request).await?;
        if !expected.contains(&response.status) {
            return Err(ApiError::request_failed(
                method.as_str(),
                url,
                response.status,
                response.body,
            ));
        }
        Ok(response)
    }

    fn parse_json<T: DeserializeOwned>(url: &str, response: &ApiResponse) -> ApiResult<T> {
        response
            .parse()
            .map_err(|_| ApiError::unexpected_content_type(url, response.body.clone()))
    }

    /// Resolve a branch to the commit it points at
    pub async fn get_branch_ref(&self, repo: &RepoRef, branch: &str) -> ApiResult<GitRef> {
        let url = self.repo_url(repo, &format!("/git/ref/heads/{branch}"));
        let resp = self
            .send_expect(ApiRequest::new(Method::Get, &url), &[200])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Check whether a branch ref exists
    pub async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> ApiResult<bool> {
        let url = self.repo_url(repo, &format!("/git/ref/heads/{branch}"));
        let resp = self
            .send_expect(ApiRequest::new(Method::Get, &url), &[200, 404])
            .await?;
        Ok(resp.status == 200)
    }

    /// Fetch a commit object
    pub async fn get_commit(&self, repo: &RepoRef, sha: &str) -> ApiResult<GitCommit> {
        let url = self.repo_url(repo, &format!("/git/commits/{sha}"));
        let resp = self
            .send_expect(ApiRequest::new(Method::Get, &url), &[200])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// List the entries of one directory at a given ref
    ///
    /// A missing directory yields an empty listing, so a first sync
    /// into a not-yet-created sub-path starts from an empty snapshot.
    pub async fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
        reference: &str,
    ) -> ApiResult<Vec<ContentEntry>> {
        let tail = if path.is_empty() {
            format!("/contents?ref={reference}")
        } else {
            format!("/contents/{path}?ref={reference}")
        };
        let url = self.repo_url(repo, &tail);
        let resp = self
            .send_expect(ApiRequest::new(Method::Get, &url), &[200, 404])
            .await?;
        if resp.status == 404 {
            return Ok(Vec::new());
        }
        Self::parse_json(&url, &resp)
    }

    /// Fetch a tree, optionally with recursive enumeration
    pub async fn get_tree(&self, repo: &RepoRef, sha: &str, recursive: bool) -> ApiResult<GitTree> {
        let tail = if recursive {
            format!("/git/trees/{sha}?recursive=1")
        } else {
            format!("/git/trees/{sha}")
        };
        let url = self.repo_url(repo, &tail);
        let resp = self
            .send_expect(ApiRequest::new(Method::Get, &url), &[200])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Create a tree on top of a base tree
    pub async fn create_tree(
        &self,
        repo: &RepoRef,
        rows: &[TreeRow],
        base_tree: &str,
    ) -> ApiResult<CreatedTree> {
        let url = self.repo_url(repo, "/git/trees");
        let body = json!({ "base_tree": base_tree, "tree": rows });
        let resp = self
            .send_expect(ApiRequest::new(Method::Post, &url).with_body(body), &[201])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Create a commit referencing a tree
    pub async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> ApiResult<GitCommit> {
        let url = self.repo_url(repo, "/git/commits");
        let body = json!({ "message": message, "tree": tree, "parents": parents });
        let resp = self
            .send_expect(ApiRequest::new(Method::Post, &url).with_body(body), &[201])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Compare two commits
    pub async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> ApiResult<CommitComparison> {
        let url = self.repo_url(repo, &format!("/compare/{base}...{head}"));
        let resp = self
            .send_expect(ApiRequest::new(Method::Get, &url), &[200])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Probe whether a blob is already stored under a digest
    ///
    /// Only a 404 means "missing"; any other answer counts as present,
    /// since referencing is always cheaper than re-uploading.
    pub async fn blob_exists(&self, repo: &RepoRef, sha: &str) -> ApiResult<bool> {
        let url = self.repo_url(repo, &format!("/git/blobs/{sha}"));
        let resp = self.dispatch(ApiRequest::new(Method::Get, &url)).await?;
        Ok(resp.status != 404)
    }

    /// Upload a blob, base64-encoded
    pub async fn create_blob(&self, repo: &RepoRef, bytes: &[u8]) -> ApiResult<CreatedBlob> {
        let url = self.repo_url(repo, "/git/blobs");
        let body = json!({ "content": BASE64.encode(bytes), "encoding": "base64" });
        let resp = self
            .send_expect(ApiRequest::new(Method::Post, &url).with_body(body), &[201])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Create a branch ref pointing at a commit
    pub async fn create_ref(&self, repo: &RepoRef, branch: &str, sha: &str) -> ApiResult<()> {
        let url = self.repo_url(repo, "/git/refs");
        let body = json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
        self.send_expect(ApiRequest::new(Method::Post, &url).with_body(body), &[201])
            .await?;
        Ok(())
    }

    /// Fast-forward a branch ref to a commit
    ///
    /// `force` stays off; the remote rejects non-fast-forward moves.
    pub async fn update_ref(&self, repo: &RepoRef, branch: &str, sha: &str) -> ApiResult<()> {
        let url = self.repo_url(repo, &format!("/git/refs/heads/{branch}"));
        let body = json!({ "sha": sha, "force": false });
        self.send_expect(ApiRequest::new(Method::Patch, &url).with_body(body), &[200])
            .await?;
        Ok(())
    }

    /// Delete a branch ref; deleting an absent ref is a no-op
    pub async fn delete_ref(&self, repo: &RepoRef, branch: &str) -> ApiResult<()> {
        let url = self.repo_url(repo, &format!("/git/refs/heads/{branch}"));
        self.send_expect(ApiRequest::new(Method::Delete, &url), &[204, 404])
            .await?;
        Ok(())
    }

    /// Open a pull request
    pub async fn create_pull_request(
        &self,
        repo: &RepoRef,
        params: &NewPullRequest,
    ) -> ApiResult<PullRequest> {
        let url = self.repo_url(repo, "/pulls");
        let body = json!(params);
        let resp = self
            .send_expect(ApiRequest::new(Method::Post, &url).with_body(body), &[201])
            .await?;
        Self::parse_json(&url, &resp)
    }

    /// Patch labels/assignees/milestone on the issue behind a PR
    pub async fn update_issue(
        &self,
        repo: &RepoRef,
        number: u64,
        patch: &IssuePatch,
    ) -> ApiResult<()> {
        let url = self.repo_url(repo, &format!("/issues/{number}"));
        self.send_expect(
            ApiRequest::new(Method::Patch, &url).with_body(json!(patch)),
            &[200],
        )
        .await?;
        Ok(())
    }

    /// Request reviewers and team reviewers on a PR
    pub async fn request_reviewers(
        &self,
        repo: &RepoRef,
        number: u64,
        reviewers: &ReviewerRequest,
    ) -> ApiResult<()> {
        let url = self.repo_url(repo, &format!("/pulls/{number}/requested_reviewers"));
        self.send_expect(
            ApiRequest::new(Method::Post, &url).with_body(json!(reviewers)),
            &[200, 201],
        )
        .await?;
        Ok(())
    }

    /// Fetch a PR's mergeability state, conditionally via ETag
    pub async fn get_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
        etag: Option<&str>,
    ) -> ApiResult<Conditional<PullRequest>> {
        let url = self.repo_url(repo, &format!("/pulls/{number}"));
        self.conditional_get(&url, etag).await
    }

    /// List the check runs attached to a commit, conditionally via ETag
    pub async fn list_check_runs(
        &self,
        repo: &RepoRef,
        sha: &str,
        etag: Option<&str>,
    ) -> ApiResult<Conditional<CheckRunList>> {
        let url = self.repo_url(repo, &format!("/commits/{sha}/check-runs"));
        self.conditional_get(&url, etag).await
    }

    async fn conditional_get<T: DeserializeOwned>(
        &self,
        url: &str,
        etag: Option<&str>,
    ) -> ApiResult<Conditional<T>> {
        let mut request = ApiRequest::new(Method::Get, url);
        if let Some(token) = etag {
            request = request.with_header("if-none-match", token);
        }
        let response = self.dispatch(request).await?;
        match response.status {
            304 => Ok(Conditional {
                value: None,
                etag: etag.map(str::to_string),
            }),
            200 => Ok(Conditional {
                value: Some(Self::parse_json(url, &response)?),
                etag: response.header("etag").map(str::to_string),
            }),
            status => Err(ApiError::request_failed(
                "GET",
                url,
                status,
                response.body,
            )),
        }
    }

    /// Squash-merge a pull request
    pub async fn merge_pull_request(&self, repo: &RepoRef, number: u64) -> ApiResult<MergeResult> {
        let url = self.repo_url(repo, &format!("/pulls/{number}/merge"));
        let body = json!({ "merge_method": "squash" });
        let resp = self
            .send_expect(ApiRequest::new(Method::Put, &url).with_body(body), &[200])
            .await?;
        Self::parse_json(&url, &resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::json;

    fn repo() -> RepoRef {
        RepoRef::new("octo", "demo")
    }

    #[tokio::test]
    async fn test_missing_token_is_fatal() {
        let mock = Arc::new(MockTransport::new());
        let api = GithubApi::new(mock, "");

        let err = api.get_branch_ref(&repo(), "main").await.unwrap_err();
        assert!(err.is_auth_missing());
    }

    #[tokio::test]
    async fn test_bearer_and_accept_headers_attached() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(
            Method::Get,
            "/git/ref/heads/main",
            ApiResponse::json(200, json!({"ref": "refs/heads/main",
                "object": {"sha": "abc", "type": "commit"}})),
        )
        .await;
        let api = GithubApi::new(Arc::clone(&mock) as Arc<dyn Transport>, "tok");

        let git_ref = api.get_branch_ref(&repo(), "main").await.unwrap();
        assert_eq!(git_ref.object.sha, "abc");

        let sent = mock.requests().await;
        assert_eq!(sent[0].header("authorization"), Some("Bearer tok"));
        assert_eq!(sent[0].header("accept"), Some("application/vnd.github+json"));
    }

    #[tokio::test]
    async fn test_rate_limit_capture() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(
            Method::Get,
            "/git/blobs/",
            ApiResponse::empty(200)
                .with_header("x-ratelimit-remaining", "4991")
                .with_header("retry-after", "30"),
        )
        .await;
        let api = GithubApi::new(mock, "tok");

        assert_eq!(api.rate_limit(), RateLimitSnapshot::default());
        assert!(api.blob_exists(&repo(), "d1").await.unwrap());
        let snapshot = api.rate_limit();
        assert_eq!(snapshot.remaining, Some(4991));
        assert_eq!(snapshot.retry_after_secs, Some(30));
    }

    #[tokio::test]
    async fn test_blob_exists_only_404_is_missing() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(Method::Get, "/git/blobs/gone", ApiResponse::empty(404))
            .await;
        mock.enqueue(Method::Get, "/git/blobs/odd", ApiResponse::empty(500))
            .await;
        let api = GithubApi::new(mock, "tok");

        assert!(!api.blob_exists(&repo(), "gone").await.unwrap());
        assert!(api.blob_exists(&repo(), "odd").await.unwrap());
    }

    #[tokio::test]
    async fn test_unexpected_status_surfaces_body() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(
            Method::Post,
            "/git/trees",
            ApiResponse::json(422, json!({"message": "tree.sha invalid"})),
        )
        .await;
        let api = GithubApi::new(mock, "tok");

        let err = api
            .create_tree(&repo(), &[TreeRow::content("a", "x")], "base")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert!(err.to_string().contains("tree.sha invalid"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_unexpected_content_type() {
        let mock = Arc::new(MockTransport::new());
        let mut resp = ApiResponse::empty(200);
        resp.body = "<html>maintenance</html>".to_string();
        mock.enqueue(Method::Get, "/git/commits/abc", resp).await;
        let api = GithubApi::new(mock, "tok");

        let err = api.get_commit(&repo(), "abc").await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedContentType { .. }));
        assert!(err.to_string().contains("maintenance"));
    }

    #[tokio::test]
    async fn test_conditional_get_304_keeps_etag() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(
            Method::Get,
            "/pulls/7",
            ApiResponse::json(
                200,
                json!({"number": 7, "html_url": "https://x/pull/7",
                    "mergeable": true, "mergeable_state": "clean"}),
            )
            .with_header("etag", "\"v1\""),
        )
        .await;
        mock.enqueue(Method::Get, "/pulls/7", ApiResponse::empty(304))
            .await;
        let api = GithubApi::new(Arc::clone(&mock) as Arc<dyn Transport>, "tok");

        let first = api.get_pull_request(&repo(), 7, None).await.unwrap();
        assert_eq!(first.etag.as_deref(), Some("\"v1\""));
        assert_eq!(first.value.unwrap().number, 7);

        let second = api
            .get_pull_request(&repo(), 7, first.etag.as_deref())
            .await
            .unwrap();
        assert!(second.value.is_none());
        assert_eq!(second.etag.as_deref(), Some("\"v1\""));

        let sent = mock.requests().await;
        assert_eq!(sent[1].header("if-none-match"), Some("\"v1\""));
    }

    #[tokio::test]
    async fn test_delete_ref_absent_is_noop() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(Method::Delete, "/git/refs/heads/gone", ApiResponse::empty(404))
            .await;
        let api = GithubApi::new(mock, "tok");

        api.delete_ref(&repo(), "gone").await.unwrap();
    }
}
