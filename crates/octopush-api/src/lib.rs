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

//! GitHub REST transport layer for octopush
//!
//! Splits remote access into two seams:
//!
//! - [`Transport`]: one request/response exchange. The production
//!   implementation ([`HttpTransport`]) retries transient failures
//!   with exponential backoff; [`mock::MockTransport`] replays
//!   scripted responses for tests.
//! - [`GithubApi`]: typed wrappers for every consumed endpoint, with
//!   bearer-credential injection, rate-limit telemetry capture, and
//!   ETag-conditional reads.
//!
//! # Examples
//!
//! ```no_run
//! use octopush_api::{GithubApi, HttpTransport, RepoRef};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), octopush_api::ApiError> {
//! let api = GithubApi::new(Arc::new(HttpTransport::new()), "ghp_token");
//! let repo = RepoRef::new("octo", "demo");
//!
//! let head = api.get_branch_ref(&repo, "main").await?;
//! println!("main is at {}", head.object.sha);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod http;
pub mod mock;
mod transport;
mod types;

pub use client::{Conditional, GithubApi, RateLimitSnapshot};
pub use error::{ApiError, ApiResult};
pub use http::{HttpConfig, HttpTransport};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
pub use types::{
    CheckRun, CheckRunList, CommitComparison, ComparedFile, ContentEntry, CreatedBlob,
    CreatedTree, GitCommit, GitObject, GitRef, GitTree, GitTreeEntry, IssuePatch, MergeResult,
    MergeableState, NewPullRequest, PullRequest, RepoRef, ReviewerRequest, TreeId, TreeRow,
};
