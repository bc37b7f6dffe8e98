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

//! Atomic multi-file commits against GitHub repositories
//!
//! Stage any number of files in memory, then publish them as exactly
//! one commit: unchanged paths are skipped, duplicated and oversized
//! content is stored as deduplicated blobs, and the result either
//! fast-forwards the base branch or flows through a pull request with
//! optional automatic merge.
//!
//! ```no_run
//! use octopush_api::{GithubApi, HttpTransport, RepoRef};
//! use octopush_core::{PushConfig, RepoSync};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), octopush_core::SyncError> {
//! let api = GithubApi::new(Arc::new(HttpTransport::new()), "ghp_token");
//! let mut sync = RepoSync::new(api, RepoRef::new("octo", "demo"), PushConfig::new("main"));
//!
//! sync.add("docs/index.md", "# Hello\n");
//! sync.add_bytes("docs/logo.png", vec![0x89, 0x50, 0x4e, 0x47]);
//! let stats = sync.push().await?;
//! println!("outcome: {:?}", stats.outcome);
//! # Ok(())
//! # }
//! ```

mod blobs;
mod commit;
mod compare;
mod config;
mod delta;
mod digest;
mod error;
mod merge;
mod push;
mod snapshot;
mod stage;
mod stats;

pub use blobs::BlobSyncReport;
pub use commit::{BuiltCommit, CommitBuilder, DEFAULT_PAYLOAD_CEILING};
pub use config::{
    PullRequestOptions, PushConfig, DEFAULT_COMMIT_MESSAGE, DEFAULT_PR_TITLE,
};
pub use digest::blob_digest;
pub use error::{SyncError, SyncResult};
pub use push::RepoSync;
pub use stage::{FileEntry, FileStage};
pub use stats::{PushOutcome, RunStats};
