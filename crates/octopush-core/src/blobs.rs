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

//! Blob promotion and upload
//!
//! Decides, per staged entry, whether it rides inline in a tree row or
//! is stored as a separate blob, then probes and uploads the blob set
//! concurrently. A digest already in the known set is promoted to a
//! pure reference with no remote traffic at all. Digests are inserted
//! into the known set when their probe is issued, so two staged copies
//! of the same content produce one probe and at most one upload.

use crate::error::SyncResult;
use crate::stage::FileStage;
use futures::future::join_all;
use octopush_api::{GithubApi, RepoRef};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// What the blob pass did
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BlobSyncReport {
    /// Entries moved from inline content to buffer form
    pub promotions: usize,
    /// Blobs uploaded after an absent probe
    pub uploaded: usize,
}

/// Promote oversized and duplicated entries, then probe and upload
///
/// Entries staged as raw bytes always take the blob path. Text entries
/// are promoted when they exceed `threshold` bytes or when the same
/// digest is staged at two or more paths. Uploads run concurrently;
/// when one fails the rest are still awaited before the error returns.
pub async fn sync_blobs(
    api: &GithubApi,
    repo: &RepoRef,
    stage: &mut FileStage,
    threshold: usize,
    known: &mut HashSet<String>,
) -> SyncResult<BlobSyncReport> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for (_, entry) in stage.files() {
        *occurrences.entry(entry.digest().to_string()).or_insert(0) += 1;
    }

    let mut report = BlobSyncReport::default();
    let mut to_upload: Vec<String> = Vec::new();

    for path in stage.paths() {
        let Some(entry) = stage.file_mut(&path) else {
            continue;
        };
        let digest = entry.digest().to_string();

        if known.contains(&digest) {
            // Stored remotely (or already queued): reference it, never
            // re-send the bytes.
            if entry.promote() {
                report.promotions += 1;
            }
            continue;
        }

        let duplicated = occurrences.get(&digest).copied().unwrap_or(0) >= 2;
        let needs_blob =
            entry.buffer().is_some() || entry.byte_len() > threshold || duplicated;
        if !needs_blob {
            continue;
        }

        if entry.promote() {
            report.promotions += 1;
        }
        known.insert(digest);
        to_upload.push(path);
    }

    if to_upload.is_empty() {
        return Ok(report);
    }

    let probes = to_upload.iter().map(|path| {
        let entry = stage.file(path);
        async move {
            // Paths in to_upload were just promoted, the buffer is set.
            let Some(bytes) = entry.and_then(|e| e.buffer()) else {
                return Ok(false);
            };
            let digest = entry.map(|e| e.digest()).unwrap_or_default();
            if api.blob_exists(repo, digest).await? {
                debug!(digest, "blob already stored");
                Ok(false)
            } else {
                api.create_blob(repo, bytes).await?;
                debug!(digest, bytes = bytes.len(), "blob uploaded");
                Ok(true)
            }
        }
    });

    let mut first_error = None;
    for outcome in join_all(probes).await {
        match outcome {
            Ok(true) => report.uploaded += 1,
            Ok(false) => {}
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    debug!(
        promotions = report.promotions,
        uploaded = report.uploaded,
        "blob pass complete"
    );
    Ok(report)
}
