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

//! Minimal delta between the stage and the remote snapshot
//!
//! Runs after blob promotion: an entry that still carries inline
//! content becomes a content row, an entry holding a buffer becomes a
//! digest reference row. A path whose staged digest matches the remote
//! digest is dropped entirely. Row order is stage insertion order
//! followed by deletion rows in remote enumeration order; the order has
//! no remote-side meaning but is stable for deterministic testing.

use crate::snapshot::RemoteSnapshot;
use crate::stage::FileStage;
use octopush_api::TreeRow;
use tracing::debug;

/// Compute the tree-row mutations moving the snapshot to the staged
/// state
pub fn compute_delta(
    stage: &FileStage,
    snapshot: &RemoteSnapshot,
    delete_other_files: bool,
) -> Vec<TreeRow> {
    let mut rows = Vec::new();

    for (path, entry) in stage.files() {
        if snapshot.sha_for(path) == Some(entry.digest()) {
            continue;
        }
        let row = match entry.content() {
            Some(text) => TreeRow::content(path, text),
            None => TreeRow::reference(path, entry.digest()),
        };
        rows.push(row);
    }

    if delete_other_files {
        for path in snapshot.paths() {
            if !stage.contains(path) && !stage.is_ignored(path) {
                rows.push(TreeRow::deletion(path));
            }
        }
    }

    debug!(rows = rows.len(), "delta computed");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::blob_digest;
    use octopush_api::GitTreeEntry;

    fn snapshot_of(entries: &[(&str, &str)]) -> RemoteSnapshot {
        let entries: Vec<GitTreeEntry> = entries
            .iter()
            .map(|(path, sha)| {
                serde_json::from_value(serde_json::json!({
                    "path": path, "type": "blob", "sha": sha, "mode": "100644"
                }))
                .unwrap()
            })
            .collect();
        RemoteSnapshot::from_entries(&entries, "")
    }

    #[test]
    fn test_unchanged_path_emits_nothing() {
        let mut stage = FileStage::new();
        stage.add("a.txt", "same");
        let digest = blob_digest(b"same");
        let snapshot = snapshot_of(&[("a.txt", digest.as_str())]);

        let rows = compute_delta(&stage, &snapshot, false);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_new_and_changed_paths_emit_rows() {
        let mut stage = FileStage::new();
        stage.add("a.txt", "new content");
        stage.add("b.txt", "brand new");
        let snapshot = snapshot_of(&[("a.txt", "stale-digest")]);

        let rows = compute_delta(&stage, &snapshot, false);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].path, "a.txt");
        assert!(rows[0].is_content());
        assert_eq!(rows[1].path, "b.txt");
    }

    #[test]
    fn test_buffer_entry_becomes_reference_row() {
        let mut stage = FileStage::new();
        stage.add_bytes("img.png", vec![1, 2, 3]);
        let digest = blob_digest(&[1, 2, 3]);

        let rows = compute_delta(&stage, &RemoteSnapshot::empty(), false);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_reference());
        assert_eq!(rows[0].sha, Some(Some(digest)));
    }

    #[test]
    fn test_delete_other_files_sweep() {
        let mut stage = FileStage::new();
        stage.add("keep.txt", "x");
        stage.ignore("vendored.txt");
        let keep = blob_digest(b"x");
        let snapshot = snapshot_of(&[
            ("keep.txt", keep.as_str()),
            ("vendored.txt", "d8"),
            ("stale.txt", "d9"),
        ]);

        let rows = compute_delta(&stage, &snapshot, true);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_deletion());
        assert_eq!(rows[0].path, "stale.txt");
    }

    #[test]
    fn test_sweep_disabled_leaves_stale_paths() {
        let stage = FileStage::new();
        let snapshot = snapshot_of(&[("stale.txt", "d9")]);

        let rows = compute_delta(&stage, &snapshot, false);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rename_pair() {
        // Path A removed, path B added with A's former digest: one
        // deletion row plus one reference row against the same digest.
        let mut stage = FileStage::new();
        stage.add_bytes("renamed.txt", b"payload".to_vec());
        let digest = blob_digest(b"payload");
        let snapshot = snapshot_of(&[("original.txt", digest.as_str())]);

        let rows = compute_delta(&stage, &snapshot, true);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].path, "renamed.txt");
        assert_eq!(rows[0].sha, Some(Some(digest)));
        assert_eq!(rows[1].path, "original.txt");
        assert!(rows[1].is_deletion());
    }

    #[test]
    fn test_row_order_is_stage_order_then_deletions() {
        let mut stage = FileStage::new();
        stage.add("z.txt", "1");
        stage.add("a.txt", "2");
        let snapshot = snapshot_of(&[("gone1.txt", "d1"), ("gone2.txt", "d2")]);

        let rows = compute_delta(&stage, &snapshot, true);
        let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["z.txt", "a.txt", "gone1.txt", "gone2.txt"]);
    }
}
