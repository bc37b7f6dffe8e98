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

//! Content-addressed blob identifiers
//!
//! The remote stores blobs under the git blob object id: the SHA-1 of
//! `"blob {len}\0"` followed by the content bytes, hex-encoded.
//! Computing the same digest locally lets the sync reference existing
//! remote content without fetching or re-uploading it.

use sha1::{Digest, Sha1};

/// Compute the digest a blob with these bytes is stored under
pub fn blob_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", bytes.len()).as_bytes());
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values from `git hash-object`.
    #[test]
    fn test_known_vectors() {
        assert_eq!(
            blob_digest(b""),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
        assert_eq!(
            blob_digest(b"hello\n"),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn test_stable_across_calls() {
        let a = blob_digest(b"content");
        let b = blob_digest(b"content");
        assert_eq!(a, b);
    }

    #[test]
    fn test_any_byte_change_alters_digest() {
        assert_ne!(blob_digest(b"content"), blob_digest(b"Content"));
        assert_ne!(blob_digest(b"content"), blob_digest(b"content "));
    }

    #[test]
    fn test_length_is_part_of_the_preimage() {
        // Same prefix, different length: header must differ.
        assert_ne!(blob_digest(b"ab"), blob_digest(b"a"));
    }
}
