// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validated names for stored files.
//!
//! Uploaded filenames are used directly as storage keys, so every name is
//! normalized to NFC and checked before it is joined onto a directory path.

use std::fmt;

use unicode_normalization::UnicodeNormalization;

use super::{StorageError, StorageResult};

/// Longest accepted name, in bytes (common filesystem component limit).
pub const MAX_NAME_LEN: usize = 255;

/// A file name that is safe to use as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileName(String);

impl FileName {
    /// Normalize and validate a raw name.
    ///
    /// # Errors
    /// Returns `StorageError::InvalidName` for empty names, `.`/`..`, names
    /// containing path separators or control characters, and names longer
    /// than [`MAX_NAME_LEN`] bytes.
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let name: String = raw.nfc().collect();

        if name.is_empty() {
            return Err(StorageError::InvalidName("name is empty".to_string()));
        }
        if name == "." || name == ".." {
            return Err(StorageError::InvalidName(format!("'{name}' is reserved")));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(StorageError::InvalidName(format!(
                "name is {} bytes, limit is {MAX_NAME_LEN}",
                name.len()
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| *c == '/' || *c == '\\' || c.is_control())
        {
            return Err(StorageError::InvalidName(format!(
                "name contains forbidden character {c:?}"
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for raw in ["report.pdf", "a.txt", ".env", "my file (1).tar.gz", "données.csv"] {
            let name = FileName::parse(raw).unwrap();
            assert_eq!(name.as_str(), raw);
        }
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for raw in ["", ".", "..", "../etc/passwd", "a/b", "dir\\file", "C:\\Users\\x.txt"] {
            assert!(
                matches!(FileName::parse(raw), Err(StorageError::InvalidName(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_control_characters() {
        assert!(FileName::parse("evil\0.txt").is_err());
        assert!(FileName::parse("line\nbreak.txt").is_err());
        assert!(FileName::parse("tab\there").is_err());
    }

    #[test]
    fn rejects_overlong_names() {
        let raw = "x".repeat(MAX_NAME_LEN + 1);
        assert!(FileName::parse(&raw).is_err());
        assert!(FileName::parse(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn normalizes_to_nfc() {
        // "e" + combining acute accent collapses to a single code point.
        let decomposed = "cafe\u{0301}.txt";
        let name = FileName::parse(decomposed).unwrap();
        assert_eq!(name.as_str(), "caf\u{00e9}.txt");
        assert_eq!(name, FileName::parse("caf\u{00e9}.txt").unwrap());
    }
}
