//! Error types for snapshot I/O.

use std::fmt;
use std::io;

/// Errors that can occur while writing, reading or rebuilding a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with the expected `b"STRD"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// A record could not be decoded (truncated or corrupt data).
    MalformedRecord {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The number of records disagrees with the header.
    CountMismatch {
        /// Count announced in the header.
        expected: u64,
        /// Records actually written or read.
        found: u64,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"STRD\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedRecord { detail } => write!(f, "malformed record: {detail}"),
            Self::CountMismatch { expected, found } => write!(
                f,
                "header announces {expected} markers but {found} records were present"
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
