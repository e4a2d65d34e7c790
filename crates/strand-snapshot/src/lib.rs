//! Restart snapshots of Strand marker state.
//!
//! Writes and reads the per-marker record stream needed to resume a run,
//! and verifies that two runs agree.
//!
//! # Architecture
//!
//! - [`SnapshotWriter`] streams records to any `Write` sink
//! - [`SnapshotReader`] reads them back from any `Read` source
//! - [`snapshot_hash`] and [`compare_snapshots`] check restart fidelity
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "STRD"] [VERSION u8] [step u64] [time f64] [marker_count u64]
//! [MarkerRecord 1] [MarkerRecord 2] ... [MarkerRecord N]
//! ```
//!
//! Every record is [`RECORD_SIZE`] bytes, little-endian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod hash;
pub mod reader;
pub mod types;
pub mod writer;

pub use compare::{compare_snapshots, DivergenceKind, DivergenceReport, MarkerDivergence};
pub use error::SnapshotError;
pub use hash::{record_hash, snapshot_hash};
pub use reader::{read_snapshot, RecordIter, SnapshotReader};
pub use types::{MarkerRecord, Snapshot, SnapshotHeader, RECORD_SIZE};
pub use writer::{write_snapshot, SnapshotWriter};

/// Magic bytes at the start of every snapshot.
pub const MAGIC: [u8; 4] = *b"STRD";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
