//! Snapshot writer.
//!
//! [`SnapshotWriter`] streams marker records to any `Write` sink. The
//! header is written immediately on construction.

use std::io::Write;

use strand_markers::Marker;

use crate::codec::{encode_header, encode_record};
use crate::error::SnapshotError;
use crate::types::{MarkerRecord, Snapshot, SnapshotHeader};

/// Writes a snapshot to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use strand_snapshot::{MarkerRecord, SnapshotHeader, SnapshotReader, SnapshotWriter};
///
/// let header = SnapshotHeader { step: 3, time: 3.0e-4, marker_count: 1 };
/// let rec = MarkerRecord {
///     id: 0,
///     filament: 0,
///     sequence_index: 0,
///     position: [0.5; 3],
///     velocity: [0.0; 3],
///     force: [0.0; 3],
/// };
///
/// let mut writer = SnapshotWriter::new(Vec::new(), &header).unwrap();
/// writer.write_record(&rec).unwrap();
/// let buf = writer.finish().unwrap();
///
/// let mut reader = SnapshotReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.header(), &header);
/// assert_eq!(reader.next_record().unwrap(), Some(rec));
/// assert!(reader.next_record().unwrap().is_none());
/// ```
pub struct SnapshotWriter<W: Write> {
    writer: W,
    expected: u64,
    records_written: u64,
}

impl<W: Write> SnapshotWriter<W> {
    /// Create a writer, immediately writing the header.
    pub fn new(mut writer: W, header: &SnapshotHeader) -> Result<Self, SnapshotError> {
        encode_header(&mut writer, header)?;
        Ok(Self {
            writer,
            expected: header.marker_count,
            records_written: 0,
        })
    }

    /// Write one record.
    pub fn write_record(&mut self, record: &MarkerRecord) -> Result<(), SnapshotError> {
        encode_record(&mut self.writer, record)?;
        self.records_written += 1;
        Ok(())
    }

    /// Write the persistent state of `marker`.
    pub fn write_marker(&mut self, marker: &Marker) -> Result<(), SnapshotError> {
        self.write_record(&MarkerRecord::from(marker))
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and return the sink, checking the record count against the
    /// header.
    pub fn finish(mut self) -> Result<W, SnapshotError> {
        if self.records_written != self.expected {
            return Err(SnapshotError::CountMismatch {
                expected: self.expected,
                found: self.records_written,
            });
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write a complete snapshot to `w`.
pub fn write_snapshot<W: Write>(w: W, snapshot: &Snapshot) -> Result<W, SnapshotError> {
    let mut writer = SnapshotWriter::new(w, &snapshot.header)?;
    for rec in &snapshot.records {
        writer.write_record(rec)?;
    }
    writer.finish()
}
