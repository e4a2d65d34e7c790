//! Snapshot reader.
//!
//! [`SnapshotReader`] reads records from any `Read` source. The header
//! is validated on construction.

use std::io::Read;

use crate::codec::{decode_header, decode_record};
use crate::error::SnapshotError;
use crate::types::{MarkerRecord, Snapshot, SnapshotHeader};

/// Reads a snapshot from a byte stream.
pub struct SnapshotReader<R: Read> {
    reader: R,
    header: SnapshotHeader,
    records_read: u64,
}

impl<R: Read> SnapshotReader<R> {
    /// Open a snapshot stream, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, SnapshotError> {
        let header = decode_header(&mut reader)?;
        Ok(Self {
            reader,
            header,
            records_read: 0,
        })
    }

    /// Header of the snapshot.
    pub fn header(&self) -> &SnapshotHeader {
        &self.header
    }

    /// Read the next record, or `None` if the stream is exhausted.
    pub fn next_record(&mut self) -> Result<Option<MarkerRecord>, SnapshotError> {
        let rec = decode_record(&mut self.reader)?;
        if rec.is_some() {
            self.records_read += 1;
        }
        Ok(rec)
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Convert into a record iterator.
    pub fn records(self) -> RecordIter<R> {
        RecordIter {
            reader: self.reader,
            done: false,
        }
    }

    /// Read every remaining record, checking the total against the
    /// header's marker count.
    pub fn read_all(mut self) -> Result<Snapshot, SnapshotError> {
        let mut records = Vec::with_capacity(self.header.marker_count as usize);
        while let Some(rec) = self.next_record()? {
            records.push(rec);
        }
        if self.records_read != self.header.marker_count {
            return Err(SnapshotError::CountMismatch {
                expected: self.header.marker_count,
                found: self.records_read,
            });
        }
        Ok(Snapshot {
            header: self.header,
            records,
        })
    }
}

/// Iterator adapter over snapshot records.
pub struct RecordIter<R: Read> {
    reader: R,
    done: bool,
}

impl<R: Read> Iterator for RecordIter<R> {
    type Item = Result<MarkerRecord, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_record(&mut self.reader) {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read a complete snapshot from `r`.
pub fn read_snapshot<R: Read>(r: R) -> Result<Snapshot, SnapshotError> {
    SnapshotReader::open(r)?.read_all()
}
