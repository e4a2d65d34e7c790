//! Binary encode/decode for the snapshot format.
//!
//! All values are little-endian with no padding. Records have a fixed
//! size, so a snapshot of `N` markers is exactly
//! `HEADER_SIZE + N * RECORD_SIZE` bytes.

use std::io::{Read, Write};

use crate::error::SnapshotError;
use crate::types::{MarkerRecord, SnapshotHeader, RECORD_SIZE};
use crate::{FORMAT_VERSION, MAGIC};

/// Encoded size of the magic, version and header.
pub const HEADER_SIZE: usize = 4 + 1 + 8 + 8 + 8;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), SnapshotError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write three little-endian f64s.
pub fn write_vec3_le(w: &mut dyn Write, v: [f64; 3]) -> Result<(), SnapshotError> {
    for c in v {
        write_f64_le(w, c)?;
    }
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, SnapshotError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, SnapshotError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, SnapshotError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode magic, version and header.
pub fn encode_header(w: &mut dyn Write, header: &SnapshotHeader) -> Result<(), SnapshotError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u64_le(w, header.step)?;
    write_f64_le(w, header.time)?;
    write_u64_le(w, header.marker_count)?;
    Ok(())
}

/// Decode and validate magic, version and header.
pub fn decode_header(r: &mut dyn Read) -> Result<SnapshotHeader, SnapshotError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(SnapshotError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion { found: version });
    }

    Ok(SnapshotHeader {
        step: read_u64_le(r)?,
        time: read_f64_le(r)?,
        marker_count: read_u64_le(r)?,
    })
}

// ── Record encode/decode ────────────────────────────────────────

/// Encode one marker record.
pub fn encode_record(w: &mut dyn Write, rec: &MarkerRecord) -> Result<(), SnapshotError> {
    write_u64_le(w, rec.id)?;
    write_u32_le(w, rec.filament)?;
    write_u32_le(w, rec.sequence_index)?;
    write_vec3_le(w, rec.position)?;
    write_vec3_le(w, rec.velocity)?;
    write_vec3_le(w, rec.force)?;
    Ok(())
}

/// Decode one marker record.
///
/// Returns `Ok(None)` on clean EOF (no bytes available), `Ok(Some(rec))`
/// on success, or an error if the stream ends partway through a record.
pub fn decode_record(r: &mut dyn Read) -> Result<Option<MarkerRecord>, SnapshotError> {
    let mut buf = [0u8; RECORD_SIZE];
    let mut filled = 0;
    while filled < RECORD_SIZE {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(SnapshotError::MalformedRecord {
                    detail: format!("truncated record: got {filled} of {RECORD_SIZE} bytes"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SnapshotError::Io(e)),
        }
    }

    let mut fields = Fields { buf: &buf, at: 0 };
    Ok(Some(MarkerRecord {
        id: u64::from_le_bytes(fields.take()),
        filament: u32::from_le_bytes(fields.take()),
        sequence_index: u32::from_le_bytes(fields.take()),
        position: fields.vec3(),
        velocity: fields.vec3(),
        force: fields.vec3(),
    }))
}

/// Cursor over a complete record buffer.
struct Fields<'a> {
    buf: &'a [u8; RECORD_SIZE],
    at: usize,
}

impl Fields<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.at..self.at + N]);
        self.at += N;
        out
    }

    fn vec3(&mut self) -> [f64; 3] {
        [(); 3].map(|_| f64::from_le_bytes(self.take()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MarkerRecord {
        MarkerRecord {
            id: 42,
            filament: 3,
            sequence_index: 5,
            position: [0.1, 0.2, 0.3],
            velocity: [-1.0, 0.0, 1.0],
            force: [1e4, -2.5e-7, f64::MIN_POSITIVE],
        }
    }

    #[test]
    fn header_roundtrip() {
        let h = SnapshotHeader {
            step: 12,
            time: 1.2e-3,
            marker_count: 8,
        };
        let mut buf = Vec::new();
        encode_header(&mut buf, &h).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(decode_header(&mut buf.as_slice()).unwrap(), h);
    }

    #[test]
    fn record_roundtrip_is_bit_exact() {
        let mut buf = Vec::new();
        encode_record(&mut buf, &record()).unwrap();
        assert_eq!(buf.len(), RECORD_SIZE);
        let back = decode_record(&mut buf.as_slice()).unwrap().unwrap();
        assert_eq!(back, record());
        assert_eq!(back.force[2].to_bits(), f64::MIN_POSITIVE.to_bits());
    }

    #[test]
    fn clean_eof_is_none() {
        let empty: &[u8] = &[];
        assert!(decode_record(&mut &*empty).unwrap().is_none());
    }

    #[test]
    fn partial_record_is_malformed() {
        let mut buf = Vec::new();
        encode_record(&mut buf, &record()).unwrap();
        buf.truncate(RECORD_SIZE - 1);
        match decode_record(&mut buf.as_slice()) {
            Err(SnapshotError::MalformedRecord { detail }) => {
                assert!(detail.contains("87 of 88"), "{detail}")
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        buf.push(FORMAT_VERSION + 1);
        buf.extend_from_slice(&[0u8; 24]);
        match decode_header(&mut buf.as_slice()) {
            Err(SnapshotError::UnsupportedVersion { found }) => {
                assert_eq!(found, FORMAT_VERSION + 1)
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }
}
