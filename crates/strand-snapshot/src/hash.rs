//! Order-independent hashing of marker state.
//!
//! Uses FNV-1a per record and a wrapping sum across records, so the hash
//! does not depend on which subdomain (or slot) holds each marker. These
//! hashes are not cryptographically secure; they are a fast equality
//! check ahead of [`compare_snapshots`](crate::compare_snapshots).

use crate::types::MarkerRecord;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline]
fn fnv1a_vec3(mut hash: u64, v: [f64; 3]) -> u64 {
    for c in v {
        hash = fnv1a_bytes(hash, &c.to_bits().to_le_bytes());
    }
    hash
}

/// FNV-1a hash of one record's bit pattern.
pub fn record_hash(rec: &MarkerRecord) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_bytes(hash, &rec.id.to_le_bytes());
    hash = fnv1a_bytes(hash, &rec.filament.to_le_bytes());
    hash = fnv1a_bytes(hash, &rec.sequence_index.to_le_bytes());
    hash = fnv1a_vec3(hash, rec.position);
    hash = fnv1a_vec3(hash, rec.velocity);
    fnv1a_vec3(hash, rec.force)
}

/// Wrapping sum of [`record_hash`] over `records`.
///
/// Returns `0` for an empty set.
pub fn snapshot_hash<'a>(records: impl IntoIterator<Item = &'a MarkerRecord>) -> u64 {
    records
        .into_iter()
        .fold(0u64, |acc, r| acc.wrapping_add(record_hash(r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rec(id: u64, x: f64) -> MarkerRecord {
        MarkerRecord {
            id,
            filament: 0,
            sequence_index: id as u32,
            position: [x, 0.5, 0.5],
            velocity: [0.0; 3],
            force: [0.0; 3],
        }
    }

    #[test]
    fn different_data_different_hash() {
        assert_ne!(record_hash(&rec(0, 0.25)), record_hash(&rec(0, 0.2500000001)));
        assert_ne!(record_hash(&rec(0, 0.25)), record_hash(&rec(1, 0.25)));
    }

    #[test]
    fn signed_zero_is_distinguished() {
        assert_ne!(record_hash(&rec(0, 0.0)), record_hash(&rec(0, -0.0)));
    }

    #[test]
    fn empty_set_hashes_to_zero() {
        assert_eq!(snapshot_hash(std::iter::empty()), 0);
    }

    proptest! {
        #[test]
        fn hash_ignores_record_order(xs in proptest::collection::vec(0.0f64..1.0, 1..16), rot in 0usize..16) {
            let records: Vec<_> = xs.iter().enumerate().map(|(i, &x)| rec(i as u64, x)).collect();
            let mut shuffled = records.clone();
            shuffled.rotate_left(rot % records.len());
            shuffled.reverse();
            prop_assert_eq!(snapshot_hash(&records), snapshot_hash(&shuffled));
        }
    }
}
