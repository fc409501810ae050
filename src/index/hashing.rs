//! Key hashing and head-bucket sharding
//!
//! Shard membership depends only on the key: a key hashes to one head
//! bucket, and the head buckets are split into contiguous ranges.

/// Smear an integer key and keep the low `hash_bits` bits.
pub fn hash_key(key: u64, hash_bits: u32) -> u64 {
    let mut k = key;
    k ^= k >> 4;
    k = (k ^ 0xdead_beef).wrapping_add(k << 5);
    k ^= k >> 11;
    k & ((1u64 << hash_bits) - 1)
}

/// Head-bucket range `[start, end)` of shard `part` out of `total`.
///
/// Range sizes differ by at most one; the first `buckets % total` shards
/// get the extra bucket. When `total` exceeds `buckets` the trailing
/// shards are empty. Caller guarantees `part < total`.
pub fn partition_range(buckets: u64, part: u64, total: u64) -> (u64, u64) {
    let per_part = buckets / total;
    let left_over = buckets % total;
    let start = part * per_part + part.min(left_over);
    let end = start + per_part + u64::from(part < left_over);
    (start, end)
}
