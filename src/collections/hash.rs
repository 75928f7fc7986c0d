//! Hashing algorithm.
//!
//! The byte mixing is derived from `rustc-hash`
//! (https://github.com/rust-lang/rustc-hash),
//! licensed under the MIT License.
//! Copyright © the Rust Project Developers.
//!
//! The first word written is taken as is and every later one is mixed in,
//! so a table keyed by a single integer places it at `n mod capacity` while
//! tuples and structs still spread out.

/// A deterministic non-cryptographic hash over the value representation of a key.
/// Two keys that are equal always hash the same, on every run.
pub struct Hasher {
    hash: u64,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct BuildHasher;

/// Reference: [https://github.com/rust-lang/rustc-hash/blob/1a998d5b89b04ba730d4cd249f811e8b48aa7d8c/src/lib.rs#L63C1-L73C37]
const K: u64 = 0xf1357aea2e62a9c5;

const SEEDS: [u64; 2] = [0x243f6a8885a308d3, 0x13198a2e03707344];

const PREVENT_TRIVIAL_ZERO_COLLAPSE: u64 = 0xa4093822299f31d0;

impl Hasher {
    #[inline]
    pub const fn new() -> Self {
        Self { hash: 0 }
    }

    #[inline]
    pub const fn add(&mut self, addition: u64) {
        self.hash = self.hash.wrapping_mul(K) ^ addition;
    }
}

/// Reads up to eight bytes as a little-endian word.
#[inline]
fn word(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);

    u64::from_le_bytes(buf)
}

#[inline]
fn hash(bytes: &[u8]) -> u64 {
    let [mut s0, mut s1] = SEEDS;
    let len = bytes.len();

    if len <= 16 {
        if len >= 8 {
            s0 ^= word(&bytes[0..8]);
            s1 ^= word(&bytes[len - 8..]);
        } else if len >= 4 {
            s0 ^= word(&bytes[0..4]);
            s1 ^= word(&bytes[len - 4..]);
        } else if len > 0 {
            let lo = bytes[0];
            let mid = bytes[len / 2];
            let hi = bytes[len - 1];
            s0 ^= lo as u64;
            s1 ^= ((hi as u64) << 8) | mid as u64;
        }
    } else {
        let mut off = 0;
        while off < len - 16 {
            let x = word(&bytes[off..off + 8]);
            let y = word(&bytes[off + 8..off + 16]);

            let t = multiply(s0 ^ x, PREVENT_TRIVIAL_ZERO_COLLAPSE ^ y);
            s0 = s1;
            s1 = t;
            off += 16;
        }

        let suffix = &bytes[len - 16..];
        s0 ^= word(&suffix[0..8]);
        s1 ^= word(&suffix[8..16]);
    }

    multiply(s0, s1) ^ (len as u64)
}

#[inline]
fn multiply(x: u64, y: u64) -> u64 {
    let full = (x as u128).wrapping_mul(y as u128);
    let lo = full as u64;
    let hi = (full >> 64) as u64;

    lo ^ hi
}

impl std::hash::Hasher for Hasher {
    fn write(&mut self, bytes: &[u8]) {
        self.add(hash(bytes));
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write_u8(&mut self, addition: u8) {
        self.add(addition as u64);
    }

    fn write_u16(&mut self, addition: u16) {
        self.add(addition as u64);
    }

    fn write_u32(&mut self, addition: u32) {
        self.add(addition as u64);
    }

    fn write_u64(&mut self, addition: u64) {
        self.add(addition);
    }

    fn write_u128(&mut self, addition: u128) {
        self.add(addition as u64);
        self.add((addition >> 64) as u64);
    }

    fn write_usize(&mut self, addition: usize) {
        self.add(addition as u64);
    }

    fn write_i8(&mut self, addition: i8) {
        self.add(addition as i64 as u64);
    }

    fn write_i16(&mut self, addition: i16) {
        self.add(addition as i64 as u64);
    }

    fn write_i32(&mut self, addition: i32) {
        self.add(addition as i64 as u64);
    }

    fn write_i64(&mut self, addition: i64) {
        self.add(addition as u64);
    }

    fn write_isize(&mut self, addition: isize) {
        self.add(addition as i64 as u64);
    }
}

impl Default for Hasher {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl std::hash::BuildHasher for BuildHasher {
    type Hasher = Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        Hasher::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasher as _;

    #[test]
    fn integers_hash_to_themselves() {
        let hasher = BuildHasher;

        assert_eq!(hasher.hash_one(1u64), 1);
        assert_eq!(hasher.hash_one(513i32), 513);
        assert_eq!(hasher.hash_one(0usize), 0);
    }

    #[test]
    fn integer_width_does_not_change_the_hash() {
        let hasher = BuildHasher;

        assert_eq!(hasher.hash_one(42u8), hasher.hash_one(42u64));
        assert_eq!(hasher.hash_one(-7i8), hasher.hash_one(-7i64));
    }

    #[test]
    fn strings_are_stable_and_distinct() {
        let hasher = BuildHasher;

        assert_eq!(hasher.hash_one("lettuce"), hasher.hash_one(String::from("lettuce")));
        assert_ne!(hasher.hash_one("a"), hasher.hash_one("b"));
        assert_ne!(hasher.hash_one("bab"), hasher.hash_one("mht"));
    }

    #[test]
    fn composite_keys_do_not_share_hashes() {
        let hasher = BuildHasher;

        assert_ne!(hasher.hash_one((1u64, 0u64)), hasher.hash_one((0u64, 32u64)));

        let mut hashes: Vec<u64> = (0..40u8)
            .flat_map(|a| (0..40u8).map(move |b| (a, b)))
            .map(|key| hasher.hash_one(key))
            .collect();
        hashes.sort_unstable();
        hashes.dedup();

        assert_eq!(hashes.len(), 1600);
    }

    #[test]
    fn long_inputs_cover_every_block() {
        let hasher = BuildHasher;
        let a = "x".repeat(100);
        let mut b = a.clone();
        b.replace_range(40..41, "y");

        assert_ne!(hasher.hash_one(&a), hasher.hash_one(&b));
    }
}
