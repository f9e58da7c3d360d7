//! Content hashing for fragment dedupe: 32-bit FNV-1a, composed into a
//! 64-bit key. Not cryptographic; collisions only cost a skipped delivery
//! and are accepted for dedupe purposes.

use std::fmt;

/// 64-bit content key for a CSS fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentHash(pub u64);

impl fmt::Display for FragmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// 32-bit FNV-1a over `bytes`.
pub fn fnv32a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Key a fragment by two composed FNV-1a rounds: the second round hashes the
/// first result (8 lowercase hex chars) prepended to the text, and the two
/// 32-bit values concatenate into the 64-bit key.
pub fn fragment_hash(text: &str) -> FragmentHash {
    let hash1 = fnv32a(text.as_bytes());
    let mut seeded = format!("{hash1:08x}");
    seeded.push_str(text);
    let hash2 = fnv32a(seeded.as_bytes());
    FragmentHash((u64::from(hash1) << 32) | u64::from(hash2))
}
