//! xxh3-64 content hashing.

use xxhash_rust::xxh3::xxh3_64;

#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_across_calls() {
        assert_eq!(hash_bytes(b"const x = 1;"), hash_bytes(b"const x = 1;"));
    }

    #[test]
    fn sensitive_to_content() {
        assert_ne!(hash_bytes(b"const x = 1;"), hash_bytes(b"const x = 2;"));
    }
}
