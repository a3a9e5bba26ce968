//! This module provides a deterministic `HashMap` variant. The hashing data
//! structures in the standard library are randomly seeded, which would make
//! iteration order, and therefore anything derived from it, vary from run to run.
//!
//! The `hash_str` free function is used to derive per-stream seed offsets in
//! `crate::random`.

use xxhash_rust::xxh3::xxh3_64;

pub use rustc_hash::FxHashMap as HashMap;

/// A convenience method to compute the hash of a `&str`. Stable across runs and platforms.
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_strings() {
        let a = hash_str("hello");
        let b = hash_str("hello");
        let c = hash_str("world");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_map_iteration_is_repeatable() {
        let build = || {
            let mut map = HashMap::default();
            for i in 0..100u32 {
                map.insert(i, i * 2);
            }
            map.into_iter().collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
