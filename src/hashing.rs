use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Hashes a stream name to a stable `u64`.
///
/// `FxHasher` is deterministic across runs and platforms, which is what makes
/// name-derived stream seeds reproducible.
pub(crate) fn hash_str(input: &str) -> u64 {
    let mut hasher = FxHasher::default();
    input.hash(&mut hasher);
    hasher.finish()
}
