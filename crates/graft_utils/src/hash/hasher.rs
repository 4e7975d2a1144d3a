//! The default hash state of the `graft` containers: `foldhash` with a
//! fixed seed, so hashes only depend on the input and never on process
//! randomness.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const GRAFT_HASH_SEED: FixedState = FixedState::with_seed(0x6A09E667F3BCC908);

/// The hasher built by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Deterministic hash state based on `foldhash` and a fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use graft_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("graft");
/// let b = FixedHashState.hash_one("graft");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        GRAFT_HASH_SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::hash::BuildHasher;

    use super::FixedHashState;

    #[test]
    fn fixed_state_is_stable() {
        assert_eq!(FixedHashState.hash_one(42_u32), FixedHashState.hash_one(42_u32));
        assert_ne!(FixedHashState.hash_one(1_u32), FixedHashState.hash_one(2_u32));
    }
}
