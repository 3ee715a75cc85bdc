//! Seeded randomness helpers.
//!
//! Every stateful supplier and noise node owns its own generator built here from a
//! combined seed; nothing in the crate touches a shared or thread-local generator.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Combine a node-local seed with the graph seed.
#[inline]
pub fn combined_seed(node_seed: i32, graph_seed: i32) -> i32 {
    node_seed ^ graph_seed
}

/// Build a generator for a (combined) seed.
pub fn rng_for(seed: i32) -> StdRng {
    StdRng::seed_from_u64(seed as u32 as u64)
}

/// Generate a random float in the range [0, 1].
#[inline]
pub(crate) fn rand01(rng: &mut dyn Rng) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Coin flip that passes with probability `chance`. Always consumes one draw so
/// replaying a stream stays aligned regardless of the chances involved.
#[inline]
pub(crate) fn roll(rng: &mut dyn Rng, chance: f32) -> bool {
    let r = rand01(rng);
    chance >= 1.0 || (chance > 0.0 && r < chance)
}

/// Derive a stable per-node seed from a node id.
pub(crate) fn seed_from_index(index: u64) -> i32 {
    // splitmix64 finalizer
    let mut z = index.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl rand::TryRng for FixedRng {
        type Error = core::convert::Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Ok(self.value)
        }

        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Ok(self.value as u64)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
            Ok(())
        }
    }

    #[test]
    fn combined_seed_is_xor() {
        assert_eq!(combined_seed(0b1100, 0b1010), 0b0110);
        assert_eq!(combined_seed(42, 0), 42);
    }

    #[test]
    fn rand01_stays_below_one() {
        let mut rng = FixedRng { value: u32::MAX };
        assert!(rand01(&mut rng) <= 1.0);
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn roll_honours_certain_outcomes() {
        let mut rng = FixedRng { value: u32::MAX };
        assert!(roll(&mut rng, 1.0));
        let mut rng = FixedRng { value: 0 };
        assert!(!roll(&mut rng, 0.0));
        assert!(roll(&mut rng, 0.5));
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = rng_for(-17);
        let mut b = rng_for(-17);
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn index_seeds_differ() {
        assert_ne!(seed_from_index(1), seed_from_index(2));
        assert_eq!(seed_from_index(5), seed_from_index(5));
    }
}
