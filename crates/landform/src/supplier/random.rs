//! Seeded uniform random supplier.
use parking_lot::Mutex;
use rand::rngs::StdRng;

use crate::random::{rand01, rng_for};
use crate::supplier::Supplier;

/// Draws a fresh uniform value in `[min, max]` on every `get`.
///
/// Wrap it in [`crate::supplier::Cached`] to hand one draw per pass to all consumers.
pub struct RandomRange {
    min: f32,
    max: f32,
    seed: i32,
    rng: Mutex<StdRng>,
}

impl RandomRange {
    pub fn new(min: f32, max: f32, seed: i32) -> Self {
        Self {
            min,
            max,
            seed,
            rng: Mutex::new(rng_for(seed)),
        }
    }
}

impl Supplier<f32> for RandomRange {
    fn get(&self) -> f32 {
        let t = rand01(&mut *self.rng.lock());
        self.min + (self.max - self.min) * t
    }

    fn reset_state(&self) {
        *self.rng.lock() = rng_for(self.seed);
    }
}
