//! N-ary fold over suppliers with probabilistic layering.
use parking_lot::Mutex;
use rand::rngs::StdRng;

use crate::operation::Operation;
use crate::random::{rng_for, roll};
use crate::supplier::Supplier;
use crate::value::ValueSupplier;

/// Left fold of `inputs` with `operation`.
///
/// The first slot is the base and always participates. Every other slot is
/// included with probability `apply_chance`, decided by a fresh coin flip on each
/// `get`. The flips come from a generator owned by this supplier, so a reset
/// replays the same include/exclude pattern. An empty slot still takes its flip
/// but contributes nothing; an empty base starts the fold at the neutral element.
pub struct Operated {
    operation: Operation,
    slots: Vec<Option<ValueSupplier>>,
    apply_chance: f32,
    seed: i32,
    rng: Mutex<StdRng>,
}

impl Operated {
    pub fn new(operation: Operation, inputs: Vec<ValueSupplier>, apply_chance: f32, seed: i32) -> Self {
        Self::with_slots(operation, inputs.into_iter().map(Some).collect(), apply_chance, seed)
    }

    /// Fold over positional slots, some of which may be empty.
    pub fn with_slots(
        operation: Operation,
        slots: Vec<Option<ValueSupplier>>,
        apply_chance: f32,
        seed: i32,
    ) -> Self {
        Self {
            operation,
            slots,
            apply_chance,
            seed,
            rng: Mutex::new(rng_for(seed)),
        }
    }
}

impl Supplier<f32> for Operated {
    fn get(&self) -> f32 {
        let Some((base, layers)) = self.slots.split_first() else {
            return self.operation.neutral();
        };
        let mut acc = base
            .as_ref()
            .map_or_else(|| self.operation.neutral(), |b| b.get());
        let mut rng = self.rng.lock();
        for layer in layers {
            if roll(&mut *rng, self.apply_chance) {
                if let Some(layer) = layer {
                    acc = self.operation.apply(acc, layer.get());
                }
            }
        }
        acc
    }

    fn reset_state(&self) {
        *self.rng.lock() = rng_for(self.seed);
        for input in self.slots.iter().flatten() {
            input.reset_state();
        }
    }
}
