//! Lazy, resettable value sources.
//!
//! A compiled node produces a tree of [`Supplier`]s rather than a cached scalar. The host
//! calls [`Supplier::reset_state`] at the start of each pass and then pulls values with
//! [`Supplier::get`]; a reset followed by the same sequence of `get` calls always
//! replays the same values.
//!
//! Stateful suppliers keep their state behind a [`parking_lot::Mutex`] so a compiled tree
//! can be shared through `Arc` by every consumer of a node's output.
use std::sync::Arc;

use parking_lot::Mutex;

pub mod operated;
pub mod random;
pub mod selected;

pub use operated::Operated;
pub use random::RandomRange;
pub use selected::Selected;

/// Pull-based value source.
pub trait Supplier<T>: Send + Sync {
    /// Current value. May draw from a seeded stream.
    fn get(&self) -> T;

    /// Reset any cached or random state in this subtree so the next `get` replays from
    /// the start.
    fn reset_state(&self);
}

/// Constant value. Reset is a no-op.
#[derive(Clone, Debug, PartialEq)]
pub struct Const<T>(pub T);

impl<T: Clone + Send + Sync> Supplier<T> for Const<T> {
    #[inline]
    fn get(&self) -> T {
        self.0.clone()
    }

    fn reset_state(&self) {}
}

/// Memoizes the first value pulled from `inner` until the next reset, so every
/// consumer of one node output observes the same value within a pass.
pub struct Cached<T> {
    inner: Arc<dyn Supplier<T>>,
    value: Mutex<Option<T>>,
}

impl<T> Cached<T> {
    pub fn new(inner: Arc<dyn Supplier<T>>) -> Self {
        Self {
            inner,
            value: Mutex::new(None),
        }
    }
}

impl<T: Clone + Send + Sync> Supplier<T> for Cached<T> {
    fn get(&self) -> T {
        let mut slot = self.value.lock();
        if let Some(v) = slot.as_ref() {
            return v.clone();
        }
        let v = self.inner.get();
        *slot = Some(v.clone());
        v
    }

    fn reset_state(&self) {
        self.inner.reset_state();
        *self.value.lock() = None;
    }
}

/// Applies a pure mapping to every value of `inner`.
pub struct MapValue<T, U> {
    inner: Arc<dyn Supplier<T>>,
    map: Box<dyn Fn(T) -> U + Send + Sync>,
}

impl<T, U> MapValue<T, U> {
    pub fn new(inner: Arc<dyn Supplier<T>>, map: impl Fn(T) -> U + Send + Sync + 'static) -> Self {
        Self {
            inner,
            map: Box::new(map),
        }
    }
}

impl<T, U> Supplier<U> for MapValue<T, U> {
    fn get(&self) -> U {
        (self.map)(self.inner.get())
    }

    fn reset_state(&self) {
        self.inner.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct Counter(AtomicU32);

    impl Supplier<f32> for Counter {
        fn get(&self) -> f32 {
            self.0.fetch_add(1, Ordering::Relaxed) as f32
        }

        fn reset_state(&self) {
            self.0.store(0, Ordering::Relaxed);
        }
    }

    #[test]
    fn const_is_stable_and_reset_is_noop() {
        let c = Const(4.5_f32);
        assert_eq!(c.get(), 4.5);
        c.reset_state();
        assert_eq!(c.get(), 4.5);
    }

    #[test]
    fn cached_holds_first_value_until_reset() {
        let cached = Cached::new(Arc::new(Counter(AtomicU32::new(0))));
        assert_eq!(cached.get(), 0.0);
        assert_eq!(cached.get(), 0.0);

        cached.reset_state();
        assert_eq!(cached.get(), 0.0);
    }

    #[test]
    fn map_value_forwards_reset() {
        let mapped = MapValue::new(Arc::new(Counter(AtomicU32::new(0))), |v: f32| v * 10.0);
        assert_eq!(mapped.get(), 0.0);
        assert_eq!(mapped.get(), 10.0);
        mapped.reset_state();
        assert_eq!(mapped.get(), 0.0);
    }
}
