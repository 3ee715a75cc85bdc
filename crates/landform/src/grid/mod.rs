//! Pure functions of continuous 2D coordinates and their combinators.
//!
//! A [`GridFunction`] maps a point to a value and is recomputed on every call: no
//! memoization, no interior state. Compiled grids are therefore safe to sample from
//! many threads at once. Points are [`glam::Vec2`] where `y` carries the map's
//! `z` axis.
use std::sync::Arc;

use glam::Vec2;

pub mod arithmetic;
pub mod noise;
pub mod select;
pub mod span;
pub mod transform;

pub use arithmetic::{
    combine, Add, Clamp, Invert, Lerp, Max, Min, Multiply, ScaleWithBias, SmoothMax, SmoothMin,
};
pub use noise::{NoiseFunction, NoiseGenerator, NoiseSettings, NoiseType};
pub use select::{select_index, PostProcess, Select};
pub use span::SpanDistance;
pub use transform::{Rotate, Transform};

/// Pure mapping from a point to a value.
pub trait GridFunction<T>: Send + Sync {
    fn value_at(&self, p: Vec2) -> T;
}

/// Same value everywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct Const<T>(pub T);

impl<T: Clone + Send + Sync> GridFunction<T> for Const<T> {
    #[inline]
    fn value_at(&self, _p: Vec2) -> T {
        self.0.clone()
    }
}

/// Adapter turning a closure into a grid function.
pub struct FromFn<F>(pub F);

impl<T, F> GridFunction<T> for FromFn<F>
where
    F: Fn(Vec2) -> T + Send + Sync,
{
    #[inline]
    fn value_at(&self, p: Vec2) -> T {
        (self.0)(p)
    }
}

/// Shared handle for any grid function.
pub type SharedGrid<T> = Arc<dyn GridFunction<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_ignores_position() {
        let g = Const(7.0_f32);
        assert_eq!(g.value_at(Vec2::ZERO), 7.0);
        assert_eq!(g.value_at(Vec2::new(-100.0, 3.5)), 7.0);
    }

    #[test]
    fn from_fn_evaluates_closure() {
        let g = FromFn(|p: Vec2| p.x * 2.0 + p.y);
        assert_eq!(g.value_at(Vec2::new(1.0, 3.0)), 5.0);
    }
}
