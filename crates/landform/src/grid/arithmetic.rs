//! Pointwise arithmetic on numeric grids.
use std::sync::Arc;

use glam::Vec2;

use crate::grid::GridFunction;
use crate::operation::{smooth_max, smooth_min, Operation};
use crate::value::ValueGrid;

/// `a + b`
pub struct Add {
    pub a: ValueGrid,
    pub b: ValueGrid,
}

impl GridFunction<f32> for Add {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        self.a.value_at(p) + self.b.value_at(p)
    }
}

/// `a * b`
pub struct Multiply {
    pub a: ValueGrid,
    pub b: ValueGrid,
}

impl GridFunction<f32> for Multiply {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        self.a.value_at(p) * self.b.value_at(p)
    }
}

pub struct Min {
    pub a: ValueGrid,
    pub b: ValueGrid,
}

impl GridFunction<f32> for Min {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        self.a.value_at(p).min(self.b.value_at(p))
    }
}

pub struct Max {
    pub a: ValueGrid,
    pub b: ValueGrid,
}

impl GridFunction<f32> for Max {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        self.a.value_at(p).max(self.b.value_at(p))
    }
}

/// Seamless minimum, see [`crate::operation::smooth_min`].
pub struct SmoothMin {
    pub a: ValueGrid,
    pub b: ValueGrid,
    pub smoothness: f32,
}

impl GridFunction<f32> for SmoothMin {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        smooth_min(self.a.value_at(p), self.b.value_at(p), self.smoothness)
    }
}

/// Seamless maximum, see [`crate::operation::smooth_max`].
pub struct SmoothMax {
    pub a: ValueGrid,
    pub b: ValueGrid,
    pub smoothness: f32,
}

impl GridFunction<f32> for SmoothMax {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        smooth_max(self.a.value_at(p), self.b.value_at(p), self.smoothness)
    }
}

/// `input * scale + bias`
pub struct ScaleWithBias {
    pub input: ValueGrid,
    pub scale: f32,
    pub bias: f32,
}

impl GridFunction<f32> for ScaleWithBias {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        self.input.value_at(p) * self.scale + self.bias
    }
}

/// Pointwise clamp into `[min, max]`.
pub struct Clamp {
    pub input: ValueGrid,
    pub min: f32,
    pub max: f32,
}

impl GridFunction<f32> for Clamp {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        // not f32::clamp: tolerate min > max the way max(min(..)) does
        self.input.value_at(p).min(self.max).max(self.min)
    }
}

/// `1 - input`
pub struct Invert {
    pub input: ValueGrid,
}

impl GridFunction<f32> for Invert {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        1.0 - self.input.value_at(p)
    }
}

/// Linear interpolation `a + (b - a) * t`, `t` clamped to `[0, 1]`.
pub struct Lerp {
    pub a: ValueGrid,
    pub b: ValueGrid,
    pub t: ValueGrid,
}

impl GridFunction<f32> for Lerp {
    #[inline]
    fn value_at(&self, p: Vec2) -> f32 {
        let t = self.t.value_at(p).clamp(0.0, 1.0);
        let a = self.a.value_at(p);
        a + (self.b.value_at(p) - a) * t
    }
}

/// Build the combinator for `operation` applied to `a` and `b`.
pub fn combine(operation: Operation, a: ValueGrid, b: ValueGrid) -> ValueGrid {
    match operation {
        Operation::Add => Arc::new(Add { a, b }),
        Operation::Multiply => Arc::new(Multiply { a, b }),
        Operation::Min => Arc::new(Min { a, b }),
        Operation::Max => Arc::new(Max { a, b }),
        Operation::SmoothMin { smoothness } => Arc::new(SmoothMin { a, b, smoothness }),
        Operation::SmoothMax { smoothness } => Arc::new(SmoothMax { a, b, smoothness }),
    }
}
