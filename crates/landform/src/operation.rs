//! Binary operations shared by supplier folds and grid folds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary operation applied by operator nodes when folding their inputs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Operation {
    #[default]
    Add,
    Multiply,
    Min,
    Max,
    SmoothMin {
        smoothness: f32,
    },
    SmoothMax {
        smoothness: f32,
    },
}

impl Operation {
    /// Combine two operands.
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Operation::Add => a + b,
            Operation::Multiply => a * b,
            Operation::Min => a.min(b),
            Operation::Max => a.max(b),
            Operation::SmoothMin { smoothness } => smooth_min(a, b, smoothness),
            Operation::SmoothMax { smoothness } => smooth_max(a, b, smoothness),
        }
    }

    /// Result of folding zero operands.
    ///
    /// Min/max style operations have no finite identity; they yield `0`.
    pub fn neutral(self) -> f32 {
        match self {
            Operation::Multiply => 1.0,
            _ => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Multiply => "Multiply",
            Operation::Min => "Min",
            Operation::Max => "Max",
            Operation::SmoothMin { .. } => "SmoothMin",
            Operation::SmoothMax { .. } => "SmoothMax",
        }
    }
}

/// Differentiable minimum. `smoothness <= 0` is the hard minimum.
///
/// The exponent `lo - hi` is never positive, so `exp` cannot overflow; an operand
/// product that overflows to infinity propagates unchanged.
#[inline]
pub fn smooth_min(a: f32, b: f32, smoothness: f32) -> f32 {
    if smoothness <= 0.0 {
        return a.min(b);
    }
    let lo = a.min(b) * smoothness;
    let hi = a.max(b) * smoothness;
    (lo - (lo - hi).exp().ln_1p()) / smoothness
}

/// Differentiable maximum. `smoothness <= 0` is the hard maximum.
#[inline]
pub fn smooth_max(a: f32, b: f32, smoothness: f32) -> f32 {
    if smoothness <= 0.0 {
        return a.max(b);
    }
    let lo = a.min(b) * smoothness;
    let hi = a.max(b) * smoothness;
    (hi + (lo - hi).exp().ln_1p()) / smoothness
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_smoothness_is_exact_hard_variant() {
        assert_eq!(smooth_min(1.0, 2.0, 0.0), 1.0);
        assert_eq!(smooth_max(1.0, 2.0, 0.0), 2.0);
        assert_eq!(smooth_min(-3.5, 7.25, -1.0), -3.5);
        assert_eq!(smooth_max(-3.5, 7.25, -1.0), 7.25);
    }

    #[test]
    fn sharp_smoothness_approaches_hard_variant() {
        assert!((smooth_min(1.0, 2.0, 10.0) - 1.0).abs() < 1e-3);
        assert!((smooth_max(1.0, 2.0, 10.0) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn blending_is_symmetric_and_bounded() {
        let s = 2.0;
        assert_eq!(smooth_min(0.3, 0.5, s), smooth_min(0.5, 0.3, s));
        assert!(smooth_min(0.3, 0.5, s) <= 0.3);
        assert!(smooth_max(0.3, 0.5, s) >= 0.5);
    }

    #[test]
    fn huge_operands_do_not_produce_nan_from_exp() {
        let v = smooth_max(1.0e30, -1.0e30, 1.0);
        assert_eq!(v, 1.0e30);
    }

    #[test]
    fn neutral_elements() {
        assert_eq!(Operation::Add.neutral(), 0.0);
        assert_eq!(Operation::Multiply.neutral(), 1.0);
        assert_eq!(Operation::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(Operation::Multiply.apply(2.0, 3.0), 6.0);
        assert_eq!(Operation::Min.apply(2.0, 3.0), 2.0);
        assert_eq!(Operation::Max.apply(2.0, 3.0), 3.0);
    }
}
