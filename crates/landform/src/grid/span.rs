//! Anisotropic distance field.
use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::GridFunction;

/// Distance from `origin` measured in independent extents along +x, -x, +z and -z.
///
/// Along each axis the offset is divided by the span on the side the point lies on
/// (`0` when that span is `0`). The non-circular form sums both axes
/// (Manhattan style); the circular form takes their Euclidean length, negated when
/// either chosen span is negative. `bias` is added in both forms.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SpanDistance {
    pub bias: f32,
    pub origin: Vec2,
    pub span_px: f32,
    pub span_nx: f32,
    pub span_pz: f32,
    pub span_nz: f32,
    pub circular: bool,
}

impl Default for SpanDistance {
    fn default() -> Self {
        Self {
            bias: 0.0,
            origin: Vec2::ZERO,
            span_px: 0.0,
            span_nx: 0.0,
            span_pz: 0.0,
            span_nz: 0.0,
            circular: false,
        }
    }
}

#[inline]
fn axis(offset: f32, span_pos: f32, span_neg: f32) -> (f32, f32) {
    let span = if offset >= 0.0 { span_pos } else { span_neg };
    if span == 0.0 {
        (0.0, span)
    } else {
        (offset.abs() / span, span)
    }
}

impl GridFunction<f32> for SpanDistance {
    fn value_at(&self, p: Vec2) -> f32 {
        let d = p - self.origin;
        let (val_x, span_x) = axis(d.x, self.span_px, self.span_nx);
        let (val_z, span_z) = axis(d.y, self.span_pz, self.span_nz);

        if self.circular {
            let dist = (val_x * val_x + val_z * val_z).sqrt();
            if span_x < 0.0 || span_z < 0.0 {
                self.bias - dist
            } else {
                self.bias + dist
            }
        } else {
            self.bias + val_x + val_z
        }
    }
}
