//! Coordinate remapping combinators. Both are generic over the value type so they
//! apply to token grids as well as numeric ones.
use std::sync::Arc;

use glam::Vec2;

use crate::grid::GridFunction;

/// Rotates the sample point by `angle` degrees about `pivot` before delegating.
pub struct Rotate<T> {
    input: Arc<dyn GridFunction<T>>,
    pivot: Vec2,
    rotation: Vec2,
}

impl<T> Rotate<T> {
    pub fn new(input: Arc<dyn GridFunction<T>>, pivot: Vec2, angle_degrees: f32) -> Self {
        Self {
            input,
            pivot,
            rotation: Vec2::from_angle(angle_degrees.to_radians()),
        }
    }
}

impl<T> GridFunction<T> for Rotate<T> {
    #[inline]
    fn value_at(&self, p: Vec2) -> T {
        self.input
            .value_at(self.pivot + self.rotation.rotate(p - self.pivot))
    }
}

/// Samples `input` at `p * scale + translate`.
pub struct Transform<T> {
    input: Arc<dyn GridFunction<T>>,
    translate: Vec2,
    scale: Vec2,
}

impl<T> Transform<T> {
    pub fn new(input: Arc<dyn GridFunction<T>>, translate: Vec2, scale: Vec2) -> Self {
        Self {
            input,
            translate,
            scale,
        }
    }
}

impl<T> GridFunction<T> for Transform<T> {
    #[inline]
    fn value_at(&self, p: Vec2) -> T {
        self.input.value_at(p * self.scale + self.translate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FromFn;
    use crate::value::Token;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    fn x_axis() -> Arc<dyn GridFunction<f32>> {
        Arc::new(FromFn(|p: Vec2| p.x))
    }

    #[test]
    fn rotate_quarter_turn_about_origin() {
        let r = Rotate::new(x_axis(), Vec2::ZERO, 90.0);
        approx_eq(r.value_at(Vec2::new(0.0, 1.0)), -1.0);
        approx_eq(r.value_at(Vec2::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn rotate_keeps_pivot_fixed() {
        let r = Rotate::new(x_axis(), Vec2::new(125.0, 125.0), 37.0);
        approx_eq(r.value_at(Vec2::new(125.0, 125.0)), 125.0);
    }

    #[test]
    fn transform_scales_then_translates() {
        let t = Transform::new(x_axis(), Vec2::new(10.0, 0.0), Vec2::new(2.0, 1.0));
        approx_eq(t.value_at(Vec2::new(3.0, 0.0)), 16.0);
    }

    #[test]
    fn transforms_apply_to_token_grids() {
        let half: Arc<dyn GridFunction<Option<Token>>> = Arc::new(FromFn(|p: Vec2| {
            if p.x < 0.0 {
                Some(Token::new("Water"))
            } else {
                None
            }
        }));
        let mirrored = Transform::new(half, Vec2::ZERO, Vec2::new(-1.0, 1.0));
        assert_eq!(mirrored.value_at(Vec2::new(5.0, 0.0)), Some(Token::new("Water")));
        assert_eq!(mirrored.value_at(Vec2::new(-5.0, 0.0)), None);
    }
}
