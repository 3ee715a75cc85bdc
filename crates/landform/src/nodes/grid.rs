use std::sync::Arc;

use glam::Vec2;

use crate::error::Result;
use crate::graph::{GridLinearParams, GridNoiseParams};
use crate::grid::{
    Clamp, Const, Invert, Lerp, NoiseGenerator, NoiseSettings, Rotate, ScaleWithBias, Transform,
};
use crate::nodes::Inputs;
use crate::value::PortValue;

pub(crate) fn from_value(inputs: &Inputs<'_>) -> Result<PortValue> {
    let value = inputs.read_value("value")?.unwrap_or_default();
    Ok(PortValue::constant_grid(value))
}

/// Noise remapped by `scale` and `bias`, seeded with the node's combined seed.
pub(crate) fn noise(params: &GridNoiseParams, seed: i32) -> PortValue {
    let settings = NoiseSettings {
        frequency: params.frequency,
        lacunarity: params.lacunarity,
        persistence: params.persistence,
        octaves: params.octaves,
        seed,
    };
    PortValue::ValueGrid(Arc::new(ScaleWithBias {
        input: Arc::new(NoiseGenerator::new(&params.noise, &settings)),
        scale: params.scale,
        bias: params.bias,
    }))
}

pub(crate) fn rotate(inputs: &Inputs<'_>, pivot: Vec2) -> Result<PortValue> {
    let input = inputs.require_value_grid("input")?;
    let angle = inputs.read_value("angle")?.unwrap_or_default();
    Ok(PortValue::ValueGrid(Arc::new(Rotate::new(input, pivot, angle))))
}

pub(crate) fn transform(inputs: &Inputs<'_>, translate: Vec2, scale: Vec2) -> Result<PortValue> {
    let input = inputs.require_value_grid("input")?;
    Ok(PortValue::ValueGrid(Arc::new(Transform::new(
        input, translate, scale,
    ))))
}

pub(crate) fn linear(inputs: &Inputs<'_>, params: &GridLinearParams) -> Result<PortValue> {
    let input = inputs.require_value_grid("input")?;
    let scaled = Arc::new(ScaleWithBias {
        input,
        scale: params.scale,
        bias: params.bias,
    });
    Ok(PortValue::ValueGrid(Arc::new(Clamp {
        input: scaled,
        min: params.min,
        max: params.max,
    })))
}

pub(crate) fn invert(inputs: &Inputs<'_>) -> Result<PortValue> {
    let input = inputs.require_value_grid("input")?;
    Ok(PortValue::ValueGrid(Arc::new(Invert { input })))
}

pub(crate) fn lerp(inputs: &Inputs<'_>) -> Result<PortValue> {
    let grid = |name| -> Result<_> {
        Ok(inputs
            .value_grid(name)?
            .unwrap_or_else(|| Arc::new(Const(0.0))))
    };
    Ok(PortValue::ValueGrid(Arc::new(Lerp {
        a: grid("a")?,
        b: grid("b")?,
        t: grid("t")?,
    })))
}
