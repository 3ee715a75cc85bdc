//! Threshold-select compile step.
use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::graph::{PortType, SelectParams};
use crate::grid::Select;
use crate::nodes::{Input, Inputs, Shape};
use crate::supplier::{Cached, Selected};
use crate::value::{PortValue, Token};

pub(crate) fn compile(inputs: &Inputs<'_>, params: &SelectParams) -> Result<PortValue> {
    if !matches!(params.axis, PortType::Value | PortType::ValueGrid) {
        let id = inputs.node().id();
        warn!("Select {} has a {:?} axis; only numeric axes are supported.", id, params.axis);
        return Err(Error::compile(id, "select axis must be a value or value grid"));
    }
    match params.options {
        PortType::Value | PortType::ValueGrid => build::<f32>(inputs, params),
        PortType::Token(_) | PortType::TokenGrid(_) => build::<Option<Token>>(inputs, params),
    }
}

fn build<T: Shape>(inputs: &Inputs<'_>, params: &SelectParams) -> Result<PortValue> {
    let axis_port = inputs.named("axis")?;
    let axis = inputs.resolve(axis_port);
    // Absent options keep their slot so indices stay aligned with the thresholds.
    let options: Vec<Input> = inputs
        .node()
        .dynamic_inputs()
        .map(|port| inputs.resolve(port))
        .collect();
    let thresholds = params.thresholds.clone();

    if params.result_type().is_grid() {
        let axis = f32::input_grid(axis);
        let options = options.into_iter().map(T::input_grid).collect();
        Ok(T::wrap_grid(Arc::new(Select::new(axis, thresholds, options))))
    } else {
        let axis = f32::input_supplier(axis);
        let options = options.into_iter().map(T::input_supplier).collect();
        let selected = Selected::new(axis, thresholds, options);
        Ok(T::wrap_supplier(Arc::new(Cached::new(Arc::new(selected)))))
    }
}
